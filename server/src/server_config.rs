use std::net::SocketAddr;
use std::time::Duration;

use common::config::Validate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "server_config.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Origins allowed by CORS. Empty means any origin.
    pub allowed_origins: Vec<String>,
    pub wait_timeout_secs: u64,
    pub cleanup_interval_secs: u64,
    pub inactivity_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5000".to_string(),
            allowed_origins: Vec::new(),
            wait_timeout_secs: 25,
            cleanup_interval_secs: 300,
            inactivity_timeout_secs: 3600,
        }
    }
}

impl ServerConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout_secs)
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        self.listen_addr
            .parse::<SocketAddr>()
            .map_err(|e| format!("Invalid listen_addr '{}': {}", self.listen_addr, e))?;

        if self.wait_timeout_secs == 0 || self.wait_timeout_secs > 120 {
            return Err("wait_timeout_secs must be between 1 and 120".to_string());
        }
        if self.cleanup_interval_secs == 0 {
            return Err("cleanup_interval_secs must be positive".to_string());
        }
        if self.inactivity_timeout_secs < self.wait_timeout_secs {
            return Err(format!(
                "inactivity_timeout_secs ({}) cannot be shorter than wait_timeout_secs ({})",
                self.inactivity_timeout_secs, self.wait_timeout_secs
            ));
        }
        for origin in &self.allowed_origins {
            if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                return Err(format!("Allowed origin '{}' must start with http:// or https://", origin));
            }
        }
        Ok(())
    }
}
