mod api;
mod cleanup_task;
mod game_service;
mod game_store;
mod server_config;
mod web_server;
mod ws_handler;

use clap::Parser;
use common::config::ConfigManager;
use common::{log, logger};

use cleanup_task::CleanupTask;
use game_service::GameService;
use game_store::InMemoryGameStore;
use server_config::{ServerConfig, DEFAULT_CONFIG_PATH};
use web_server::{build_cors_layer, run_web_server, WebServerState};

#[derive(Parser)]
#[command(name = "chain_reaction_server")]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[arg(long)]
    use_log_prefix: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Server".to_string())
    } else {
        None
    };
    logger::init_logger(prefix);

    let config_manager: ConfigManager<_, ServerConfig> = ConfigManager::from_yaml_file(&args.config);
    let config = config_manager.get_config()?;
    log!(
        "Loaded config from {}:\n{}",
        config_manager.source_name(),
        config_manager.render(&config)?
    );

    let service = GameService::new(InMemoryGameStore::new());

    let cleanup_task = CleanupTask::new(
        service.clone(),
        config.cleanup_interval(),
        config.inactivity_timeout(),
    );
    tokio::spawn(async move {
        cleanup_task.run().await;
    });

    let cors = build_cors_layer(&config.allowed_origins)?;
    let state = WebServerState {
        service,
        wait_timeout: config.wait_timeout(),
    };

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        log!("Shutdown signal received, stopping server...");
    };

    run_web_server(listener, state, cors, shutdown_signal).await?;

    log!("Server shut down gracefully");

    Ok(())
}
