use std::time::Duration;

use common::log;

use crate::game_service::GameService;
use crate::game_store::GameStore;

pub struct CleanupTask<S: GameStore> {
    service: GameService<S>,
    check_interval: Duration,
    inactivity_timeout: Duration,
}

impl<S: GameStore> CleanupTask<S> {
    pub fn new(service: GameService<S>, check_interval: Duration, inactivity_timeout: Duration) -> Self {
        Self {
            service,
            check_interval,
            inactivity_timeout,
        }
    }

    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.check_interval);

        loop {
            interval.tick().await;
            self.cleanup_inactive_games().await;
        }
    }

    async fn cleanup_inactive_games(&self) -> usize {
        let removed = self.service.remove_inactive(self.inactivity_timeout).await;
        for game_id in &removed {
            log!("[game:{}] Removed after inactivity", game_id);
        }
        removed.len()
    }
}
