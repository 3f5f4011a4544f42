use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::games::chain_reaction::{GameError, GameState};
use common::id_generator::generate_game_id;
use common::{log, GameId, PlayerId};
use tokio::sync::watch;

use crate::game_store::{GameSlot, GameStore};

#[derive(Debug, Clone)]
pub struct GameService<S: GameStore> {
    store: S,
}

impl<S: GameStore> GameService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn create_game(&self) -> GameState {
        loop {
            let slot = Arc::new(GameSlot::new(GameState::new(generate_game_id())));
            let state = slot.snapshot();
            if self.store.put(slot).await {
                log!("[game:{}] Created", state.id);
                return state;
            }
            log!("[game:{}] Id collision, drawing a new one", state.id);
        }
    }

    pub async fn join_game(&self, game_id: &GameId) -> Result<(PlayerId, GameState), GameError> {
        let slot = self.find(game_id).await?;
        let (player_id, state) = slot.update(|state| state.join()).await.inspect_err(|e| {
            log!("[game:{}] Join rejected: {}", game_id, e);
        })?;
        log!("[game:{}] Player {} joined", game_id, player_id);
        Ok((player_id, state))
    }

    pub async fn get_state(&self, game_id: &GameId) -> Result<GameState, GameError> {
        Ok(self.find(game_id).await?.snapshot())
    }

    pub async fn make_move(
        &self,
        game_id: &GameId,
        row: i64,
        col: i64,
        player: PlayerId,
    ) -> Result<GameState, GameError> {
        let slot = self.find(game_id).await?;
        let (outcome, state) = slot
            .update(|state| state.apply_move(row, col, player))
            .await
            .inspect_err(|e| {
                log!("[game:{}] Player {} failed to move at ({}, {}): {}", game_id, player, row, col, e);
            })?;

        log!(
            "[game:{}] Player {} moved at ({}, {}), {} explosion(s)",
            game_id, player, row, col, outcome.explosions
        );
        if let Some(winner) = outcome.winner {
            log!("[game:{}] Player {} won", game_id, winner);
        }
        Ok(state)
    }

    pub async fn reset_game(&self, game_id: &GameId) -> Result<GameState, GameError> {
        let slot = self.find(game_id).await?;
        let ((), state) = slot
            .update(|state| {
                state.reset();
                Ok(())
            })
            .await?;
        log!("[game:{}] Reset", game_id);
        Ok(state)
    }

    /// Waits up to `window` for the game's `last_updated` to differ from
    /// `since`. Returns immediately if it already does, and `Ok(None)` if
    /// nothing changed in time. Dropping the future cancels the wait.
    pub async fn wait_for_update(
        &self,
        game_id: &GameId,
        since: i64,
        window: Duration,
    ) -> Result<Option<GameState>, GameError> {
        let mut updates = self.subscribe(game_id).await?;

        let waited = tokio::time::timeout(window, async {
            loop {
                {
                    let current = updates.borrow_and_update();
                    if current.last_updated != since {
                        return Ok(current.clone());
                    }
                }
                if updates.changed().await.is_err() {
                    return Err(GameError::NotFound);
                }
            }
        })
        .await;

        match waited {
            Ok(result) => result.map(Some),
            Err(_) => Ok(None),
        }
    }

    pub async fn subscribe(&self, game_id: &GameId) -> Result<watch::Receiver<GameState>, GameError> {
        Ok(self.find(game_id).await?.subscribe())
    }

    /// Deletes games whose last update is older than `inactivity_timeout`.
    pub async fn remove_inactive(&self, inactivity_timeout: Duration) -> Vec<GameId> {
        let cutoff = Utc::now().timestamp_millis() - inactivity_timeout.as_millis() as i64;
        let mut removed = Vec::new();

        for slot in self.store.list().await {
            if slot.snapshot().last_updated < cutoff && self.store.delete(slot.id()).await.is_some() {
                removed.push(slot.id().clone());
            }
        }

        removed
    }

    async fn find(&self, game_id: &GameId) -> Result<Arc<GameSlot>, GameError> {
        self.store.get(game_id).await.ok_or(GameError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_store::InMemoryGameStore;
    use common::games::chain_reaction::{Cell, Position};

    fn service() -> GameService<InMemoryGameStore> {
        GameService::new(InMemoryGameStore::new())
    }

    fn p(seat: u8) -> PlayerId {
        PlayerId::new(seat)
    }

    #[tokio::test]
    async fn test_full_game_flow() {
        let service = service();
        let created = service.create_game().await;
        let id = created.id.clone();

        assert_eq!(service.join_game(&id).await.unwrap().0, p(1));
        assert_eq!(service.join_game(&id).await.unwrap().0, p(2));
        assert_eq!(service.join_game(&id).await.unwrap_err(), GameError::GameFull);

        let state = service.make_move(&id, 0, 0, p(1)).await.unwrap();
        assert_eq!(state.grid().get(Position::new(0, 0)), Cell::owned(1, p(1)));
        assert_eq!(state.current_player, p(2));

        assert_eq!(service.make_move(&id, 0, 0, p(2)).await.unwrap_err(), GameError::OpponentOwned);
        let state = service.make_move(&id, 5, 5, p(2)).await.unwrap();
        assert_eq!(state.current_player, p(1));

        assert_eq!(service.get_state(&id).await.unwrap(), state);
    }

    #[tokio::test]
    async fn test_unknown_game_is_not_found() {
        let service = service();
        let id = GameId::from("nope00");
        assert_eq!(service.get_state(&id).await.unwrap_err(), GameError::NotFound);
        assert_eq!(service.join_game(&id).await.unwrap_err(), GameError::NotFound);
        assert_eq!(service.make_move(&id, 0, 0, p(1)).await.unwrap_err(), GameError::NotFound);
        assert_eq!(service.reset_game(&id).await.unwrap_err(), GameError::NotFound);
        assert_eq!(
            service.wait_for_update(&id, 0, Duration::from_millis(10)).await.unwrap_err(),
            GameError::NotFound
        );
    }

    #[tokio::test]
    async fn test_reset_keeps_players() {
        let service = service();
        let id = service.create_game().await.id;
        service.join_game(&id).await.unwrap();
        service.join_game(&id).await.unwrap();
        service.make_move(&id, 2, 2, p(1)).await.unwrap();

        let first = service.reset_game(&id).await.unwrap();
        let second = service.reset_game(&id).await.unwrap();

        assert_eq!(first.grid(), second.grid());
        assert_eq!(second.players, vec![p(1), p(2)]);
        assert_eq!(second.current_player, p(1));
        assert_eq!(second.grid().total_value(), 0);
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_when_stale() {
        let service = service();
        let created = service.create_game().await;
        service.join_game(&created.id).await.unwrap();

        let result = service
            .wait_for_update(&created.id, created.last_updated, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(result.unwrap().players, vec![p(1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out_without_changes() {
        let service = service();
        let created = service.create_game().await;

        let result = service
            .wait_for_update(&created.id, created.last_updated, Duration::from_secs(25))
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_wait_wakes_on_move() {
        let service = service();
        let created = service.create_game().await;
        let id = created.id.clone();

        let waiter = {
            let service = service.clone();
            let id = id.clone();
            tokio::spawn(async move {
                service
                    .wait_for_update(&id, created.last_updated, Duration::from_secs(10))
                    .await
            })
        };

        tokio::task::yield_now().await;
        service.make_move(&id, 3, 3, p(1)).await.unwrap();

        let woke = waiter.await.unwrap().unwrap().expect("update expected");
        assert_eq!(woke.grid().get(Position::new(3, 3)), Cell::owned(1, p(1)));
    }

    #[tokio::test]
    async fn test_remove_inactive() {
        let service = service();
        let id = service.create_game().await.id;

        assert!(service.remove_inactive(Duration::from_secs(3600)).await.is_empty());
        assert!(service.get_state(&id).await.is_ok());

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(service.remove_inactive(Duration::ZERO).await, vec![id.clone()]);
        assert_eq!(service.get_state(&id).await.unwrap_err(), GameError::NotFound);
    }

    #[tokio::test]
    async fn test_wait_ends_when_game_is_removed() {
        let service = service();
        let created = service.create_game().await;
        let id = created.id.clone();

        let waiter = {
            let service = service.clone();
            let id = id.clone();
            tokio::spawn(async move {
                service
                    .wait_for_update(&id, created.last_updated, Duration::from_secs(10))
                    .await
            })
        };

        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        service.remove_inactive(Duration::ZERO).await;

        assert_eq!(waiter.await.unwrap().unwrap_err(), GameError::NotFound);
    }
}
