use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use common::games::chain_reaction::{GameError, GameState};
use common::GameId;
use tokio::sync::{watch, Mutex};

/// One stored game. Writers are serialized by `state`; every successful
/// mutation is published on `published`, which readers and waiters use.
#[derive(Debug)]
pub struct GameSlot {
    id: GameId,
    state: Mutex<GameState>,
    published: watch::Sender<GameState>,
}

impl GameSlot {
    pub fn new(state: GameState) -> Self {
        let (published, _) = watch::channel(state.clone());
        Self {
            id: state.id.clone(),
            state: Mutex::new(state),
            published,
        }
    }

    pub fn id(&self) -> &GameId {
        &self.id
    }

    pub fn snapshot(&self) -> GameState {
        self.published.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GameState> {
        self.published.subscribe()
    }

    /// Runs `mutation` with this game locked. `mutation` must leave the state
    /// untouched when it fails; on success the new state is published.
    pub async fn update<T, F>(&self, mutation: F) -> Result<(T, GameState), GameError>
    where
        F: FnOnce(&mut GameState) -> Result<T, GameError>,
    {
        let mut state = self.state.lock().await;
        let result = mutation(&mut *state)?;
        let snapshot = state.clone();
        self.published.send_replace(snapshot.clone());
        Ok((result, snapshot))
    }
}

pub trait GameStore: Send + Sync + Clone + 'static {
    fn get(&self, id: &GameId) -> impl Future<Output = Option<Arc<GameSlot>>> + Send;

    /// Stores a new game. Returns `false` and keeps the existing entry if the id is taken.
    fn put(&self, slot: Arc<GameSlot>) -> impl Future<Output = bool> + Send;

    fn delete(&self, id: &GameId) -> impl Future<Output = Option<Arc<GameSlot>>> + Send;

    fn list(&self) -> impl Future<Output = Vec<Arc<GameSlot>>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryGameStore {
    games: Arc<Mutex<HashMap<GameId, Arc<GameSlot>>>>,
}

impl InMemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for InMemoryGameStore {
    async fn get(&self, id: &GameId) -> Option<Arc<GameSlot>> {
        self.games.lock().await.get(id).cloned()
    }

    async fn put(&self, slot: Arc<GameSlot>) -> bool {
        let mut games = self.games.lock().await;
        if games.contains_key(slot.id()) {
            return false;
        }
        games.insert(slot.id().clone(), slot);
        true
    }

    async fn delete(&self, id: &GameId) -> Option<Arc<GameSlot>> {
        self.games.lock().await.remove(id)
    }

    async fn list(&self) -> Vec<Arc<GameSlot>> {
        self.games.lock().await.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::PlayerId;
    use std::time::Duration;

    fn slot(id: &str) -> Arc<GameSlot> {
        Arc::new(GameSlot::new(GameState::new(GameId::from(id))))
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = InMemoryGameStore::new();
        assert!(store.put(slot("aaaaaa")).await);
        assert!(store.get(&GameId::from("aaaaaa")).await.is_some());
        assert!(store.get(&GameId::from("bbbbbb")).await.is_none());
        assert_eq!(store.list().await.len(), 1);

        assert!(store.delete(&GameId::from("aaaaaa")).await.is_some());
        assert!(store.get(&GameId::from("aaaaaa")).await.is_none());
        assert!(store.delete(&GameId::from("aaaaaa")).await.is_none());
    }

    #[tokio::test]
    async fn test_put_keeps_existing_game_on_collision() {
        let store = InMemoryGameStore::new();
        let original = slot("aaaaaa");
        original.update(|state| state.join()).await.unwrap();
        assert!(store.put(original).await);

        assert!(!store.put(slot("aaaaaa")).await);
        let kept = store.get(&GameId::from("aaaaaa")).await.unwrap();
        assert_eq!(kept.snapshot().players, vec![PlayerId::new(1)]);
    }

    #[tokio::test]
    async fn test_failed_update_publishes_nothing() {
        let game = slot("aaaaaa");
        let mut updates = game.subscribe();
        let before = game.snapshot();

        let result = game.update(|state| state.apply_move(0, 0, PlayerId::new(2))).await;

        assert_eq!(result.unwrap_err(), GameError::WrongTurn);
        assert!(!updates.has_changed().unwrap());
        assert_eq!(game.snapshot(), before);
    }

    #[tokio::test]
    async fn test_update_publishes_snapshot() {
        let game = slot("aaaaaa");
        let mut updates = game.subscribe();

        let (player, snapshot) = game.update(|state| state.join()).await.unwrap();

        assert_eq!(player, PlayerId::new(1));
        assert!(updates.has_changed().unwrap());
        assert_eq!(*updates.borrow_and_update(), snapshot);
        assert_eq!(game.snapshot(), snapshot);
    }

    #[tokio::test]
    async fn test_concurrent_joins_are_serialized() {
        let game = slot("aaaaaa");
        let mut handles = Vec::new();
        for _ in 0..8 {
            let game = game.clone();
            handles.push(tokio::spawn(async move { game.update(|state| state.join()).await }));
        }

        let mut joined = Vec::new();
        let mut full = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok((player, _)) => joined.push(player),
                Err(GameError::GameFull) => full += 1,
                Err(other) => panic!("unexpected error {other}"),
            }
        }
        joined.sort();

        assert_eq!(joined, vec![PlayerId::new(1), PlayerId::new(2)]);
        assert_eq!(full, 6);
        assert_eq!(game.snapshot().players.len(), 2);
    }

    #[tokio::test]
    async fn test_locked_game_does_not_block_others() {
        let store = InMemoryGameStore::new();
        store.put(slot("aaaaaa")).await;
        store.put(slot("bbbbbb")).await;

        let busy = store.get(&GameId::from("aaaaaa")).await.unwrap();
        let _guard = busy.state.lock().await;

        let other = store.get(&GameId::from("bbbbbb")).await.unwrap();
        let result = tokio::time::timeout(
            Duration::from_secs(1),
            other.update(|state| state.join()),
        )
        .await;
        assert!(result.is_ok());
        // Readers still see the last published state of the locked game.
        assert!(busy.snapshot().players.is_empty());
    }
}
