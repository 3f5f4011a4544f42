use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use common::games::chain_reaction::GameState;
use common::{log, GameId};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::watch;

use crate::api::{ApiError, GameStateResponse};
use crate::game_store::GameStore;
use crate::web_server::WebServerState;

pub async fn ws_upgrade_handler<S: GameStore>(
    ws: WebSocketUpgrade,
    State(state): State<WebServerState<S>>,
    Path(game_id): Path<GameId>,
) -> Result<impl IntoResponse, ApiError> {
    let updates = state.service.subscribe(&game_id).await?;
    Ok(ws.on_upgrade(move |socket| handle_websocket(socket, game_id, updates)))
}

/// Pushes the current state, then every published change, until the client
/// goes away or the game is removed.
pub async fn handle_websocket(
    socket: WebSocket,
    game_id: GameId,
    mut updates: watch::Receiver<GameState>,
) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    log!("[ws:{}] Subscriber connected", game_id);

    let initial = updates.borrow_and_update().clone();
    if send_state(&mut ws_sender, &game_id, initial).await {
        loop {
            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        log!("[ws:{}] Game removed, closing subscription", game_id);
                        break;
                    }
                    let state = updates.borrow_and_update().clone();
                    if !send_state(&mut ws_sender, &game_id, state).await {
                        break;
                    }
                }
                incoming = ws_receiver.next() => {
                    match incoming {
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                        Some(Ok(_)) => {}
                    }
                }
            }
        }
    }

    let _ = ws_sender.close().await;
    log!("[ws:{}] Subscriber disconnected", game_id);
}

pub fn encode_state(game_state: GameState) -> Result<String, serde_json::Error> {
    serde_json::to_string(&GameStateResponse { game_state })
}

async fn send_state(
    ws_sender: &mut SplitSink<WebSocket, Message>,
    game_id: &GameId,
    state: GameState,
) -> bool {
    let text = match encode_state(state) {
        Ok(text) => text,
        Err(e) => {
            log!("[ws:{}] Failed to encode state: {}", game_id, e);
            return false;
        }
    };

    ws_sender.send(Message::Text(text.into())).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::PlayerId;

    #[test]
    fn test_encode_state_wraps_game_state() {
        let mut state = GameState::new(GameId::from("ws0001"));
        state.join().unwrap();
        let text = encode_state(state).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(json["gameState"]["id"], "ws0001");
        assert_eq!(json["gameState"]["players"], serde_json::json!([PlayerId::new(1).value()]));
        assert_eq!(json["gameState"]["grid"].as_array().unwrap().len(), 6);
    }
}
