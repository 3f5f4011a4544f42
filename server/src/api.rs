use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::games::chain_reaction::{GameError, GameState};
use common::{GameId, PlayerId};
use serde::{Deserialize, Serialize};

use crate::game_store::GameStore;
use crate::web_server::WebServerState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameResponse {
    pub game_id: GameId,
    pub game_state: GameState,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRequest {
    pub game_id: GameId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGameResponse {
    pub player_id: PlayerId,
    pub game_state: GameState,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateResponse {
    pub game_state: GameState,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub game_id: GameId,
    pub row: i64,
    pub col: i64,
    pub player: PlayerId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitForUpdateQuery {
    /// `lastUpdated` value the caller already has.
    pub since: i64,
    /// Optional shorter window; capped by the server's configured wait timeout.
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitForUpdateResponse {
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_state: Option<GameState>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiError(pub GameError);

impl From<GameError> for ApiError {
    fn from(e: GameError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            GameError::NotFound => StatusCode::NOT_FOUND,
            GameError::InvalidCell => StatusCode::BAD_REQUEST,
            GameError::GameFull
            | GameError::GameOver
            | GameError::WrongTurn
            | GameError::OpponentOwned => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.0.to_string(),
            code: self.0.code(),
        };
        (self.status(), Json(body)).into_response()
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "API is working!",
    })
}

pub async fn create_game<S: GameStore>(
    State(state): State<WebServerState<S>>,
) -> Json<CreateGameResponse> {
    let game_state = state.service.create_game().await;
    Json(CreateGameResponse {
        game_id: game_state.id.clone(),
        game_state,
    })
}

pub async fn join_game<S: GameStore>(
    State(state): State<WebServerState<S>>,
    Json(req): Json<GameRequest>,
) -> Result<Json<JoinGameResponse>, ApiError> {
    let (player_id, game_state) = state.service.join_game(&req.game_id).await?;
    Ok(Json(JoinGameResponse {
        player_id,
        game_state,
    }))
}

pub async fn get_game_state<S: GameStore>(
    State(state): State<WebServerState<S>>,
    Path(game_id): Path<GameId>,
) -> Result<Json<GameStateResponse>, ApiError> {
    let game_state = state.service.get_state(&game_id).await?;
    Ok(Json(GameStateResponse { game_state }))
}

pub async fn make_move<S: GameStore>(
    State(state): State<WebServerState<S>>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<GameStateResponse>, ApiError> {
    let game_state = state
        .service
        .make_move(&req.game_id, req.row, req.col, req.player)
        .await?;
    Ok(Json(GameStateResponse { game_state }))
}

pub async fn reset_game<S: GameStore>(
    State(state): State<WebServerState<S>>,
    Json(req): Json<GameRequest>,
) -> Result<Json<GameStateResponse>, ApiError> {
    let game_state = state.service.reset_game(&req.game_id).await?;
    Ok(Json(GameStateResponse { game_state }))
}

pub async fn wait_for_update<S: GameStore>(
    State(state): State<WebServerState<S>>,
    Path(game_id): Path<GameId>,
    Query(query): Query<WaitForUpdateQuery>,
) -> Result<Json<WaitForUpdateResponse>, ApiError> {
    let window = query
        .timeout_ms
        .map(Duration::from_millis)
        .map_or(state.wait_timeout, |requested| requested.min(state.wait_timeout));

    let game_state = state
        .service
        .wait_for_update(&game_id, query.since, window)
        .await?;

    Ok(Json(WaitForUpdateResponse {
        changed: game_state.is_some(),
        game_state,
    }))
}
