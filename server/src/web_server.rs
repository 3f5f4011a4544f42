use std::future::Future;
use std::time::Duration;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use common::log;

use crate::api;
use crate::game_service::GameService;
use crate::game_store::GameStore;
use crate::ws_handler::ws_upgrade_handler;

#[derive(Debug, Clone)]
pub struct WebServerState<S: GameStore> {
    pub service: GameService<S>,
    pub wait_timeout: Duration,
}

pub fn build_cors_layer(allowed_origins: &[String]) -> Result<CorsLayer, String> {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.is_empty() {
        return Ok(cors.allow_origin(Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| format!("Invalid allowed origin '{}': {}", origin, e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(cors.allow_origin(AllowOrigin::list(origins)))
}

pub fn build_router<S: GameStore>(state: WebServerState<S>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(api::health))
        .route("/create-game", post(api::create_game::<S>))
        .route("/join-game", post(api::join_game::<S>))
        .route("/game-state/{game_id}", get(api::get_game_state::<S>))
        .route("/move", post(api::make_move::<S>))
        .route("/reset-game", post(api::reset_game::<S>))
        .route("/wait-for-update/{game_id}", get(api::wait_for_update::<S>))
        .route("/ws/{game_id}", get(ws_upgrade_handler::<S>))
        .layer(cors)
        .with_state(state)
}

pub async fn run_web_server<S, F>(
    listener: TcpListener,
    state: WebServerState<S>,
    cors: CorsLayer,
    shutdown_signal: F,
) -> Result<(), String>
where
    S: GameStore,
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state, cors);

    if let Ok(addr) = listener.local_addr() {
        log!("Web server listening on {}", addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| format!("Web server error: {}", e))
}
