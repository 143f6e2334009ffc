// HTTP surface: leaderboard reads plus writes into the in-memory backend

pub use backend::BackendState;
pub use handlers::{get_leaderboard, get_player_entry, health, refresh_leaderboard};

mod backend;
mod handlers;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::shared::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/leaderboard", get(get_leaderboard))
        .route("/leaderboard/players/:player_id", get(get_player_entry))
        .route("/leaderboard/refresh", post(refresh_leaderboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Routes that edit games, scores and users; every write emits a change event
pub fn backend_router(backend: BackendState) -> Router {
    Router::new()
        .route("/games", post(backend::create_game))
        .route("/games/:game_id/players", post(backend::join_game))
        .route("/games/:game_id/scores", put(backend::record_score))
        .route("/games/:game_id/status", put(backend::set_game_status))
        .route("/users/:user_id", put(backend::upsert_user))
        .route("/players/:guest_id/migrate", post(backend::migrate_player))
        .layer(TraceLayer::new_for_http())
        .with_state(backend)
}
