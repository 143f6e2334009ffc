use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::leaderboard::{LeaderboardView, PlayerLeaderboardEntry};
use crate::shared::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    /// Number of entries to return (defaults to the whole leaderboard)
    pub limit: Option<usize>,
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

/// HTTP handler for reading the leaderboard
///
/// GET /leaderboard?limit=N
/// Refreshes stale collections first; when the backend fails the previous
/// leaderboard is returned with `lastError` set.
#[instrument(name = "get_leaderboard", skip(state))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardView>, AppError> {
    if query.limit == Some(0) {
        return Err(AppError::BadRequest("limit must be positive".to_string()));
    }

    let view = state.leaderboard_service.load().await;
    let mut view = LeaderboardView::clone(&view);
    if let Some(limit) = query.limit {
        view.entries.truncate(limit);
    }

    info!(entry_count = view.entries.len(), "Leaderboard served");
    Ok(Json(view))
}

/// GET /leaderboard/players/:player_id
#[instrument(name = "get_player_entry", skip(state))]
pub async fn get_player_entry(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<PlayerLeaderboardEntry>, AppError> {
    state.leaderboard_service.load().await;

    state
        .leaderboard_service
        .entry_for(&player_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("player {player_id} is not on the leaderboard")))
}

/// POST /leaderboard/refresh
/// Refetches everything, ignoring the cache TTL
#[instrument(name = "refresh_leaderboard", skip(state))]
pub async fn refresh_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<LeaderboardView>, AppError> {
    info!("Forced leaderboard refresh requested");

    let view = state.leaderboard_service.force_refresh().await?;
    Ok(Json(LeaderboardView::clone(&view)))
}
