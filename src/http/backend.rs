use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::api::{InMemoryScoreboardApi, MigrationSummary, NewGame, ScoreboardApi};
use crate::records::{Game, GameStatus, Score, User};
use crate::shared::AppError;

/// Writes go straight to the in-memory backend, which publishes the change
/// events the leaderboard subscriber reacts to
pub type BackendState = Arc<InMemoryScoreboardApi>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGameRequest {
    /// Plain user id or `userId:displayName` token
    pub player_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordScoreRequest {
    pub player_id: String,
    pub round_number: u32,
    pub score: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatusRequest {
    pub game_status: GameStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    pub username: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigratePlayerRequest {
    pub user_id: String,
}

/// POST /games
#[instrument(name = "create_game", skip(backend))]
pub async fn create_game(
    State(backend): State<BackendState>,
    Json(request): Json<NewGame>,
) -> Result<Json<Game>, AppError> {
    if request.host_user_id.is_empty() {
        return Err(AppError::BadRequest("hostUserID is required".to_string()));
    }

    let game = backend.create_game(request).await;
    Ok(Json(game))
}

/// POST /games/:game_id/players
#[instrument(name = "join_game", skip(backend))]
pub async fn join_game(
    State(backend): State<BackendState>,
    Path(game_id): Path<String>,
    Json(request): Json<JoinGameRequest>,
) -> Result<Json<Game>, AppError> {
    let game = backend.join_game(&game_id, &request.player_id).await?;
    Ok(Json(game))
}

/// PUT /games/:game_id/scores
#[instrument(name = "record_score", skip(backend))]
pub async fn record_score(
    State(backend): State<BackendState>,
    Path(game_id): Path<String>,
    Json(request): Json<RecordScoreRequest>,
) -> Result<Json<Score>, AppError> {
    let score = backend
        .record_score(
            &game_id,
            &request.player_id,
            request.round_number,
            request.score,
        )
        .await?;
    Ok(Json(score))
}

/// PUT /games/:game_id/status
#[instrument(name = "set_game_status", skip(backend))]
pub async fn set_game_status(
    State(backend): State<BackendState>,
    Path(game_id): Path<String>,
    Json(request): Json<GameStatusRequest>,
) -> Result<Json<Game>, AppError> {
    let game = backend
        .set_game_status(&game_id, request.game_status)
        .await?;
    Ok(Json(game))
}

/// PUT /users/:user_id
/// Keeps the original creation time when the user already exists
#[instrument(name = "upsert_user", skip(backend))]
pub async fn upsert_user(
    State(backend): State<BackendState>,
    Path(user_id): Path<String>,
    Json(request): Json<UserRequest>,
) -> Result<Json<User>, AppError> {
    let now = Utc::now();
    let created_at = backend
        .list_users()
        .await?
        .into_iter()
        .find(|u| u.id == user_id)
        .map_or(now, |u| u.created_at);

    let user = User {
        id: user_id,
        username: request.username,
        email: request.email,
        created_at,
        updated_at: now,
    };
    backend.upsert_user(user.clone()).await;
    Ok(Json(user))
}

/// POST /players/:guest_id/migrate
#[instrument(name = "migrate_player", skip(backend))]
pub async fn migrate_player(
    State(backend): State<BackendState>,
    Path(guest_id): Path<String>,
    Json(request): Json<MigratePlayerRequest>,
) -> Result<Json<MigrationSummary>, AppError> {
    let summary = backend.migrate_player(&guest_id, &request.user_id).await?;

    info!(
        guest_id = %guest_id,
        user_id = %request.user_id,
        scores_moved = summary.scores_moved,
        "Guest migrated over HTTP"
    );
    Ok(Json(summary))
}
