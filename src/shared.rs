use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::api::ApiError;
use crate::leaderboard::{LeaderboardError, LeaderboardService};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub leaderboard_service: Arc<LeaderboardService>,
}

impl AppState {
    pub fn new(leaderboard_service: Arc<LeaderboardService>) -> Self {
        Self {
            leaderboard_service,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound(msg) => AppError::NotFound(msg),
            ApiError::Invalid(msg) => AppError::BadRequest(msg),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl From<LeaderboardError> for AppError {
    fn from(err: LeaderboardError) -> Self {
        AppError::Upstream(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Upstream(msg) => (
                StatusCode::BAD_GATEWAY,
                format!("Backend error: {}", msg),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
