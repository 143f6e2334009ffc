use async_trait::async_trait;

use super::ApiError;
use crate::records::{Game, Score, User};

/// Read side of the managed backend
///
/// Each call returns the full collection; paging is the client's concern.
#[async_trait]
pub trait ScoreboardApi: Send + Sync {
    async fn list_games(&self) -> Result<Vec<Game>, ApiError>;
    async fn list_scores(&self) -> Result<Vec<Score>, ApiError>;
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;
}
