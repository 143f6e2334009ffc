use thiserror::Error;

use crate::api::ApiError;
use crate::cache::ResourceKey;

#[derive(Debug, Clone, Error)]
pub enum LeaderboardError {
    /// The backend call for one collection failed; its previous snapshot is kept
    #[error("Failed to fetch {resource}: {source}")]
    Fetch {
        resource: ResourceKey,
        source: ApiError,
    },
}

impl LeaderboardError {
    pub fn resource(&self) -> ResourceKey {
        match self {
            LeaderboardError::Fetch { resource, .. } => *resource,
        }
    }
}
