// Library crate for the ScoreBoard leaderboard service
// This file exposes the public API for the binary and integration tests

pub mod api;
pub mod cache;
pub mod config;
pub mod event;
pub mod http;
pub mod leaderboard;
pub mod records;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use api::{ApiError, InMemoryScoreboardApi, ScoreboardApi};
pub use cache::{FetchCache, ResourceKey};
pub use config::ScoreboardConfig;
pub use event::{DataEvent, EventBus, EventSubscription};
pub use leaderboard::{
    LeaderboardService, LeaderboardSubscriber, LeaderboardView, PlayerLeaderboardEntry,
};
pub use shared::{AppError, AppState};
