pub mod aggregator;
pub mod service;
pub mod subscriber;

mod errors;
pub mod models;

pub use aggregator::{calculate_leaderboard, resolve_nickname};
pub use errors::LeaderboardError;
pub use models::*;
pub use service::{DataSnapshot, LeaderboardService, LeaderboardServiceBuilder};
pub use subscriber::LeaderboardSubscriber;
