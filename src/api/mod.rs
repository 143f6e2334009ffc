// Managed backend boundary: the read trait the leaderboard depends on and an
// in-memory implementation carrying the game-editing operations

pub use client::ScoreboardApi;
pub use errors::ApiError;
pub use in_memory::{InMemoryScoreboardApi, MigrationSummary, NewGame, Seed};

mod client;
mod errors;
mod in_memory;
