use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::records::WinCondition;

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 100;
pub const UNTITLED_GAME: &str = "Untitled Game";
pub const UNKNOWN_PLAYER: &str = "Unknown Player";

/// One game a player won
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameWinDetail {
    pub game_id: String,
    pub game_name: String,
    pub win_condition: WinCondition,
    pub final_score: i32,
    pub date: DateTime<Utc>,
    pub total_players: usize,
}

/// Aggregated results for one player across every game they scored in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLeaderboardEntry {
    pub nickname: String,
    pub player_id: String,
    pub total_wins: u32,
    pub total_games: u32,
    pub win_rate: f64,
    pub highest_score_wins: u32,
    pub lowest_score_wins: u32,
    pub wins: Vec<GameWinDetail>,
}

/// The published leaderboard plus the outcome of the latest refresh
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardView {
    pub entries: Vec<PlayerLeaderboardEntry>,
    /// None until the first successful aggregation
    pub computed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl LeaderboardView {
    pub fn is_computed(&self) -> bool {
        self.computed_at.is_some()
    }

    pub fn entry_for(&self, player_id: &str) -> Option<&PlayerLeaderboardEntry> {
        self.entries.iter().find(|e| e.player_id == player_id)
    }
}

/// Which score wins when several share the winning value
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TieBreak {
    /// The score listed first by the backend
    #[default]
    FirstRecorded,
    /// The score with the earliest creation time, then the one listed first
    EarliestRecorded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationOptions {
    pub limit: usize,
    pub tie_break: TieBreak,
}

impl Default for AggregationOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LEADERBOARD_LIMIT,
            tie_break: TieBreak::default(),
        }
    }
}
