use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Lifecycle state of a game as stored by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Active,
    Completed,
    Cancelled,
}

/// Rule deciding whether the highest or the lowest score wins a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WinCondition {
    #[serde(alias = "highestScore")]
    #[strum(to_string = "HIGHEST_SCORE", serialize = "highestScore")]
    HighestScore,
    #[serde(alias = "lowestScore")]
    #[strum(to_string = "LOWEST_SCORE", serialize = "lowestScore")]
    LowestScore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    #[serde(default)]
    pub game_name: Option<String>,
    #[serde(rename = "hostUserID")]
    pub host_user_id: String,
    /// Plain user ids, or `userId:displayName` tokens for anonymous players
    #[serde(rename = "playerIDs", default)]
    pub player_ids: Vec<String>,
    pub game_status: GameStatus,
    #[serde(default)]
    pub win_condition: Option<WinCondition>,
    #[serde(default)]
    pub rounds: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Game {
    /// Whether the game can produce a winner
    pub fn is_decided(&self) -> bool {
        self.game_status == GameStatus::Completed && self.win_condition.is_some()
    }

    /// Check if a player takes part in this game, by full token or by user id
    pub fn has_player(&self, player_id: &str) -> bool {
        self.player_ids
            .iter()
            .any(|token| token == player_id || player_token_id(token) == player_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub id: String,
    #[serde(rename = "gameID")]
    pub game_id: String,
    #[serde(rename = "playerID")]
    pub player_id: String,
    pub round_number: u32, // 1-based
    pub score: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User id part of a player token (`userId` or `userId:displayName`)
pub fn player_token_id(token: &str) -> &str {
    token.split_once(':').map_or(token, |(id, _)| id)
}
