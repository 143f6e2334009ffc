use serde::{Deserialize, Serialize};

use crate::cache::ResourceKey;

/// Events describing changes to backend data and to the derived leaderboard
///
/// Events represent facts about things that have already happened. The
/// backend layer emits them after mutations so the leaderboard can be
/// invalidated and recomputed without being tied to any caller's lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataEvent {
    /// A game was created, joined, or had its status changed
    GameChanged { game_id: String },

    /// A score row was recorded or reassigned
    ScoreChanged { game_id: String, player_id: String },

    /// A user record was created or updated
    UserChanged { user_id: String },

    /// Someone asked for a full refresh
    RefreshRequested,

    /// The leaderboard was recomputed from a fresh snapshot
    LeaderboardRecomputed { player_count: usize },
}

impl DataEvent {
    /// The cached resource made stale by this event, if any
    pub fn stale_resource(&self) -> Option<ResourceKey> {
        match self {
            DataEvent::GameChanged { .. } => Some(ResourceKey::Games),
            DataEvent::ScoreChanged { .. } => Some(ResourceKey::Scores),
            DataEvent::UserChanged { .. } => Some(ResourceKey::Users),
            DataEvent::RefreshRequested | DataEvent::LeaderboardRecomputed { .. } => None,
        }
    }

    /// Get a human-readable description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            DataEvent::GameChanged { .. } => "game_changed",
            DataEvent::ScoreChanged { .. } => "score_changed",
            DataEvent::UserChanged { .. } => "user_changed",
            DataEvent::RefreshRequested => "refresh_requested",
            DataEvent::LeaderboardRecomputed { .. } => "leaderboard_recomputed",
        }
    }
}
