use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{ApiError, ScoreboardApi};
use crate::event::{DataEvent, EventBus};
use crate::records::{player_token_id, Game, GameStatus, Score, User, WinCondition};

/// Initial backend contents, as exported from the managed API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub games: Vec<Game>,
    #[serde(default)]
    pub scores: Vec<Score>,
    #[serde(default)]
    pub users: Vec<User>,
}

/// Parameters for creating a game
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGame {
    #[serde(default)]
    pub game_name: Option<String>,
    #[serde(rename = "hostUserID")]
    pub host_user_id: String,
    #[serde(default)]
    pub win_condition: Option<WinCondition>,
}

/// What moving a guest's history onto an account changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationSummary {
    pub games_updated: usize,
    pub scores_moved: usize,
    /// Guest scores discarded because that game round already had a score
    /// from the account or from another of the guest's tokens
    pub scores_dropped: usize,
}

#[derive(Debug, Default)]
struct BackendState {
    games: Vec<Game>,
    scores: Vec<Score>,
    users: Vec<User>,
}

/// In-memory stand-in for the managed backend, for development and testing
///
/// Collections keep insertion order, which is the order listings return.
/// Mutations publish a DataEvent when an event bus is attached.
#[derive(Debug, Default)]
pub struct InMemoryScoreboardApi {
    state: RwLock<BackendState>,
    event_bus: Option<EventBus>,
}

impl InMemoryScoreboardApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: Seed) -> Self {
        info!(
            games = seed.games.len(),
            scores = seed.scores.len(),
            users = seed.users.len(),
            "Seeding in-memory backend"
        );
        Self {
            state: RwLock::new(BackendState {
                games: seed.games,
                scores: seed.scores,
                users: seed.users,
            }),
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    #[instrument(skip(self, new_game))]
    pub async fn create_game(&self, new_game: NewGame) -> Game {
        let now = Utc::now();
        let game = Game {
            id: Uuid::new_v4().to_string(),
            game_name: new_game.game_name,
            player_ids: vec![new_game.host_user_id.clone()],
            host_user_id: new_game.host_user_id,
            game_status: GameStatus::Active,
            win_condition: new_game.win_condition,
            rounds: 0,
            created_at: now,
            updated_at: now,
        };

        self.state.write().await.games.push(game.clone());
        info!(game_id = %game.id, host = %game.host_user_id, "Game created");

        self.emit(DataEvent::GameChanged {
            game_id: game.id.clone(),
        });
        game
    }

    /// Adds a player token to a game; joining twice is a no-op
    #[instrument(skip(self))]
    pub async fn join_game(&self, game_id: &str, player_token: &str) -> Result<Game, ApiError> {
        let (game, joined) = {
            let mut state = self.state.write().await;
            let game = state
                .games
                .iter_mut()
                .find(|g| g.id == game_id)
                .ok_or_else(|| ApiError::NotFound(format!("game {game_id}")))?;

            if game.game_status != GameStatus::Active {
                return Err(ApiError::Invalid(format!(
                    "game {game_id} is {} and cannot be joined",
                    game.game_status
                )));
            }

            if game.has_player(player_token_id(player_token)) {
                debug!(game_id, player_token, "Player already in game");
                (game.clone(), false)
            } else {
                game.player_ids.push(player_token.to_string());
                game.updated_at = Utc::now();
                (game.clone(), true)
            }
        };

        if joined {
            info!(
                game_id,
                player_token,
                player_count = game.player_ids.len(),
                "Player joined game"
            );
            self.emit(DataEvent::GameChanged {
                game_id: game_id.to_string(),
            });
        }
        Ok(game)
    }

    /// Records a round score, replacing any earlier score for the same player and round
    #[instrument(skip(self))]
    pub async fn record_score(
        &self,
        game_id: &str,
        player_id: &str,
        round_number: u32,
        score: i32,
    ) -> Result<Score, ApiError> {
        if round_number == 0 {
            return Err(ApiError::Invalid("round numbers start at 1".to_string()));
        }

        let recorded = {
            let mut guard = self.state.write().await;
            let state = &mut *guard;

            let game = state
                .games
                .iter_mut()
                .find(|g| g.id == game_id)
                .ok_or_else(|| ApiError::NotFound(format!("game {game_id}")))?;

            if !game.has_player(player_id) {
                warn!(game_id, player_id, "Score recorded for player outside game");
                return Err(ApiError::Invalid(format!(
                    "player {player_id} is not in game {game_id}"
                )));
            }

            let now = Utc::now();
            game.rounds = game.rounds.max(round_number);
            game.updated_at = now;

            // `guest-1` and `guest-1:Sam` are the same participant
            let participant = player_token_id(player_id);
            let existing = state.scores.iter().position(|s| {
                s.game_id == game_id
                    && s.round_number == round_number
                    && player_token_id(&s.player_id) == participant
            });

            match existing {
                Some(index) => {
                    let existing = &mut state.scores[index];
                    existing.score = score;
                    existing.updated_at = now;
                    existing.clone()
                }
                None => {
                    let created = Score {
                        id: Uuid::new_v4().to_string(),
                        game_id: game_id.to_string(),
                        player_id: player_id.to_string(),
                        round_number,
                        score,
                        created_at: now,
                        updated_at: now,
                    };
                    state.scores.push(created.clone());
                    created
                }
            }
        };

        debug!(game_id, player_id, round_number, score, "Score recorded");
        self.emit(DataEvent::ScoreChanged {
            game_id: game_id.to_string(),
            player_id: player_id.to_string(),
        });
        Ok(recorded)
    }

    #[instrument(skip(self))]
    pub async fn set_game_status(
        &self,
        game_id: &str,
        status: GameStatus,
    ) -> Result<Game, ApiError> {
        let game = {
            let mut state = self.state.write().await;
            let game = state
                .games
                .iter_mut()
                .find(|g| g.id == game_id)
                .ok_or_else(|| ApiError::NotFound(format!("game {game_id}")))?;
            game.game_status = status;
            game.updated_at = Utc::now();
            game.clone()
        };

        info!(game_id, status = %status, "Game status changed");
        self.emit(DataEvent::GameChanged {
            game_id: game_id.to_string(),
        });
        Ok(game)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn upsert_user(&self, user: User) {
        let user_id = user.id.clone();
        {
            let mut state = self.state.write().await;
            match state.users.iter_mut().find(|u| u.id == user.id) {
                Some(existing) => *existing = user,
                None => state.users.push(user),
            }
        }

        self.emit(DataEvent::UserChanged { user_id });
    }

    /// Moves a guest's games and scores onto a signed-in account
    ///
    /// Guest tokens (`guestId` or `guestId:name`) become the plain account id.
    /// When the account already has a score for the same game and round, the
    /// guest's score is dropped.
    #[instrument(skip(self))]
    pub async fn migrate_player(
        &self,
        guest_id: &str,
        user_id: &str,
    ) -> Result<MigrationSummary, ApiError> {
        if guest_id == user_id {
            return Err(ApiError::Invalid(
                "cannot migrate a player onto itself".to_string(),
            ));
        }

        let (summary, touched_games) = {
            let mut guard = self.state.write().await;
            let state = &mut *guard;
            let now = Utc::now();
            let mut summary = MigrationSummary::default();
            let mut touched_games: Vec<String> = Vec::new();

            for game in state
                .games
                .iter_mut()
                .filter(|g| g.has_player(guest_id) || g.host_user_id == guest_id)
            {
                let mut player_ids: Vec<String> = Vec::with_capacity(game.player_ids.len());
                for token in game.player_ids.drain(..) {
                    let token = if player_token_id(&token) == guest_id {
                        user_id.to_string()
                    } else {
                        token
                    };
                    if !player_ids
                        .iter()
                        .any(|kept| player_token_id(kept) == player_token_id(&token))
                    {
                        player_ids.push(token);
                    }
                }
                game.player_ids = player_ids;

                if game.host_user_id == guest_id {
                    game.host_user_id = user_id.to_string();
                }
                game.updated_at = now;
                summary.games_updated += 1;
                touched_games.push(game.id.clone());
            }

            // Rounds the account already holds; the guest keeps at most one row
            // for any other round
            let mut taken: HashSet<(String, u32)> = state
                .scores
                .iter()
                .filter(|s| player_token_id(&s.player_id) == user_id)
                .map(|s| (s.game_id.clone(), s.round_number))
                .collect();

            let before = state.scores.len();
            state.scores.retain(|s| {
                player_token_id(&s.player_id) != guest_id
                    || taken.insert((s.game_id.clone(), s.round_number))
            });
            summary.scores_dropped = before - state.scores.len();

            for score in state
                .scores
                .iter_mut()
                .filter(|s| player_token_id(&s.player_id) == guest_id)
            {
                score.player_id = user_id.to_string();
                score.updated_at = now;
                summary.scores_moved += 1;
                if !touched_games.contains(&score.game_id) {
                    touched_games.push(score.game_id.clone());
                }
            }

            (summary, touched_games)
        };

        info!(
            guest_id,
            user_id,
            games_updated = summary.games_updated,
            scores_moved = summary.scores_moved,
            scores_dropped = summary.scores_dropped,
            "Guest history migrated"
        );

        for game_id in touched_games {
            self.emit(DataEvent::GameChanged {
                game_id: game_id.clone(),
            });
            self.emit(DataEvent::ScoreChanged {
                game_id,
                player_id: user_id.to_string(),
            });
        }

        Ok(summary)
    }

    fn emit(&self, event: DataEvent) {
        if let Some(event_bus) = &self.event_bus {
            event_bus.emit(event);
        }
    }
}

#[async_trait]
impl ScoreboardApi for InMemoryScoreboardApi {
    #[instrument(skip(self))]
    async fn list_games(&self) -> Result<Vec<Game>, ApiError> {
        let games = self.state.read().await.games.clone();
        debug!(count = games.len(), "Listed games from memory");
        Ok(games)
    }

    #[instrument(skip(self))]
    async fn list_scores(&self) -> Result<Vec<Score>, ApiError> {
        let scores = self.state.read().await.scores.clone();
        debug!(count = scores.len(), "Listed scores from memory");
        Ok(scores)
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let users = self.state.read().await.users.clone();
        debug!(count = users.len(), "Listed users from memory");
        Ok(users)
    }
}
