use chrono::{DateTime, Duration, TimeZone, Utc};

use scoreboard::{
    api::Seed,
    records::{Game, GameStatus, Score, User, WinCondition},
};

// ============================================================================
// Seed Data Utilities
// ============================================================================

pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap() + Duration::minutes(minutes)
}

/// Builds backend contents with deterministic ids and timestamps
pub struct SeedBuilder {
    seed: Seed,
    clock: i64,
}

impl SeedBuilder {
    pub fn new() -> Self {
        Self {
            seed: Seed::default(),
            clock: 0,
        }
    }

    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        at(self.clock)
    }

    pub fn user(mut self, id: &str, username: &str) -> Self {
        let now = self.tick();
        self.seed.users.push(User {
            id: id.to_string(),
            username: username.to_string(),
            email: format!("{id}@example.com"),
            created_at: now,
            updated_at: now,
        });
        self
    }

    pub fn game(
        mut self,
        id: &str,
        status: GameStatus,
        win_condition: Option<WinCondition>,
        players: &[&str],
    ) -> Self {
        let now = self.tick();
        self.seed.games.push(Game {
            id: id.to_string(),
            game_name: Some(format!("Game {id}")),
            host_user_id: players.first().copied().unwrap_or_default().to_string(),
            player_ids: players.iter().map(|p| p.to_string()).collect(),
            game_status: status,
            win_condition,
            rounds: 1,
            created_at: now,
            updated_at: now,
        });
        self
    }

    pub fn completed_game(self, id: &str, win_condition: WinCondition, players: &[&str]) -> Self {
        self.game(id, GameStatus::Completed, Some(win_condition), players)
    }

    pub fn score(mut self, game_id: &str, player_id: &str, round_number: u32, value: i32) -> Self {
        let now = self.tick();
        self.seed.scores.push(Score {
            id: format!("{game_id}/{player_id}/{round_number}"),
            game_id: game_id.to_string(),
            player_id: player_id.to_string(),
            round_number,
            score: value,
            created_at: now,
            updated_at: now,
        });
        self
    }

    pub fn build(self) -> Seed {
        self.seed
    }
}
