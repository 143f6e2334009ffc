// Records owned by the managed backend: games, per-round scores and users

pub use models::{player_token_id, Game, GameStatus, Score, User, WinCondition};

pub mod models;
