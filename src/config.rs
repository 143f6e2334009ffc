use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::cache::DEFAULT_CACHE_TTL;
use crate::leaderboard::{AggregationOptions, TieBreak, DEFAULT_LEADERBOARD_LIMIT};

pub const CACHE_TTL_VAR: &str = "SCOREBOARD_CACHE_TTL_SECS";
pub const LEADERBOARD_LIMIT_VAR: &str = "SCOREBOARD_LEADERBOARD_LIMIT";
pub const TIE_BREAK_VAR: &str = "SCOREBOARD_TIE_BREAK";
pub const BIND_ADDR_VAR: &str = "SCOREBOARD_BIND_ADDR";
pub const SEED_PATH_VAR: &str = "SCOREBOARD_SEED_PATH";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Runtime settings for the leaderboard server
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreboardConfig {
    /// How long fetched collections stay fresh
    pub cache_ttl: Duration,
    /// Maximum number of leaderboard entries
    pub leaderboard_limit: usize,
    pub tie_break: TieBreak,
    pub bind_addr: String,
    /// Undelivered events buffered per subscriber
    pub event_capacity: usize,
    /// JSON file with initial games, scores and users
    pub seed_path: Option<PathBuf>,
}

impl Default for ScoreboardConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
            tie_break: TieBreak::default(),
            bind_addr: "0.0.0.0:3000".to_string(),
            event_capacity: 100,
            seed_path: None,
        }
    }
}

impl ScoreboardConfig {
    /// Reads overrides from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup, falling back to defaults for missing keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(CACHE_TTL_VAR) {
            config.cache_ttl = Duration::from_secs(parse(CACHE_TTL_VAR, &value)?);
        }

        if let Some(value) = lookup(LEADERBOARD_LIMIT_VAR) {
            let limit: usize = parse(LEADERBOARD_LIMIT_VAR, &value)?;
            if limit == 0 {
                return Err(ConfigError::InvalidValue {
                    key: LEADERBOARD_LIMIT_VAR,
                    value,
                });
            }
            config.leaderboard_limit = limit;
        }

        if let Some(value) = lookup(TIE_BREAK_VAR) {
            config.tie_break = parse(TIE_BREAK_VAR, &value)?;
        }

        if let Some(value) = lookup(BIND_ADDR_VAR) {
            config.bind_addr = value;
        }

        config.seed_path = lookup(SEED_PATH_VAR).map(PathBuf::from);

        Ok(config)
    }

    pub fn aggregation_options(&self) -> AggregationOptions {
        AggregationOptions {
            limit: self.leaderboard_limit,
            tie_break: self.tie_break,
        }
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}
