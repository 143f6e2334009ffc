// Time-bounded bookkeeping of full-collection fetches

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use tokio::time::Instant;
use tracing::debug;

/// How long a fetched collection stays fresh
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// The collections fetched from the backend
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKey {
    Games,
    Scores,
    Users,
}

/// Tracks when each resource was last fetched successfully
///
/// Only successful fetches are recorded, so a failed fetch is retried on
/// the next check. There is no eviction: the key set is fixed.
#[derive(Debug, Clone)]
pub struct FetchCache {
    ttl: Duration,
    last_fetched: HashMap<ResourceKey, Instant>,
}

impl FetchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            last_fetched: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// True if the resource was never fetched or its last fetch is older than the TTL
    pub fn should_fetch(&self, key: ResourceKey) -> bool {
        match self.last_fetched.get(&key) {
            Some(fetched_at) => fetched_at.elapsed() > self.ttl,
            None => true,
        }
    }

    /// Records a successful fetch at the current instant
    pub fn mark_fetched(&mut self, key: ResourceKey) {
        debug!(resource = %key, "Marking resource as fetched");
        self.last_fetched.insert(key, Instant::now());
    }

    pub fn invalidate(&mut self, key: ResourceKey) {
        debug!(resource = %key, "Invalidating cached resource");
        self.last_fetched.remove(&key);
    }

    pub fn invalidate_all(&mut self) {
        debug!("Invalidating all cached resources");
        self.last_fetched.clear();
    }
}

impl Default for FetchCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}
