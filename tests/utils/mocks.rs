use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use scoreboard::{
    records::{Game, Score, User},
    ApiError, InMemoryScoreboardApi, ResourceKey, ScoreboardApi,
};

// ============================================================================
// Mock Infrastructure
// ============================================================================

#[derive(Default)]
struct ResourceSwitch {
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl ResourceSwitch {
    fn hit(&self, resource: ResourceKey) -> Result<(), ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ApiError::Unavailable(format!("{resource} endpoint is down")));
        }
        Ok(())
    }
}

/// Backend wrapper that counts list calls and can fail any collection
pub struct CountingApi {
    pub inner: Arc<InMemoryScoreboardApi>,
    games: ResourceSwitch,
    scores: ResourceSwitch,
    users: ResourceSwitch,
}

impl CountingApi {
    pub fn new(inner: InMemoryScoreboardApi) -> Self {
        Self {
            inner: Arc::new(inner),
            games: ResourceSwitch::default(),
            scores: ResourceSwitch::default(),
            users: ResourceSwitch::default(),
        }
    }

    fn switch(&self, resource: ResourceKey) -> &ResourceSwitch {
        match resource {
            ResourceKey::Games => &self.games,
            ResourceKey::Scores => &self.scores,
            ResourceKey::Users => &self.users,
        }
    }

    pub fn calls(&self, resource: ResourceKey) -> usize {
        self.switch(resource).calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, resource: ResourceKey, failing: bool) {
        self.switch(resource).failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ScoreboardApi for CountingApi {
    async fn list_games(&self) -> Result<Vec<Game>, ApiError> {
        self.games.hit(ResourceKey::Games)?;
        self.inner.list_games().await
    }

    async fn list_scores(&self) -> Result<Vec<Score>, ApiError> {
        self.scores.hit(ResourceKey::Scores)?;
        self.inner.list_scores().await
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.users.hit(ResourceKey::Users)?;
        self.inner.list_users().await
    }
}
