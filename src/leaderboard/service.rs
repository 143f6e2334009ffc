use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use super::{
    aggregator::calculate_leaderboard, AggregationOptions, LeaderboardError, LeaderboardView,
    PlayerLeaderboardEntry, TieBreak,
};
use crate::api::{ApiError, ScoreboardApi};
use crate::cache::{FetchCache, ResourceKey, DEFAULT_CACHE_TTL};
use crate::records::{Game, Score, User};

/// The latest successfully fetched collections
///
/// Each collection is replaced wholesale after a successful fetch; readers
/// holding an older snapshot keep a consistent view. After a partial fetch
/// failure the snapshot can be newer than the published leaderboard, which
/// is only recomputed once every stale collection has been fetched.
#[derive(Debug, Clone, Default)]
pub struct DataSnapshot {
    pub games: Arc<Vec<Game>>,
    pub scores: Arc<Vec<Score>>,
    pub users: Arc<Vec<User>>,
}

/// Fetches backend collections through the TTL cache and keeps the
/// leaderboard computed from them
pub struct LeaderboardService {
    api: Arc<dyn ScoreboardApi>,
    options: AggregationOptions,
    cache: Mutex<FetchCache>,
    snapshot: RwLock<Arc<DataSnapshot>>,
    view: RwLock<Arc<LeaderboardView>>,
    // Held for a whole fetch-then-aggregate cycle
    refresh_lock: Mutex<()>,
}

impl LeaderboardService {
    pub fn builder(api: Arc<dyn ScoreboardApi>) -> LeaderboardServiceBuilder {
        LeaderboardServiceBuilder::new(api)
    }

    /// The last published leaderboard, without touching the backend
    pub async fn leaderboard(&self) -> Arc<LeaderboardView> {
        self.view.read().await.clone()
    }

    pub async fn snapshot(&self) -> Arc<DataSnapshot> {
        self.snapshot.read().await.clone()
    }

    pub async fn entry_for(&self, player_id: &str) -> Option<PlayerLeaderboardEntry> {
        self.view.read().await.entry_for(player_id).cloned()
    }

    pub async fn invalidate(&self, key: ResourceKey) {
        self.cache.lock().await.invalidate(key);
    }

    pub async fn invalidate_all(&self) {
        self.cache.lock().await.invalidate_all();
    }

    /// Refreshes stale collections and returns the leaderboard, falling back
    /// to the previous one (with its error recorded) when a fetch fails
    pub async fn load(&self) -> Arc<LeaderboardView> {
        match self.refresh().await {
            Ok(view) => view,
            Err(err) => {
                warn!(error = %err, "Serving stale leaderboard");
                self.leaderboard().await
            }
        }
    }

    /// Fetches every collection whose TTL has lapsed and recomputes the leaderboard
    pub async fn refresh(&self) -> Result<Arc<LeaderboardView>, LeaderboardError> {
        self.run_refresh(&[]).await
    }

    /// Refetches one collection regardless of its TTL
    pub async fn refresh_resource(
        &self,
        key: ResourceKey,
    ) -> Result<Arc<LeaderboardView>, LeaderboardError> {
        self.run_refresh(&[key]).await
    }

    /// Refetches everything regardless of TTL
    pub async fn force_refresh(&self) -> Result<Arc<LeaderboardView>, LeaderboardError> {
        self.run_refresh(&[ResourceKey::Games, ResourceKey::Scores, ResourceKey::Users])
            .await
    }

    #[instrument(skip(self))]
    async fn run_refresh(
        &self,
        invalidate: &[ResourceKey],
    ) -> Result<Arc<LeaderboardView>, LeaderboardError> {
        let _in_flight = self.refresh_lock.lock().await;

        let (fetch_games, fetch_scores, fetch_users) = {
            let mut cache = self.cache.lock().await;
            for key in invalidate {
                cache.invalidate(*key);
            }
            (
                cache.should_fetch(ResourceKey::Games),
                cache.should_fetch(ResourceKey::Scores),
                cache.should_fetch(ResourceKey::Users),
            )
        };

        debug!(fetch_games, fetch_scores, fetch_users, "Starting refresh");

        let (games, scores, users) = futures::join!(
            fetch_if(fetch_games, self.api.list_games()),
            fetch_if(fetch_scores, self.api.list_scores()),
            fetch_if(fetch_users, self.api.list_users()),
        );

        let mut snapshot = DataSnapshot::clone(&*self.snapshot().await);
        let mut outcome = FetchOutcome::default();
        {
            let mut cache = self.cache.lock().await;
            outcome.apply(&mut cache, ResourceKey::Games, games, &mut snapshot.games);
            outcome.apply(&mut cache, ResourceKey::Scores, scores, &mut snapshot.scores);
            outcome.apply(&mut cache, ResourceKey::Users, users, &mut snapshot.users);
        }

        let snapshot = Arc::new(snapshot);
        if outcome.changed {
            *self.snapshot.write().await = snapshot.clone();
        }

        if let Some(err) = outcome.failure {
            let mut view = self.view.write().await;
            let mut stale = LeaderboardView::clone(&view);
            stale.last_error = Some(err.to_string());
            *view = Arc::new(stale);
            return Err(err);
        }

        let current = self.leaderboard().await;
        if !outcome.changed && current.is_computed() {
            debug!("All collections fresh, keeping current leaderboard");
            return Ok(current);
        }

        let entries = calculate_leaderboard(
            &snapshot.games,
            &snapshot.scores,
            &snapshot.users,
            &self.options,
        );
        let view = Arc::new(LeaderboardView {
            entries,
            computed_at: Some(Utc::now()),
            last_error: None,
        });
        *self.view.write().await = view.clone();

        info!(
            player_count = view.entries.len(),
            games = snapshot.games.len(),
            scores = snapshot.scores.len(),
            users = snapshot.users.len(),
            "Leaderboard recomputed"
        );

        Ok(view)
    }
}

async fn fetch_if<T, F>(needed: bool, fetch: F) -> Option<Result<Vec<T>, ApiError>>
where
    F: Future<Output = Result<Vec<T>, ApiError>>,
{
    if needed {
        Some(fetch.await)
    } else {
        None
    }
}

#[derive(Default)]
struct FetchOutcome {
    changed: bool,
    failure: Option<LeaderboardError>,
}

impl FetchOutcome {
    /// Stores a successful fetch and advances its TTL; failures leave both untouched
    fn apply<T>(
        &mut self,
        cache: &mut FetchCache,
        key: ResourceKey,
        fetched: Option<Result<Vec<T>, ApiError>>,
        slot: &mut Arc<Vec<T>>,
    ) {
        match fetched {
            None => {}
            Some(Ok(records)) => {
                debug!(resource = %key, count = records.len(), "Fetched resource");
                cache.mark_fetched(key);
                *slot = Arc::new(records);
                self.changed = true;
            }
            Some(Err(source)) => {
                warn!(resource = %key, error = %source, "Failed to fetch resource");
                if self.failure.is_none() {
                    self.failure = Some(LeaderboardError::Fetch {
                        resource: key,
                        source,
                    });
                }
            }
        }
    }
}

pub struct LeaderboardServiceBuilder {
    api: Arc<dyn ScoreboardApi>,
    cache_ttl: Duration,
    options: AggregationOptions,
}

impl LeaderboardServiceBuilder {
    fn new(api: Arc<dyn ScoreboardApi>) -> Self {
        Self {
            api,
            cache_ttl: DEFAULT_CACHE_TTL,
            options: AggregationOptions::default(),
        }
    }

    pub fn with_aggregation_options(mut self, options: AggregationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.options.limit = limit;
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.options.tie_break = tie_break;
        self
    }

    pub fn build(self) -> LeaderboardService {
        LeaderboardService {
            api: self.api,
            options: self.options,
            cache: Mutex::new(FetchCache::new(self.cache_ttl)),
            snapshot: RwLock::new(Arc::new(DataSnapshot::default())),
            view: RwLock::new(Arc::new(LeaderboardView::default())),
            refresh_lock: Mutex::new(()),
        }
    }
}
