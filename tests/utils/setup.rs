use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use scoreboard::{
    api::Seed, EventBus, EventSubscription, InMemoryScoreboardApi, LeaderboardService,
    LeaderboardSubscriber, LeaderboardView,
};

use super::mocks::CountingApi;

// ============================================================================
// Test Setup
// ============================================================================

pub struct TestSetup {
    pub event_bus: EventBus,
    pub api: Arc<CountingApi>,
    pub leaderboard_service: Arc<LeaderboardService>,
    pub subscription: Option<JoinHandle<()>>,
}

impl TestSetup {
    /// Seeded backend and service, with no event subscription running
    pub fn new(seed: Seed) -> Self {
        Self::with_ttl(seed, Duration::from_secs(300))
    }

    pub fn with_ttl(seed: Seed, cache_ttl: Duration) -> Self {
        let event_bus = EventBus::new(100);
        let api = Arc::new(CountingApi::new(
            InMemoryScoreboardApi::from_seed(seed).with_event_bus(event_bus.clone()),
        ));
        let leaderboard_service = Arc::new(
            LeaderboardService::builder(api.clone())
                .with_cache_ttl(cache_ttl)
                .build(),
        );

        Self {
            event_bus,
            api,
            leaderboard_service,
            subscription: None,
        }
    }

    /// Starts recomputing the leaderboard on backend change events
    pub fn subscribed(mut self) -> Self {
        let subscriber = Arc::new(LeaderboardSubscriber::new(
            self.leaderboard_service.clone(),
            self.event_bus.clone(),
        ));
        self.subscription =
            Some(EventSubscription::new(subscriber, self.event_bus.clone()).start());
        self
    }

    pub fn backend(&self) -> &Arc<InMemoryScoreboardApi> {
        &self.api.inner
    }

    /// Polls the published leaderboard until `predicate` holds
    pub async fn wait_for_leaderboard<F>(&self, predicate: F) -> Arc<LeaderboardView>
    where
        F: Fn(&LeaderboardView) -> bool,
    {
        for _ in 0..200 {
            let view = self.leaderboard_service.leaderboard().await;
            if predicate(&view) {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("leaderboard never reached the expected state");
    }
}

impl Drop for TestSetup {
    fn drop(&mut self) {
        if let Some(handle) = self.subscription.take() {
            handle.abort();
        }
    }
}
