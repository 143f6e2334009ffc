use std::sync::Arc;
use tracing::{debug, error, instrument};

use super::LeaderboardService;
use crate::event::{DataEvent, DataEventHandler, EventBus, EventHandlerError};

/// Recomputes the leaderboard whenever backend data changes
pub struct LeaderboardSubscriber {
    leaderboard_service: Arc<LeaderboardService>,
    event_bus: EventBus,
}

impl LeaderboardSubscriber {
    pub fn new(leaderboard_service: Arc<LeaderboardService>, event_bus: EventBus) -> Self {
        Self {
            leaderboard_service,
            event_bus,
        }
    }
}

#[async_trait::async_trait]
impl DataEventHandler for LeaderboardSubscriber {
    #[instrument(skip(self), fields(event_type = event.event_type()))]
    async fn handle_event(&self, event: DataEvent) -> Result<(), EventHandlerError> {
        let result = match &event {
            DataEvent::LeaderboardRecomputed { .. } => return Ok(()),
            DataEvent::RefreshRequested => self.leaderboard_service.force_refresh().await,
            other => match other.stale_resource() {
                Some(key) => self.leaderboard_service.refresh_resource(key).await,
                None => return Ok(()),
            },
        };

        match result {
            Ok(view) => {
                debug!(player_count = view.entries.len(), "Leaderboard refreshed after change");
                self.event_bus.emit(DataEvent::LeaderboardRecomputed {
                    player_count: view.entries.len(),
                });
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "Failed to refresh leaderboard after change");
                Err(EventHandlerError::Refresh(err.to_string()))
            }
        }
    }

    fn handler_name(&self) -> &'static str {
        "LeaderboardSubscriber"
    }
}
