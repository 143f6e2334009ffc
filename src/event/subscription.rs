use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{bus::EventBus, events::DataEvent, handler::DataEventHandler};

/// Listens to the event bus and routes every event to a handler
pub struct EventSubscription {
    handler: Arc<dyn DataEventHandler>,
    event_bus: EventBus,
}

impl EventSubscription {
    pub fn new(handler: Arc<dyn DataEventHandler>, event_bus: EventBus) -> Self {
        Self { handler, event_bus }
    }

    /// Start the subscription - spawns a background task that listens to events
    /// and routes them to the handler
    ///
    /// The receiver is registered before this returns, so events emitted
    /// afterwards are never missed.
    pub fn start(self) -> JoinHandle<()> {
        let handler_name = self.handler.handler_name();
        let mut receiver = self.event_bus.subscribe();

        info!(handler = handler_name, "Starting event subscription");

        tokio::spawn(async move {
            loop {
                let event = match receiver.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        // Missed changes are unknown, so resync everything
                        warn!(
                            handler = handler_name,
                            skipped, "Event subscription lagged - requesting full refresh"
                        );
                        DataEvent::RefreshRequested
                    }
                    Err(RecvError::Closed) => break,
                };

                debug!(
                    handler = handler_name,
                    event_type = event.event_type(),
                    "Received data event"
                );

                if let Err(e) = self.handler.handle_event(event).await {
                    warn!(
                        handler = handler_name,
                        error = %e,
                        "Data event handler failed"
                    );
                }
            }

            warn!(
                handler = handler_name,
                "Event subscription ended - bus closed"
            );
        })
    }
}
