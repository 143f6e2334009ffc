use tokio::sync::broadcast;
use tracing::debug;

use super::events::DataEvent;

/// Event bus distributing data change events to every subscriber
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DataEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering up to `capacity` undelivered events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emits an event to all current subscribers
    pub fn emit(&self, event: DataEvent) {
        let event_type = event.event_type();
        match self.sender.send(event) {
            Ok(receiver_count) => {
                debug!(
                    event_type,
                    receivers = receiver_count,
                    "Data event emitted"
                );
            }
            Err(_) => {
                debug!(event_type, "Data event emitted with no receivers");
            }
        }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<DataEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
