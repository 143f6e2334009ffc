use async_trait::async_trait;
use thiserror::Error;

use super::events::DataEvent;

/// Errors that can occur when handling data events
#[derive(Debug, Error)]
pub enum EventHandlerError {
    #[error("Refresh failed: {0}")]
    Refresh(String),
}

/// Trait for components that react to data change events
///
/// This provides a clean interface for reacting to backend changes
/// without being tied to whoever performed the mutation.
#[async_trait]
pub trait DataEventHandler: Send + Sync {
    /// Handle a data event
    ///
    /// Handlers receive every event on the bus and ignore the ones
    /// they have no interest in.
    async fn handle_event(&self, event: DataEvent) -> Result<(), EventHandlerError>;

    /// Get a human-readable name for this handler (for logging/debugging)
    fn handler_name(&self) -> &'static str;
}
