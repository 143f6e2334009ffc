// Event-driven change notification
//
// Backend mutations publish DataEvents on the bus; subscriptions route them
// to handlers such as the leaderboard subscriber.

// Public API - what other modules can use
pub use bus::EventBus;
pub use events::DataEvent;
pub use handler::{DataEventHandler, EventHandlerError};
pub use subscription::EventSubscription;

// Internal modules
mod bus;
mod events;
mod handler;
mod subscription;
