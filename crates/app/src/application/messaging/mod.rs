//! Event-based messaging between modules

mod event_bus;

pub use event_bus::{EventBus, EventHandler};
