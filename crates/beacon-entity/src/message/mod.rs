//! Queued messages and realtime event definitions.

pub mod event;
pub mod model;

pub use event::PresenceChangedEvent;
pub use model::{MessageStatus, QueuedMessage};

/// Reserved channel holding global broadcast records.
pub const BROADCAST_CHANNEL: &str = "broadcast";

/// Reserved channel holding user-to-user direct messages.
pub const DIRECT_CHANNEL: &str = "direct";

/// Reserved channel for presence subscriptions.
pub const PRESENCE_CHANNEL: &str = "presence";
