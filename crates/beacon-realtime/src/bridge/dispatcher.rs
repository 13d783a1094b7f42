//! Presence-change notification sinks.

use tokio::sync::broadcast;
use tracing::trace;

use beacon_entity::message::PresenceChangedEvent;

/// Receives presence-change events. Delivery is not guaranteed.
pub trait EventDispatcher: Send + Sync + std::fmt::Debug + 'static {
    /// Hand off one event. Must not block.
    fn dispatch(&self, event: &PresenceChangedEvent);
}

/// Dispatcher used when nothing listens for presence changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDispatcher;

impl EventDispatcher for NullDispatcher {
    fn dispatch(&self, _event: &PresenceChangedEvent) {}
}

/// Fans presence changes out to in-process listeners.
///
/// Slow listeners lag and lose the oldest events.
#[derive(Debug, Clone)]
pub struct BroadcastDispatcher {
    tx: broadcast::Sender<PresenceChangedEvent>,
}

impl BroadcastDispatcher {
    /// Create a dispatcher buffering up to `capacity` events per listener.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Register a listener.
    pub fn subscribe(&self) -> broadcast::Receiver<PresenceChangedEvent> {
        self.tx.subscribe()
    }
}

impl EventDispatcher for BroadcastDispatcher {
    fn dispatch(&self, event: &PresenceChangedEvent) {
        if self.tx.send(event.clone()).is_err() {
            trace!(user_id = %event.user_id, "No presence listeners");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_core::types::UserId;
    use beacon_entity::presence::PresenceStatus;
    use chrono::Utc;

    #[tokio::test]
    async fn test_listener_receives_event() {
        let dispatcher = BroadcastDispatcher::new(4);
        let mut rx = dispatcher.subscribe();
        let event = PresenceChangedEvent::new(
            UserId::new(),
            PresenceStatus::Offline,
            PresenceStatus::Online,
            Utc::now(),
        );
        dispatcher.dispatch(&event);
        assert_eq!(rx.recv().await.unwrap(), event);
    }
}
