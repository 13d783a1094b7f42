//! Persistence contracts for subscriptions, presence and the offline queue.
//!
//! The realtime components only talk to these traits. `beacon-database`
//! implements them on PostgreSQL; [`memory::MemoryRealtimeStore`] implements
//! them in process for single-node runs and tests.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use beacon_core::result::AppResult;
use beacon_core::types::{EventId, UserId};
use beacon_entity::message::QueuedMessage;
use beacon_entity::presence::{Presence, PresenceChange};
use beacon_entity::subscription::Subscription;

pub use memory::MemoryRealtimeStore;

/// Storage of `(user, channel)` subscription edges.
#[async_trait]
pub trait SubscriptionStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert an edge. Inserting an existing edge succeeds without a duplicate.
    async fn create_subscription(&self, subscription: &Subscription) -> AppResult<()>;

    /// Delete an edge. Returns whether an edge was removed.
    async fn remove_subscription(&self, user_id: UserId, channel: &str) -> AppResult<bool>;

    /// Channels the user is subscribed to.
    async fn user_subscriptions(&self, user_id: UserId) -> AppResult<Vec<String>>;

    /// Users subscribed to the channel.
    async fn channel_subscribers(&self, channel: &str) -> AppResult<Vec<UserId>>;
}

/// Storage of the latest presence record per user plus a bounded history.
#[async_trait]
pub trait PresenceStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert or replace the record of `presence.user_id`. Last write wins.
    async fn upsert_presence(&self, presence: &Presence) -> AppResult<()>;

    /// Load the record of a user, if any.
    async fn find_presence(&self, user_id: UserId) -> AppResult<Option<Presence>>;

    /// Users whose stored status is anything other than offline.
    async fn online_users(&self) -> AppResult<Vec<UserId>>;

    /// One page of users that are not offline and were last seen before
    /// `cutoff`, ordered by user ID and starting strictly after `after`.
    async fn stale_presences(
        &self,
        cutoff: DateTime<Utc>,
        after: Option<UserId>,
        limit: usize,
    ) -> AppResult<Vec<UserId>>;

    /// Record a transition, keeping at most `keep` entries for the user.
    async fn append_history(&self, change: &PresenceChange, keep: usize) -> AppResult<()>;

    /// Most recent transitions of a user, newest first.
    async fn presence_history(&self, user_id: UserId, limit: usize)
    -> AppResult<Vec<PresenceChange>>;
}

/// Storage of queued message copies.
#[async_trait]
pub trait MessageQueueStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist one message copy.
    async fn store_message(&self, message: &QueuedMessage) -> AppResult<()>;

    /// Pending copies addressed to the user, oldest first, ties broken by
    /// insertion order.
    async fn pending_messages(&self, user_id: UserId, limit: usize)
    -> AppResult<Vec<QueuedMessage>>;

    /// Delete the user's copy of an event. Returns whether a copy was removed.
    async fn remove_message(&self, user_id: UserId, event_id: EventId) -> AppResult<bool>;

    /// Move the user's copy of an event to delivered. Returns whether a
    /// pending copy was updated.
    async fn mark_delivered(&self, user_id: UserId, event_id: EventId) -> AppResult<bool>;

    /// Number of pending copies addressed to the user.
    async fn count_pending(&self, user_id: UserId) -> AppResult<u64>;
}

/// The three stores the realtime components are built from.
#[derive(Debug, Clone)]
pub struct RealtimeStores {
    /// Subscription edges.
    pub subscriptions: Arc<dyn SubscriptionStore>,
    /// Presence records and history.
    pub presence: Arc<dyn PresenceStore>,
    /// Offline message queue.
    pub messages: Arc<dyn MessageQueueStore>,
}

impl RealtimeStores {
    /// Back all three contracts with one in-memory store.
    pub fn memory(store: Arc<MemoryRealtimeStore>) -> Self {
        Self {
            subscriptions: store.clone(),
            presence: store.clone(),
            messages: store,
        }
    }
}
