//! Per-user offline queue with manual acknowledgement.
//!
//! Nothing leaves the pending view unless the caller removes it or marks it
//! delivered. Acknowledgements are scoped to the calling user, so one
//! subscriber never removes another subscriber's copy of the same event.

use std::sync::Arc;

use tracing::{debug, info};

use beacon_core::result::AppResult;
use beacon_core::types::{EventId, UserId};
use beacon_entity::message::QueuedMessage;

use crate::store::MessageQueueStore;

/// Reads and acknowledges queued messages.
#[derive(Debug, Clone)]
pub struct OfflineMessageQueue {
    store: Arc<dyn MessageQueueStore>,
    clear_bound: usize,
}

impl OfflineMessageQueue {
    /// Creates a queue. `clear_bound` caps how many messages one clear reads.
    pub fn new(store: Arc<dyn MessageQueueStore>, clear_bound: usize) -> Self {
        Self { store, clear_bound }
    }

    /// Pending messages of a user, oldest first, at most `limit`.
    pub async fn get_pending_events(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> AppResult<Vec<QueuedMessage>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.store
            .pending_messages(user_id, limit)
            .await
            .map_err(|e| e.context(format!("failed to get pending events of user {user_id}")))
    }

    /// Acknowledge one event by deleting the user's copy.
    ///
    /// Returns whether a copy existed.
    pub async fn remove_event_from_queue(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> AppResult<bool> {
        let removed = self
            .store
            .remove_message(user_id, event_id)
            .await
            .map_err(|e| {
                e.context(format!(
                    "failed to remove event {event_id} from queue of user {user_id}"
                ))
            })?;
        debug!(user_id = %user_id, event_id = %event_id, removed, "Event acknowledged");
        Ok(removed)
    }

    /// Acknowledge one event but keep the copy as delivered.
    pub async fn mark_delivered(&self, user_id: UserId, event_id: EventId) -> AppResult<bool> {
        self.store
            .mark_delivered(user_id, event_id)
            .await
            .map_err(|e| {
                e.context(format!(
                    "failed to mark event {event_id} delivered for user {user_id}"
                ))
            })
    }

    /// Remove up to the clear bound of pending messages, one at a time.
    ///
    /// Not atomic: messages published while clearing may survive, and a
    /// failure part way leaves earlier removals committed. Returns how many
    /// copies were removed.
    pub async fn clear_event_queue(&self, user_id: UserId) -> AppResult<usize> {
        let pending = self.get_pending_events(user_id, self.clear_bound).await?;

        let mut removed = 0;
        for message in &pending {
            if self.remove_event_from_queue(user_id, message.event_id).await? {
                removed += 1;
            }
        }

        info!(user_id = %user_id, removed, "Cleared event queue");
        Ok(removed)
    }

    /// Number of pending messages of a user.
    pub async fn pending_count(&self, user_id: UserId) -> AppResult<u64> {
        self.store
            .count_pending(user_id)
            .await
            .map_err(|e| e.context(format!("failed to count pending events of user {user_id}")))
    }
}
