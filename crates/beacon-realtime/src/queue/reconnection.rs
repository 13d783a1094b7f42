//! Backlog replay for reconnecting users.

use std::sync::Arc;

use tracing::info;

use beacon_core::result::AppResult;
use beacon_core::types::UserId;
use beacon_entity::message::QueuedMessage;

use super::offline::OfflineMessageQueue;

/// Hands a reconnecting user its pending backlog.
///
/// Replay never acknowledges anything. Calling it twice returns the same
/// backlog, so a client that crashed mid-replay can fetch it again; the
/// caller removes each message once delivered. Clients may therefore see
/// duplicates.
#[derive(Debug, Clone)]
pub struct ReconnectionHandler {
    queue: Arc<OfflineMessageQueue>,
    page_size: usize,
}

impl ReconnectionHandler {
    /// Creates a handler returning at most `page_size` messages per replay.
    pub fn new(queue: Arc<OfflineMessageQueue>, page_size: usize) -> Self {
        Self { queue, page_size }
    }

    /// Pending messages of a reconnecting user, oldest first.
    pub async fn handle_reconnection(&self, user_id: UserId) -> AppResult<Vec<QueuedMessage>> {
        let backlog = self
            .queue
            .get_pending_events(user_id, self.page_size)
            .await
            .map_err(|e| e.context(format!("failed to handle reconnection of user {user_id}")))?;
        info!(user_id = %user_id, pending = backlog.len(), "Replaying backlog");
        Ok(backlog)
    }
}
