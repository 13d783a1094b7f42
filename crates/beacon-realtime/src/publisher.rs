//! Store-and-forward event publisher.
//!
//! A channel publish writes one pending copy per current subscriber, all
//! sharing one event ID, then makes a bounded best-effort live push. Copies
//! are written sequentially in subscriber order. The first failed write
//! aborts the call and copies already written stay queued.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use beacon_core::error::AppError;
use beacon_core::result::AppResult;
use beacon_core::types::{EventId, UserId};
use beacon_entity::message::{BROADCAST_CHANNEL, DIRECT_CHANNEL, QueuedMessage};
use beacon_entity::payload::Payload;

use crate::bridge::hub::LiveBroadcastHub;
use crate::channel::types::validate_channel_name;
use crate::message::types::LiveMessage;
use crate::store::{MessageQueueStore, SubscriptionStore};

/// Event name of a direct message.
pub const DIRECT_MESSAGE_EVENT: &str = "direct_message";

/// Outcome of a channel publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    /// ID shared by every queued copy.
    pub event_id: EventId,
    /// Subscribers a copy was queued for, in write order.
    pub recipients: Vec<UserId>,
}

/// Where a live push goes.
enum PushTarget<'a> {
    Channel(&'a str),
    Everyone,
}

/// Publishes events into the offline queue and the live hub.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    subscriptions: Arc<dyn SubscriptionStore>,
    messages: Arc<dyn MessageQueueStore>,
    hub: Arc<dyn LiveBroadcastHub>,
    push_timeout: Duration,
}

impl EventPublisher {
    /// Creates a publisher.
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStore>,
        messages: Arc<dyn MessageQueueStore>,
        hub: Arc<dyn LiveBroadcastHub>,
        push_timeout: Duration,
    ) -> Self {
        Self {
            subscriptions,
            messages,
            hub,
            push_timeout,
        }
    }

    /// Queue one copy of an event for every current subscriber of `channel`.
    ///
    /// Subscribers that join later do not receive it.
    pub async fn publish_to_channel(
        &self,
        channel: &str,
        event_name: &str,
        data: Payload,
    ) -> AppResult<PublishReceipt> {
        validate_channel_name(channel)?;
        validate_event_name(event_name)?;

        let subscribers = self
            .subscriptions
            .channel_subscribers(channel)
            .await
            .map_err(|e| e.context(format!("failed to resolve subscribers of {channel}")))?;

        let event_id = EventId::new();
        let created_at = Utc::now();

        for user_id in &subscribers {
            let message = QueuedMessage::pending(
                event_id,
                channel,
                event_name,
                data.clone(),
                Some(*user_id),
                created_at,
            );
            self.messages
                .store_message(&message)
                .await
                .map_err(|e| e.context(format!("failed to publish event to user {user_id}")))?;
        }

        info!(
            event_id = %event_id,
            channel,
            event_name,
            recipients = subscribers.len(),
            "Published event to channel"
        );

        let live = LiveMessage::channel_event(event_id, channel, event_name, &data, created_at);
        self.push(PushTarget::Channel(channel), live).await;

        Ok(PublishReceipt {
            event_id,
            recipients: subscribers,
        })
    }

    /// Store a single global event on the broadcast channel.
    ///
    /// The record carries no addressee and is not fanned out.
    pub async fn broadcast_event(&self, event_name: &str, data: Payload) -> AppResult<EventId> {
        validate_event_name(event_name)?;

        let event_id = EventId::new();
        let created_at = Utc::now();
        let message = QueuedMessage::pending(
            event_id,
            BROADCAST_CHANNEL,
            event_name,
            data.clone(),
            None,
            created_at,
        );
        self.messages
            .store_message(&message)
            .await
            .map_err(|e| e.context(format!("failed to broadcast event {event_name}")))?;

        info!(event_id = %event_id, event_name, "Broadcast event stored");

        let live = LiveMessage::broadcast(event_id, event_name, &data, created_at);
        self.push(PushTarget::Everyone, live).await;

        Ok(event_id)
    }

    /// Queue a direct message from one user to another. No live push.
    pub async fn send_direct_message(
        &self,
        from_user_id: UserId,
        to_user_id: UserId,
        message: &str,
    ) -> AppResult<EventId> {
        let event_id = EventId::new();
        let mut record = QueuedMessage::pending(
            event_id,
            DIRECT_CHANNEL,
            DIRECT_MESSAGE_EVENT,
            Payload::new(json!({ "message": message })),
            Some(to_user_id),
            Utc::now(),
        );
        record.from_user_id = Some(from_user_id);

        self.messages.store_message(&record).await.map_err(|e| {
            e.context(format!(
                "failed to send direct message from {from_user_id} to {to_user_id}"
            ))
        })?;

        debug!(
            event_id = %event_id,
            from_user_id = %from_user_id,
            to_user_id = %to_user_id,
            "Direct message queued"
        );
        Ok(event_id)
    }

    async fn push(&self, target: PushTarget<'_>, message: LiveMessage) {
        let fut = async move {
            match target {
                PushTarget::Channel(channel) => self.hub.broadcast_to_channel(channel, message).await,
                PushTarget::Everyone => self.hub.broadcast(message).await,
            }
        };

        match tokio::time::timeout(self.push_timeout, fut).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Live push failed"),
            Err(_) => warn!(
                timeout_ms = self.push_timeout.as_millis() as u64,
                "Live push timed out"
            ),
        }
    }
}

fn validate_event_name(event_name: &str) -> AppResult<()> {
    if event_name.trim().is_empty() {
        return Err(AppError::validation("Event name must not be empty"));
    }
    Ok(())
}
