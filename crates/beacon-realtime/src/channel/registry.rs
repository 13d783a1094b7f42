//! Subscription registry: who listens to which channel.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use beacon_core::result::AppResult;
use beacon_core::types::UserId;
use beacon_entity::message::PRESENCE_CHANNEL;
use beacon_entity::subscription::Subscription;

use crate::store::SubscriptionStore;

use super::types::{ChannelInfo, validate_channel_name};

/// Maintains `(user, channel)` subscription edges.
///
/// Multi-channel operations run one store call per channel without a
/// transaction. A failure part way through leaves earlier steps committed.
#[derive(Debug, Clone)]
pub struct SubscriptionRegistry {
    store: Arc<dyn SubscriptionStore>,
}

impl SubscriptionRegistry {
    /// Creates a registry over `store`.
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    /// Subscribe a user to a channel. Subscribing twice is a no-op.
    pub async fn subscribe(&self, user_id: UserId, channel: &str) -> AppResult<()> {
        validate_channel_name(channel)?;
        self.store
            .create_subscription(&Subscription::new(user_id, channel))
            .await
            .map_err(|e| e.context(format!("failed to subscribe user {user_id} to {channel}")))?;
        debug!(user_id = %user_id, channel, "Subscribed");
        Ok(())
    }

    /// Subscribe a user to each channel in order, stopping at the first error.
    pub async fn subscribe_many<S: AsRef<str>>(
        &self,
        user_id: UserId,
        channels: &[S],
    ) -> AppResult<()> {
        for channel in channels {
            self.subscribe(user_id, channel.as_ref()).await?;
        }
        Ok(())
    }

    /// Remove a user's subscription. Removing a missing one is a no-op.
    pub async fn unsubscribe(&self, user_id: UserId, channel: &str) -> AppResult<()> {
        let removed = self
            .store
            .remove_subscription(user_id, channel)
            .await
            .map_err(|e| {
                e.context(format!(
                    "failed to unsubscribe user {user_id} from {channel}"
                ))
            })?;
        debug!(user_id = %user_id, channel, removed, "Unsubscribed");
        Ok(())
    }

    /// Remove every subscription of a user. Returns how many were removed.
    pub async fn unsubscribe_all(&self, user_id: UserId) -> AppResult<usize> {
        let channels = self.list_subscriptions(user_id).await?;
        for channel in &channels {
            self.unsubscribe(user_id, channel).await?;
        }
        info!(user_id = %user_id, count = channels.len(), "Removed all subscriptions");
        Ok(channels.len())
    }

    /// Channels a user is subscribed to.
    pub async fn list_subscriptions(&self, user_id: UserId) -> AppResult<BTreeSet<String>> {
        let channels = self
            .store
            .user_subscriptions(user_id)
            .await
            .map_err(|e| e.context(format!("failed to list subscriptions of user {user_id}")))?;
        Ok(channels.into_iter().collect())
    }

    /// Users subscribed to a channel.
    pub async fn list_subscribers(&self, channel: &str) -> AppResult<BTreeSet<UserId>> {
        let users = self
            .store
            .channel_subscribers(channel)
            .await
            .map_err(|e| e.context(format!("failed to list subscribers of {channel}")))?;
        Ok(users.into_iter().collect())
    }

    /// Subscribe a user to presence updates.
    pub async fn subscribe_to_presence(&self, user_id: UserId) -> AppResult<()> {
        self.subscribe(user_id, PRESENCE_CHANNEL).await
    }

    /// Stop presence updates for a user.
    pub async fn unsubscribe_from_presence(&self, user_id: UserId) -> AppResult<()> {
        self.unsubscribe(user_id, PRESENCE_CHANNEL).await
    }

    /// Summary of a channel and its subscribers.
    pub async fn channel_info(&self, channel: &str) -> AppResult<ChannelInfo> {
        validate_channel_name(channel)?;
        Ok(ChannelInfo {
            channel: channel.to_string(),
            members: self.list_subscribers(channel).await?,
        })
    }
}
