//! In-process implementation of the realtime store contracts.

use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use beacon_core::result::AppResult;
use beacon_core::types::{EventId, MessageId, UserId};
use beacon_entity::message::{MessageStatus, QueuedMessage};
use beacon_entity::presence::{Presence, PresenceChange, PresenceStatus};
use beacon_entity::subscription::Subscription;

use super::{MessageQueueStore, PresenceStore, SubscriptionStore};

/// A queued copy tagged with its insertion sequence.
#[derive(Debug, Clone)]
struct Stored {
    seq: u64,
    message: QueuedMessage,
}

/// Subscription, presence and queue storage backed by concurrent maps.
///
/// Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryRealtimeStore {
    /// Channel → subscribed users
    channel_members: DashMap<String, BTreeSet<UserId>>,
    /// User → subscribed channels
    user_channels: DashMap<UserId, BTreeSet<String>>,
    /// User → latest presence record
    presences: DashMap<UserId, Presence>,
    /// User → transitions, oldest first
    history: DashMap<UserId, VecDeque<PresenceChange>>,
    /// User → addressed message copies
    queues: DashMap<UserId, Vec<Stored>>,
    /// Copies without an addressee (global broadcasts)
    unaddressed: DashMap<MessageId, QueuedMessage>,
    /// Insertion counter used to order equal timestamps
    seq: AtomicU64,
}

impl MemoryRealtimeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies that carry no addressee, such as global broadcasts.
    pub fn unaddressed_messages(&self) -> Vec<QueuedMessage> {
        let mut messages: Vec<QueuedMessage> =
            self.unaddressed.iter().map(|e| e.value().clone()).collect();
        messages.sort_by_key(|m| m.created_at);
        messages
    }

    /// Every copy addressed to the user, whatever its status.
    pub fn all_messages_for(&self, user_id: UserId) -> Vec<QueuedMessage> {
        self.queues
            .get(&user_id)
            .map(|q| q.iter().map(|s| s.message.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SubscriptionStore for MemoryRealtimeStore {
    async fn create_subscription(&self, subscription: &Subscription) -> AppResult<()> {
        self.channel_members
            .entry(subscription.channel.clone())
            .or_default()
            .insert(subscription.user_id);
        self.user_channels
            .entry(subscription.user_id)
            .or_default()
            .insert(subscription.channel.clone());
        Ok(())
    }

    async fn remove_subscription(&self, user_id: UserId, channel: &str) -> AppResult<bool> {
        let removed = self
            .channel_members
            .get_mut(channel)
            .map(|mut members| members.remove(&user_id))
            .unwrap_or(false);
        self.channel_members
            .remove_if(channel, |_, members| members.is_empty());

        if let Some(mut channels) = self.user_channels.get_mut(&user_id) {
            channels.remove(channel);
        }
        self.user_channels
            .remove_if(&user_id, |_, channels| channels.is_empty());

        Ok(removed)
    }

    async fn user_subscriptions(&self, user_id: UserId) -> AppResult<Vec<String>> {
        Ok(self
            .user_channels
            .get(&user_id)
            .map(|c| c.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn channel_subscribers(&self, channel: &str) -> AppResult<Vec<UserId>> {
        Ok(self
            .channel_members
            .get(channel)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl PresenceStore for MemoryRealtimeStore {
    async fn upsert_presence(&self, presence: &Presence) -> AppResult<()> {
        self.presences.insert(presence.user_id, presence.clone());
        Ok(())
    }

    async fn find_presence(&self, user_id: UserId) -> AppResult<Option<Presence>> {
        Ok(self.presences.get(&user_id).map(|p| p.value().clone()))
    }

    async fn online_users(&self) -> AppResult<Vec<UserId>> {
        let mut users: Vec<UserId> = self
            .presences
            .iter()
            .filter(|p| p.status != PresenceStatus::Offline)
            .map(|p| *p.key())
            .collect();
        users.sort();
        Ok(users)
    }

    async fn stale_presences(
        &self,
        cutoff: DateTime<Utc>,
        after: Option<UserId>,
        limit: usize,
    ) -> AppResult<Vec<UserId>> {
        let mut users: Vec<UserId> = self
            .presences
            .iter()
            .filter(|p| p.status != PresenceStatus::Offline && p.last_seen_at < cutoff)
            .map(|p| *p.key())
            .filter(|id| after.is_none_or(|a| *id > a))
            .collect();
        users.sort();
        users.truncate(limit);
        Ok(users)
    }

    async fn append_history(&self, change: &PresenceChange, keep: usize) -> AppResult<()> {
        let mut entries = self.history.entry(change.user_id).or_default();
        entries.push_back(change.clone());
        while entries.len() > keep {
            entries.pop_front();
        }
        Ok(())
    }

    async fn presence_history(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> AppResult<Vec<PresenceChange>> {
        Ok(self
            .history
            .get(&user_id)
            .map(|h| h.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl MessageQueueStore for MemoryRealtimeStore {
    async fn store_message(&self, message: &QueuedMessage) -> AppResult<()> {
        match message.user_id {
            Some(user_id) => {
                let seq = self.seq.fetch_add(1, Ordering::Relaxed);
                self.queues.entry(user_id).or_default().push(Stored {
                    seq,
                    message: message.clone(),
                });
            }
            None => {
                self.unaddressed.insert(message.id, message.clone());
            }
        }
        Ok(())
    }

    async fn pending_messages(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> AppResult<Vec<QueuedMessage>> {
        let Some(queue) = self.queues.get(&user_id) else {
            return Ok(Vec::new());
        };
        let mut pending: Vec<&Stored> = queue.iter().filter(|s| s.message.is_pending()).collect();
        pending.sort_by_key(|s| (s.message.created_at, s.seq));
        Ok(pending
            .into_iter()
            .take(limit)
            .map(|s| s.message.clone())
            .collect())
    }

    async fn remove_message(&self, user_id: UserId, event_id: EventId) -> AppResult<bool> {
        let Some(mut queue) = self.queues.get_mut(&user_id) else {
            return Ok(false);
        };
        let before = queue.len();
        queue.retain(|s| s.message.event_id != event_id);
        Ok(queue.len() != before)
    }

    async fn mark_delivered(&self, user_id: UserId, event_id: EventId) -> AppResult<bool> {
        let Some(mut queue) = self.queues.get_mut(&user_id) else {
            return Ok(false);
        };
        let mut updated = false;
        for stored in queue
            .iter_mut()
            .filter(|s| s.message.event_id == event_id && s.message.is_pending())
        {
            stored.message.status = MessageStatus::Delivered;
            updated = true;
        }
        Ok(updated)
    }

    async fn count_pending(&self, user_id: UserId) -> AppResult<u64> {
        Ok(self
            .queues
            .get(&user_id)
            .map(|q| q.iter().filter(|s| s.message.is_pending()).count() as u64)
            .unwrap_or(0))
    }
}
