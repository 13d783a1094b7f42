//! Shared fixtures for realtime integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use beacon_cache::memory::MemoryCacheProvider;
use beacon_core::config::cache::MemoryCacheConfig;
use beacon_core::config::realtime::RealtimeConfig;
use beacon_core::error::AppError;
use beacon_core::result::AppResult;
use beacon_core::traits::cache::CacheProvider;
use beacon_core::types::{EventId, UserId};
use beacon_entity::message::{PresenceChangedEvent, QueuedMessage};
use beacon_entity::presence::{Presence, PresenceChange};
use beacon_entity::subscription::Subscription;
use beacon_realtime::activity::ActivityLog;
use beacon_realtime::bridge::dispatcher::EventDispatcher;
use beacon_realtime::bridge::hub::LiveBroadcastHub;
use beacon_realtime::message::LiveMessage;
use beacon_realtime::store::{
    MemoryRealtimeStore, MessageQueueStore, PresenceStore, RealtimeStores, SubscriptionStore,
};
use beacon_realtime::RealtimeEngine;

/// Memory store that can be told to fail writes for chosen users.
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: MemoryRealtimeStore,
    failing_presence_writes: Mutex<HashSet<UserId>>,
    failing_message_writes: Mutex<HashSet<UserId>>,
}

impl FlakyStore {
    pub fn fail_presence_writes_for(&self, user_id: UserId) {
        self.failing_presence_writes.lock().unwrap().insert(user_id);
    }

    pub fn fail_message_writes_for(&self, user_id: UserId) {
        self.failing_message_writes.lock().unwrap().insert(user_id);
    }
}

#[async_trait]
impl SubscriptionStore for FlakyStore {
    async fn create_subscription(&self, subscription: &Subscription) -> AppResult<()> {
        if subscription.channel.starts_with("broken") {
            return Err(AppError::database("subscription insert failed"));
        }
        self.inner.create_subscription(subscription).await
    }

    async fn remove_subscription(&self, user_id: UserId, channel: &str) -> AppResult<bool> {
        self.inner.remove_subscription(user_id, channel).await
    }

    async fn user_subscriptions(&self, user_id: UserId) -> AppResult<Vec<String>> {
        self.inner.user_subscriptions(user_id).await
    }

    async fn channel_subscribers(&self, channel: &str) -> AppResult<Vec<UserId>> {
        self.inner.channel_subscribers(channel).await
    }
}

#[async_trait]
impl PresenceStore for FlakyStore {
    async fn upsert_presence(&self, presence: &Presence) -> AppResult<()> {
        if self
            .failing_presence_writes
            .lock()
            .unwrap()
            .contains(&presence.user_id)
        {
            return Err(AppError::database("presence upsert failed"));
        }
        self.inner.upsert_presence(presence).await
    }

    async fn find_presence(&self, user_id: UserId) -> AppResult<Option<Presence>> {
        self.inner.find_presence(user_id).await
    }

    async fn online_users(&self) -> AppResult<Vec<UserId>> {
        self.inner.online_users().await
    }

    async fn stale_presences(
        &self,
        cutoff: DateTime<Utc>,
        after: Option<UserId>,
        limit: usize,
    ) -> AppResult<Vec<UserId>> {
        self.inner.stale_presences(cutoff, after, limit).await
    }

    async fn append_history(&self, change: &PresenceChange, keep: usize) -> AppResult<()> {
        self.inner.append_history(change, keep).await
    }

    async fn presence_history(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> AppResult<Vec<PresenceChange>> {
        self.inner.presence_history(user_id, limit).await
    }
}

#[async_trait]
impl MessageQueueStore for FlakyStore {
    async fn store_message(&self, message: &QueuedMessage) -> AppResult<()> {
        let failing = message
            .user_id
            .is_some_and(|u| self.failing_message_writes.lock().unwrap().contains(&u));
        if failing {
            return Err(AppError::database("message insert failed"));
        }
        self.inner.store_message(message).await
    }

    async fn pending_messages(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> AppResult<Vec<QueuedMessage>> {
        self.inner.pending_messages(user_id, limit).await
    }

    async fn remove_message(&self, user_id: UserId, event_id: EventId) -> AppResult<bool> {
        self.inner.remove_message(user_id, event_id).await
    }

    async fn mark_delivered(&self, user_id: UserId, event_id: EventId) -> AppResult<bool> {
        self.inner.mark_delivered(user_id, event_id).await
    }

    async fn count_pending(&self, user_id: UserId) -> AppResult<u64> {
        self.inner.count_pending(user_id).await
    }
}

/// Dispatcher that keeps every event it receives.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    events: Mutex<Vec<PresenceChangedEvent>>,
}

impl RecordingDispatcher {
    pub fn events(&self) -> Vec<PresenceChangedEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventDispatcher for RecordingDispatcher {
    fn dispatch(&self, event: &PresenceChangedEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// How a [`RecordingHub`] responds to pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubMode {
    Accept,
    Fail,
    Stall,
}

/// Hub that records pushes and can fail or hang on demand.
#[derive(Debug)]
pub struct RecordingHub {
    pushes: Mutex<Vec<(Option<String>, LiveMessage)>>,
    mode: Mutex<HubMode>,
}

impl Default for RecordingHub {
    fn default() -> Self {
        Self {
            pushes: Mutex::new(Vec::new()),
            mode: Mutex::new(HubMode::Accept),
        }
    }
}

impl RecordingHub {
    pub fn set_mode(&self, mode: HubMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn pushes(&self) -> Vec<(Option<String>, LiveMessage)> {
        self.pushes.lock().unwrap().clone()
    }

    async fn record(&self, channel: Option<&str>, message: LiveMessage) -> AppResult<()> {
        let mode = *self.mode.lock().unwrap();
        match mode {
            HubMode::Accept => {
                self.pushes
                    .lock()
                    .unwrap()
                    .push((channel.map(str::to_string), message));
                Ok(())
            }
            HubMode::Fail => Err(AppError::external("hub unreachable")),
            HubMode::Stall => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl LiveBroadcastHub for RecordingHub {
    async fn broadcast(&self, message: LiveMessage) -> AppResult<()> {
        self.record(None, message).await
    }

    async fn broadcast_to_channel(&self, channel: &str, message: LiveMessage) -> AppResult<()> {
        self.record(Some(channel), message).await
    }
}

/// Activity log that records, fails, or hangs on demand.
#[derive(Debug, Default)]
pub struct TestActivityLog {
    pub broken: AtomicBool,
    pub stalled: AtomicBool,
    entries: Mutex<Vec<(UserId, String)>>,
}

impl TestActivityLog {
    pub fn entries(&self) -> Vec<(UserId, String)> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActivityLog for TestActivityLog {
    async fn log_activity(
        &self,
        user_id: UserId,
        action: &str,
        _at: DateTime<Utc>,
    ) -> AppResult<()> {
        if self.stalled.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.broken.load(Ordering::SeqCst) {
            return Err(AppError::external("activity log down"));
        }
        self.entries
            .lock()
            .unwrap()
            .push((user_id, action.to_string()));
        Ok(())
    }
}

/// Cache whose reads and writes always fail. Deletes succeed.
#[derive(Debug, Default)]
pub struct BrokenReadCache;

#[async_trait]
impl CacheProvider for BrokenReadCache {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Err(AppError::cache("cache read failed"))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
        Err(AppError::cache("cache write failed"))
    }

    async fn set_default(&self, _key: &str, _value: &str) -> AppResult<()> {
        Err(AppError::cache("cache write failed"))
    }

    async fn delete(&self, _key: &str) -> AppResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(false)
    }
}

/// A fully wired engine over a flaky in-memory store.
pub struct TestEngine {
    pub engine: RealtimeEngine,
    pub store: Arc<FlakyStore>,
    pub cache: Arc<dyn CacheProvider>,
    pub dispatcher: Arc<RecordingDispatcher>,
    pub hub: Arc<RecordingHub>,
    pub activity: Arc<TestActivityLog>,
}

impl TestEngine {
    pub fn new() -> Self {
        Self::with_config(RealtimeConfig::default())
    }

    pub fn with_config(config: RealtimeConfig) -> Self {
        let cache: Arc<dyn CacheProvider> =
            Arc::new(MemoryCacheProvider::new(&MemoryCacheConfig::default(), 300));
        Self::with_cache(config, cache)
    }

    pub fn with_cache(config: RealtimeConfig, cache: Arc<dyn CacheProvider>) -> Self {
        let store = Arc::new(FlakyStore::default());
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let hub = Arc::new(RecordingHub::default());
        let activity = Arc::new(TestActivityLog::default());

        let stores = RealtimeStores {
            subscriptions: store.clone(),
            presence: store.clone(),
            messages: store.clone(),
        };
        let engine = RealtimeEngine::builder(stores, cache.clone(), config)
            .with_hub(hub.clone())
            .with_dispatcher(dispatcher.clone())
            .with_activity_log(activity.clone())
            .build();

        Self {
            engine,
            store,
            cache,
            dispatcher,
            hub,
            activity,
        }
    }

    /// Store a presence record directly, bypassing the manager.
    pub async fn seed_presence(&self, presence: Presence) {
        self.store.inner.upsert_presence(&presence).await.unwrap();
    }
}
