//! Top-level realtime engine that ties together all components.

use std::sync::Arc;

use tracing::info;

use beacon_core::config::realtime::RealtimeConfig;
use beacon_core::traits::cache::CacheProvider;

use crate::activity::{ActivityLog, NoopActivityLog};
use crate::bridge::dispatcher::{EventDispatcher, NullDispatcher};
use crate::bridge::hub::{LiveBroadcastHub, NullHub};
use crate::channel::registry::SubscriptionRegistry;
use crate::presence::manager::PresenceManager;
use crate::publisher::EventPublisher;
use crate::queue::offline::OfflineMessageQueue;
use crate::queue::reconnection::ReconnectionHandler;
use crate::store::RealtimeStores;

/// Central realtime engine.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Presence manager.
    pub presence: Arc<PresenceManager>,
    /// Subscription registry.
    pub subscriptions: Arc<SubscriptionRegistry>,
    /// Event publisher.
    pub publisher: Arc<EventPublisher>,
    /// Offline message queue.
    pub queue: Arc<OfflineMessageQueue>,
    /// Reconnection handler.
    pub reconnection: Arc<ReconnectionHandler>,
    /// Configuration the engine was built with.
    pub config: RealtimeConfig,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

impl RealtimeEngine {
    /// Start building an engine. Collaborators not supplied default to
    /// their null implementations.
    pub fn builder(
        stores: RealtimeStores,
        cache: Arc<dyn CacheProvider>,
        config: RealtimeConfig,
    ) -> RealtimeEngineBuilder {
        RealtimeEngineBuilder {
            stores,
            cache,
            config,
            hub: Arc::new(NullHub),
            dispatcher: Arc::new(NullDispatcher),
            activity: Arc::new(NoopActivityLog),
        }
    }
}

/// Builder for [`RealtimeEngine`].
#[derive(Debug)]
pub struct RealtimeEngineBuilder {
    stores: RealtimeStores,
    cache: Arc<dyn CacheProvider>,
    config: RealtimeConfig,
    hub: Arc<dyn LiveBroadcastHub>,
    dispatcher: Arc<dyn EventDispatcher>,
    activity: Arc<dyn ActivityLog>,
}

impl RealtimeEngineBuilder {
    /// Push published events to a live hub.
    pub fn with_hub(mut self, hub: Arc<dyn LiveBroadcastHub>) -> Self {
        self.hub = hub;
        self
    }

    /// Send presence changes to a dispatcher.
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn EventDispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Record logouts in an activity log.
    pub fn with_activity_log(mut self, activity: Arc<dyn ActivityLog>) -> Self {
        self.activity = activity;
        self
    }

    /// Wire every component.
    pub fn build(self) -> RealtimeEngine {
        let config = self.config;

        let presence = Arc::new(PresenceManager::new(
            self.stores.presence,
            self.cache,
            self.dispatcher,
            self.activity,
            config.clone(),
        ));
        let subscriptions = Arc::new(SubscriptionRegistry::new(self.stores.subscriptions.clone()));
        let publisher = Arc::new(EventPublisher::new(
            self.stores.subscriptions,
            self.stores.messages.clone(),
            self.hub,
            config.live_push_timeout(),
        ));
        let queue = Arc::new(OfflineMessageQueue::new(
            self.stores.messages,
            config.clear_queue_bound,
        ));
        let reconnection = Arc::new(ReconnectionHandler::new(
            queue.clone(),
            config.reconnection_page_size,
        ));

        info!("Realtime engine initialized");

        RealtimeEngine {
            presence,
            subscriptions,
            publisher,
            queue,
            reconnection,
            config,
        }
    }
}
