//! # beacon-realtime
//!
//! Presence and event delivery core for Beacon. Provides:
//!
//! - Presence state machine with cache-aside reads and stale sweeping
//! - Channel subscription registry
//! - Store-and-forward channel publishing into per-user offline queues
//! - Reconnection replay with manual acknowledgement
//! - Optional best-effort live push through a pluggable broadcast hub

pub mod activity;
pub mod bridge;
pub mod channel;
pub mod message;
pub mod presence;
pub mod publisher;
pub mod queue;
pub mod server;
pub mod store;

pub use channel::registry::SubscriptionRegistry;
pub use presence::manager::PresenceManager;
pub use publisher::EventPublisher;
pub use queue::offline::OfflineMessageQueue;
pub use queue::reconnection::ReconnectionHandler;
pub use server::RealtimeEngine;
pub use store::RealtimeStores;
