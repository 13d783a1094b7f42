//! Seams between the realtime core and its optional collaborators.
//!
//! - [`hub`]: best-effort live push to connected sessions
//! - [`dispatcher`]: in-process presence-change notification sink
//!
//! Both come with a null implementation so configured and unconfigured
//! deployments run the same code path.

pub mod dispatcher;
pub mod hub;
pub mod memory_hub;
#[cfg(feature = "redis-hub")]
pub mod redis_hub;

pub use dispatcher::{BroadcastDispatcher, EventDispatcher, NullDispatcher};
pub use hub::{LiveBroadcastHub, NullHub, hub_from_config};
pub use memory_hub::MemoryBroadcastHub;
#[cfg(feature = "redis-hub")]
pub use redis_hub::RedisBroadcastHub;
