//! Presence tracking: status writes, cache-aside reads and stale sweeps.

pub mod manager;

pub use manager::{PresenceManager, RealtimeStats};
