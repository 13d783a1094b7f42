//! Offline message queue and reconnection replay.

pub mod offline;
pub mod reconnection;

pub use offline::OfflineMessageQueue;
pub use reconnection::ReconnectionHandler;
