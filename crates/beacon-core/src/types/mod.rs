//! Shared value types.

pub mod id;

pub use id::{EventId, MessageId, UserId};
