//! # beacon-entity
//!
//! Domain entity models for Beacon. Every struct in this crate represents a
//! stored record or a domain value object. All entities derive `Debug`,
//! `Clone`, `Serialize` and `Deserialize`.

pub mod message;
pub mod payload;
pub mod presence;
pub mod subscription;

pub use message::{MessageStatus, PresenceChangedEvent, QueuedMessage};
pub use payload::Payload;
pub use presence::{Presence, PresenceChange, PresenceStatus};
pub use subscription::Subscription;
