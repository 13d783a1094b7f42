//! Channel naming and the subscription registry.

pub mod registry;
pub mod types;

pub use registry::SubscriptionRegistry;
pub use types::{ChannelInfo, validate_channel_name};
