//! Messages pushed to the live broadcast hub.

pub mod types;

pub use types::LiveMessage;
