//! Built-in scheduled jobs.

pub mod presence;
