//! # beacon-core
//!
//! Core crate for Beacon. Contains the cache provider trait, configuration
//! schemas, typed identifiers, the deadline helper and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other Beacon crates.

pub mod config;
pub mod deadline;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
