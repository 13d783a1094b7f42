//! Core traits defined in `beacon-core` and implemented by other crates.

pub mod cache;

pub use cache::CacheProvider;
