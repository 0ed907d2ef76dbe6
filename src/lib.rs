//! buildcache - Two-tier build artifact cache
//!
//! Sits in front of an image builder and memoizes manifests and layer
//! build entries in a fast local tier backed by a durable blob store.

pub mod cache;
pub mod cli;
pub mod config;
pub mod durable;
pub mod error;

pub use cache::{Cache, LayerEntry};
pub use error::{CacheError, CacheResult};
