//! CLI command implementations

pub mod config;
pub mod layer;
pub mod manifest;

pub use config::execute as config;
pub use layer::execute as layer;
pub use manifest::execute as manifest;
