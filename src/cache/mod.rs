//! Two-tier build cache
//!
//! Memoizes image manifests and layer build entries by content-derived key.
//!
//! | Tier | Manifests | Layer entries |
//! |------|-----------|---------------|
//! | Local | one file per key on disk | in-memory map |
//! | Durable | `manifests/<key>` | `builds/<key>` (JSON) |
//!
//! Reads fall through local → durable and write durable hits back into the
//! local tier in the background. Writes go to both tiers. Every failure
//! degrades to a miss or a dropped write; only construction can fail.

pub mod entry;
pub mod key;
pub mod local;
mod tiered;
pub mod writeback;

pub use entry::LayerEntry;
pub use local::LocalStore;
pub use tiered::Cache;
pub use writeback::WriteBack;
