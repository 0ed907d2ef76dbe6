//! Durable cache tier
//!
//! The durable tier is an external key/value blob store. The cache only
//! needs existence probes, whole-object reads and blind writes, split over
//! two namespaces: built manifests and layer build entries.
//!
//! Every call takes the caller's cancellation token. The cache never
//! imposes a timeout of its own.

mod fs;
mod memory;

pub use fs::FsBucket;
pub use memory::MemoryStore;

use crate::config::{ConfigManager, DurableBackend, DurableConfig};
use crate::error::{CacheError, CacheResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Object namespace inside the durable store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Image manifests, stored verbatim
    Manifests,
    /// Layer build entries, stored as JSON
    Builds,
}

impl Namespace {
    /// Object name prefix for this namespace
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Manifests => "manifests/",
            Self::Builds => "builds/",
        }
    }

    /// Full object name for `key`
    pub fn object(&self, key: &str) -> String {
        format!("{}{}", self.prefix(), key)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manifests => write!(f, "manifests"),
            Self::Builds => write!(f, "builds"),
        }
    }
}

/// Abstract durable blob store
///
/// Implementations must tolerate concurrent blind writes of identical
/// content under the same key.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Probe whether an object exists
    async fn exists(
        &self,
        namespace: Namespace,
        key: &str,
        cancel: &CancellationToken,
    ) -> CacheResult<bool>;

    /// Read a whole object
    async fn read(
        &self,
        namespace: Namespace,
        key: &str,
        cancel: &CancellationToken,
    ) -> CacheResult<Bytes>;

    /// Write a whole object, replacing any previous value
    async fn write(
        &self,
        namespace: Namespace,
        key: &str,
        data: Bytes,
        cancel: &CancellationToken,
    ) -> CacheResult<()>;

    /// Human-readable backend name for logs
    fn backend_name(&self) -> &'static str;
}

/// Run `op` unless the caller cancels first
pub async fn cancellable<T, F>(cancel: &CancellationToken, op: F) -> CacheResult<T>
where
    F: Future<Output = CacheResult<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CacheError::Cancelled),
        result = op => result,
    }
}

/// Create the durable store selected by the configuration
pub fn create_store(config: &DurableConfig) -> Arc<dyn DurableStore> {
    match config.backend {
        DurableBackend::Filesystem => {
            let root = config
                .path
                .clone()
                .unwrap_or_else(ConfigManager::default_bucket_dir);
            Arc::new(FsBucket::new(root))
        }
        DurableBackend::Memory => Arc::new(MemoryStore::new()),
    }
}
