//! Read-through / write-through cache over the local and durable tiers
//!
//! Reads check the local tier first, then the durable tier, and populate the
//! local tier after a durable hit. Writes go to both tiers. No failure in
//! here ever fails the caller's build: reads degrade to a miss and writes are
//! best effort.
//!
//! Callers must only ever store content-identical values under one key.
//! Concurrent misses on a key may both fetch and both write back, and
//! concurrent stores race at the durable tier; both are harmless only
//! because of that precondition.

use crate::cache::entry::LayerEntry;
use crate::cache::local::LocalStore;
use crate::cache::writeback::WriteBack;
use crate::config::{Config, ConfigManager};
use crate::durable::{create_store, DurableStore, Namespace};
use crate::error::{CacheError, CacheResult};
use bytes::Bytes;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Two-tier manifest and layer cache
///
/// Cheap to clone; clones share both tiers and the write-back pool.
#[derive(Clone)]
pub struct Cache {
    local: Arc<LocalStore>,
    durable: Arc<dyn DurableStore>,
    writeback: WriteBack,
}

impl Cache {
    /// Create a cache over an explicit durable store
    ///
    /// Fails only if the local manifest directory cannot be created.
    pub async fn new(
        local_dir: impl Into<PathBuf>,
        durable: Arc<dyn DurableStore>,
        writeback: WriteBack,
    ) -> CacheResult<Self> {
        let local = LocalStore::new(local_dir).await?;
        Ok(Self {
            local: Arc::new(local),
            durable,
            writeback,
        })
    }

    /// Create a cache from configuration
    pub async fn from_config(config: &Config) -> CacheResult<Self> {
        let writeback = WriteBack::new(config.writeback.mode, config.writeback.workers);
        Self::new(
            ConfigManager::local_dir(config),
            create_store(&config.durable),
            writeback,
        )
        .await
    }

    /// Retrieve a manifest, checking the local tier before the durable one
    pub async fn fetch_manifest(&self, key: &str, cancel: &CancellationToken) -> Option<Bytes> {
        if let Some(manifest) = self.local.get_manifest(key).await {
            return Some(manifest);
        }

        let manifest = self.fetch_durable(Namespace::Manifests, key, cancel).await?;

        let local = Arc::clone(&self.local);
        let (owned_key, payload) = (key.to_string(), manifest.clone());
        self.writeback
            .submit(async move { local.put_manifest(&owned_key, payload).await })
            .await;

        info!(
            manifest = key,
            backend = self.durable.backend_name(),
            "retrieved manifest from durable cache"
        );
        Some(manifest)
    }

    /// Add a manifest to both tiers
    pub async fn store_manifest(&self, key: &str, manifest: Bytes, cancel: &CancellationToken) {
        let local = Arc::clone(&self.local);
        let (owned_key, payload) = (key.to_string(), manifest.clone());
        self.writeback
            .submit(async move { local.put_manifest(&owned_key, payload).await })
            .await;

        let size = manifest.len();
        match self
            .durable
            .write(Namespace::Manifests, key, manifest, cancel)
            .await
        {
            Ok(()) => info!(manifest = key, size, "cached manifest to durable store"),
            Err(e) => report(Namespace::Manifests, key, "failed to cache manifest to durable store", &e),
        }
    }

    /// Retrieve a layer build entry, checking the local tier before the durable one
    pub async fn fetch_layer(&self, key: &str, cancel: &CancellationToken) -> Option<LayerEntry> {
        if let Some(entry) = self.local.get_layer(key).await {
            return Some(entry);
        }

        let data = self.fetch_durable(Namespace::Builds, key, cancel).await?;
        let entry = match LayerEntry::from_slice(&data) {
            Ok(entry) => entry,
            Err(e) => {
                error!(layer = key, error = %e, "failed to unmarshal cached layer");
                return None;
            }
        };

        let local = Arc::clone(&self.local);
        let (owned_key, cached) = (key.to_string(), entry.clone());
        self.writeback
            .submit(async move { local.put_layer(&owned_key, cached).await })
            .await;

        info!(
            layer = key,
            backend = self.durable.backend_name(),
            "retrieved layer from durable cache"
        );
        Some(entry)
    }

    /// Add a layer build entry to both tiers
    pub async fn store_layer(&self, key: &str, entry: LayerEntry, cancel: &CancellationToken) {
        let data = entry.to_bytes();
        self.local.put_layer(key, entry).await;

        let data = match data {
            Ok(data) => data,
            Err(e) => {
                error!(layer = key, error = %e, "failed to serialize layer");
                return;
            }
        };

        match self.durable.write(Namespace::Builds, key, data, cancel).await {
            Ok(()) => info!(layer = key, "cached layer to durable store"),
            Err(e) => report(Namespace::Builds, key, "failed to cache layer", &e),
        }
    }

    /// Wait until the write-back pool is idle
    ///
    /// See [`WriteBack::flush`]: write-backs issued while this waits are
    /// waited on too.
    pub async fn flush(&self) {
        self.writeback.flush().await;
    }

    /// Drain outstanding write-backs before the process exits
    pub async fn shutdown(&self) {
        self.writeback.shutdown().await;
    }

    /// Number of write-backs queued or running
    pub fn pending_writebacks(&self) -> usize {
        self.writeback.pending()
    }

    /// Probe and read one object from the durable tier
    async fn fetch_durable(
        &self,
        namespace: Namespace,
        key: &str,
        cancel: &CancellationToken,
    ) -> Option<Bytes> {
        match self.durable.exists(namespace, key, cancel).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(object = %namespace.object(key), "not in durable cache");
                return None;
            }
            Err(e) => {
                report(namespace, key, "failed to probe durable cache", &e);
                return None;
            }
        }

        // The probe said it exists, so any failure from here is unexpected
        match self.durable.read(namespace, key, cancel).await {
            Ok(data) => Some(data),
            Err(e) => {
                report(namespace, key, "failed to read from durable cache", &e);
                None
            }
        }
    }
}

fn report(namespace: Namespace, key: &str, message: &str, err: &CacheError) {
    let object = namespace.object(key);
    if err.is_cancelled() {
        warn!(object = %object, "{} (cancelled)", message);
    } else {
        error!(object = %object, error = %err, "{}", message);
    }
}
