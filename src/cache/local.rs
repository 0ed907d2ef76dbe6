//! Process-local cache tier
//!
//! Manifests can be large and live on disk, one file per key. Layer entries
//! are small and live in memory. Each region has its own lock covering all of
//! its keys, so manifest and layer traffic never contend with each other.

use crate::cache::entry::LayerEntry;
use crate::cache::key::validate_key;
use crate::error::{CacheError, CacheResult};
use bytes::Bytes;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, error};
use uuid::Uuid;

/// Local manifest directory plus in-memory layer map
pub struct LocalStore {
    /// Manifest directory; all manifest file access happens under this lock
    manifests: RwLock<PathBuf>,

    layers: RwLock<HashMap<String, LayerEntry>>,
}

impl LocalStore {
    /// Create the store, making sure the manifest directory exists
    pub async fn new(dir: impl Into<PathBuf>) -> CacheResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| CacheError::LocalDirCreate {
                path: dir.clone(),
                source: e,
            })?;

        debug!("Local manifest cache at {}", dir.display());
        Ok(Self {
            manifests: RwLock::new(dir),
            layers: RwLock::new(HashMap::new()),
        })
    }

    /// Read a manifest from disk
    ///
    /// A missing file is the normal miss path. Any other failure is logged
    /// as an error but looks the same to the caller.
    pub async fn get_manifest(&self, key: &str) -> Option<Bytes> {
        if let Err(e) = validate_key(key) {
            error!(manifest = key, error = %e, "failed to read manifest from local cache");
            return None;
        }

        let dir = self.manifests.read().await;
        match fs::read(dir.join(key)).await {
            Ok(data) => Some(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(manifest = key, "manifest not in local cache");
                None
            }
            Err(e) => {
                error!(manifest = key, error = %e, "failed to read manifest from local cache");
                None
            }
        }
    }

    /// Write a manifest to disk. Failures are logged and dropped.
    pub async fn put_manifest(&self, key: &str, payload: Bytes) {
        if let Err(e) = validate_key(key) {
            error!(manifest = key, error = %e, "failed to locally cache manifest");
            return;
        }

        let size = payload.len();
        let dir = self.manifests.write().await;
        match write_atomic(&dir, key, payload).await {
            Ok(()) => debug!(manifest = key, size, "cached manifest locally"),
            Err(e) => error!(manifest = key, error = %e, "failed to locally cache manifest"),
        }
    }

    /// Look up a layer entry
    pub async fn get_layer(&self, key: &str) -> Option<LayerEntry> {
        self.layers.read().await.get(key).cloned()
    }

    /// Insert or overwrite a layer entry
    pub async fn put_layer(&self, key: &str, entry: LayerEntry) {
        self.layers.write().await.insert(key.to_string(), entry);
    }
}

/// Write `data` to `dir/name` through a uniquely named temporary file, so
/// readers see either the old file, no file, or the complete new one.
///
/// The write and rename run as one spawned task. Dropping the returned
/// future detaches it rather than stranding a half-finished temp file, and
/// the temp file is removed on every failure path.
pub(crate) async fn write_atomic(dir: &Path, name: &str, data: Bytes) -> std::io::Result<()> {
    let target = dir.join(name);
    let tmp = dir.join(format!(".{}.{}.tmp", name, Uuid::new_v4()));

    let task = tokio::spawn(async move {
        let result = match fs::write(&tmp, &data).await {
            Ok(()) => fs::rename(&tmp, &target).await,
            Err(e) => Err(e),
        };
        if result.is_err() {
            let _ = fs::remove_file(&tmp).await;
        }
        result
    });

    task.await.map_err(std::io::Error::other)?
}
