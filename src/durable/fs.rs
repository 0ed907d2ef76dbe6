//! Directory-backed bucket
//!
//! Objects live at `<root>/<namespace>/<key>`. Writes go through a temporary
//! file and a rename, so concurrent writers of the same key never interleave.

use crate::cache::key::validate_key;
use crate::cache::local::write_atomic;
use crate::durable::{cancellable, DurableStore, Namespace};
use crate::error::{CacheError, CacheResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio_util::sync::CancellationToken;

/// Durable store on a (typically shared or mounted) directory
pub struct FsBucket {
    root: PathBuf,
}

impl FsBucket {
    /// Create a bucket rooted at `root`. Directories are created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Bucket root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn namespace_dir(&self, namespace: Namespace) -> PathBuf {
        self.root.join(namespace.to_string())
    }

    fn object_path(&self, namespace: Namespace, key: &str) -> CacheResult<PathBuf> {
        validate_key(key)?;
        Ok(self.namespace_dir(namespace).join(key))
    }
}

#[async_trait]
impl DurableStore for FsBucket {
    async fn exists(
        &self,
        namespace: Namespace,
        key: &str,
        cancel: &CancellationToken,
    ) -> CacheResult<bool> {
        let path = self.object_path(namespace, key)?;
        cancellable(cancel, async {
            match fs::metadata(&path).await {
                Ok(meta) => Ok(meta.is_file()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
                Err(e) => Err(CacheError::durable("probe", namespace.object(key), e)),
            }
        })
        .await
    }

    async fn read(
        &self,
        namespace: Namespace,
        key: &str,
        cancel: &CancellationToken,
    ) -> CacheResult<Bytes> {
        let path = self.object_path(namespace, key)?;
        cancellable(cancel, async {
            fs::read(&path)
                .await
                .map(Bytes::from)
                .map_err(|e| CacheError::durable("read", namespace.object(key), e))
        })
        .await
    }

    async fn write(
        &self,
        namespace: Namespace,
        key: &str,
        data: Bytes,
        cancel: &CancellationToken,
    ) -> CacheResult<()> {
        validate_key(key)?;
        let dir = self.namespace_dir(namespace);
        cancellable(cancel, async {
            fs::create_dir_all(&dir)
                .await
                .map_err(|e| CacheError::durable("write", namespace.object(key), e))?;
            write_atomic(&dir, key, data)
                .await
                .map_err(|e| CacheError::durable("write", namespace.object(key), e))
        })
        .await
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}
