//! In-process durable store
//!
//! Useful when embedding the cache without a shared bucket, and in tests.

use crate::durable::{DurableStore, Namespace};
use crate::error::{CacheError, CacheResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Durable store backed by a map
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<(Namespace, String), Bytes>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects across namespaces
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether the store holds no objects
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

fn check(cancel: &CancellationToken) -> CacheResult<()> {
    if cancel.is_cancelled() {
        return Err(CacheError::Cancelled);
    }
    Ok(())
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn exists(
        &self,
        namespace: Namespace,
        key: &str,
        cancel: &CancellationToken,
    ) -> CacheResult<bool> {
        check(cancel)?;
        let objects = self.objects.read().await;
        Ok(objects.contains_key(&(namespace, key.to_string())))
    }

    async fn read(
        &self,
        namespace: Namespace,
        key: &str,
        cancel: &CancellationToken,
    ) -> CacheResult<Bytes> {
        check(cancel)?;
        let objects = self.objects.read().await;
        objects
            .get(&(namespace, key.to_string()))
            .cloned()
            .ok_or_else(|| CacheError::durable("read", namespace.object(key), "object not found"))
    }

    async fn write(
        &self,
        namespace: Namespace,
        key: &str,
        data: Bytes,
        cancel: &CancellationToken,
    ) -> CacheResult<()> {
        check(cancel)?;
        self.objects
            .write()
            .await
            .insert((namespace, key.to_string()), data);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_read() {
        let store = MemoryStore::new();
        let cancel = CancellationToken::new();

        assert!(store.is_empty().await);
        store
            .write(Namespace::Manifests, "abc", Bytes::from_static(b"{}"), &cancel)
            .await
            .unwrap();

        assert!(store.exists(Namespace::Manifests, "abc", &cancel).await.unwrap());
        assert!(!store.exists(Namespace::Builds, "abc", &cancel).await.unwrap());
        assert_eq!(
            store.read(Namespace::Manifests, "abc", &cancel).await.unwrap(),
            Bytes::from_static(b"{}")
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn cancelled_calls_fail() {
        let store = MemoryStore::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = store
            .exists(Namespace::Builds, "k", &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
