//! Manifest command - fetch or store cached manifests

use crate::cache::key::validate_key;
use crate::cache::Cache;
use crate::cli::args::{ManifestAction, ManifestArgs};
use crate::error::{CacheError, CacheResult};
use bytes::Bytes;
use console::style;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

/// Execute the manifest command
pub async fn execute(
    args: ManifestArgs,
    cache: &Cache,
    cancel: &CancellationToken,
) -> CacheResult<()> {
    match args.action {
        ManifestAction::Get { key } => get(cache, &key, cancel).await,
        ManifestAction::Put { key, file } => put(cache, &key, file.as_deref(), cancel).await,
    }
}

async fn get(cache: &Cache, key: &str, cancel: &CancellationToken) -> CacheResult<()> {
    validate_key(key)?;

    let manifest = cache
        .fetch_manifest(key, cancel)
        .await
        .ok_or_else(|| CacheError::User(format!("No cached manifest for {}", key)))?;

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(&manifest)
        .await
        .map_err(|e| CacheError::io("writing manifest to stdout", e))?;
    stdout
        .flush()
        .await
        .map_err(|e| CacheError::io("flushing stdout", e))
}

async fn put(
    cache: &Cache,
    key: &str,
    file: Option<&Path>,
    cancel: &CancellationToken,
) -> CacheResult<()> {
    validate_key(key)?;

    let payload = match file {
        Some(path) => tokio::fs::read(path)
            .await
            .map_err(|e| CacheError::io(format!("reading {}", path.display()), e))?,
        None => {
            let mut buf = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buf)
                .await
                .map_err(|e| CacheError::io("reading manifest from stdin", e))?;
            buf
        }
    };

    let size = payload.len();
    cache.store_manifest(key, Bytes::from(payload), cancel).await;
    println!(
        "{} Stored manifest {} ({} bytes)",
        style("✓").green(),
        key,
        size
    );
    Ok(())
}
