//! Layer command - fetch or store cached layer build entries

use crate::cache::key::validate_key;
use crate::cache::{Cache, LayerEntry};
use crate::cli::args::{LayerAction, LayerArgs};
use crate::error::{CacheError, CacheResult};
use console::style;
use tokio_util::sync::CancellationToken;

/// Execute the layer command
pub async fn execute(args: LayerArgs, cache: &Cache, cancel: &CancellationToken) -> CacheResult<()> {
    match args.action {
        LayerAction::Get { key } => {
            validate_key(&key)?;
            let entry = cache
                .fetch_layer(&key, cancel)
                .await
                .ok_or_else(|| CacheError::User(format!("No cached layer for {}", key)))?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        LayerAction::Put {
            key,
            digest,
            size,
            tar_hash,
        } => {
            validate_key(&key)?;
            let mut entry = LayerEntry::new(digest, size);
            if let Some(tar_hash) = tar_hash {
                entry = entry.with_tar_hash(tar_hash);
            }
            cache.store_layer(&key, entry, cancel).await;
            println!("{} Stored layer {}", style("✓").green(), key);
        }
    }

    Ok(())
}
