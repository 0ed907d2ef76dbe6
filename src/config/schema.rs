//! Configuration schema for buildcache
//!
//! Configuration is stored at `~/.config/buildcache/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Local tier settings
    pub local: LocalConfig,

    /// Background write-back settings
    pub writeback: WriteBackConfig,

    /// Durable tier settings
    pub durable: DurableConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Local tier configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Directory holding cached manifests (defaults to `<tmp>/buildcache`)
    pub dir: Option<PathBuf>,
}

/// How manifest write-backs into the local tier are scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteBackMode {
    /// Handed to the background pool; the caller does not wait
    #[default]
    Deferred,
    /// Performed before the cache operation returns
    Inline,
}

/// Background write-back configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteBackConfig {
    /// Scheduling mode
    pub mode: WriteBackMode,

    /// Maximum number of write-backs running at once
    pub workers: usize,
}

impl Default for WriteBackConfig {
    fn default() -> Self {
        Self {
            mode: WriteBackMode::Deferred,
            workers: 4,
        }
    }
}

/// Durable store backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurableBackend {
    /// Directory-backed bucket
    #[default]
    Filesystem,
    /// Process-local map, lost on exit
    Memory,
}

/// Durable tier configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DurableConfig {
    /// Backend to use
    pub backend: DurableBackend,

    /// Bucket root for the filesystem backend
    pub path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[writeback]"));
        assert!(toml.contains("mode = \"deferred\""));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.writeback.workers, 4);
        assert_eq!(config.durable.backend, DurableBackend::Filesystem);
        assert!(config.local.dir.is_none());
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [writeback]
            mode = "inline"

            [durable]
            backend = "memory"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.writeback.mode, WriteBackMode::Inline);
        assert_eq!(config.writeback.workers, 4); // default preserved
        assert_eq!(config.durable.backend, DurableBackend::Memory);
        assert_eq!(config.general.log_format, "text");
    }

    #[test]
    fn unknown_backend_rejected() {
        let toml = r#"
            [durable]
            backend = "gopher"
        "#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }
}
