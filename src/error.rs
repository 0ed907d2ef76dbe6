//! Error types for buildcache
//!
//! Cache reads and writes never surface these to callers; they are logged
//! and collapsed into a miss. Construction, configuration and the durable
//! store boundary use `CacheResult<T>`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for buildcache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// All errors that can occur in buildcache
#[derive(Error, Debug)]
pub enum CacheError {
    // Local tier errors
    #[error("Failed to create local cache directory {path}: {source}")]
    LocalDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid cache key: {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    // Durable tier errors
    #[error("Durable store {op} failed for {object}: {reason}")]
    Durable {
        op: &'static str,
        object: String,
        reason: String,
    },

    #[error("Durable store call cancelled")]
    Cancelled,

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{0}")]
    User(String),
}

impl CacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a durable store error
    pub fn durable(op: &'static str, object: impl Into<String>, reason: impl ToString) -> Self {
        Self::Durable {
            op,
            object: object.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error came from a cancelled caller rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::LocalDirCreate { .. } => {
                Some("Check permissions, or set [local] dir in the config file")
            }
            Self::ConfigInvalid { .. } => Some("Run: buildcache config show"),
            Self::InvalidKey { .. } => Some("Keys must be plain file names"),
            _ => None,
        }
    }
}
