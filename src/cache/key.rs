//! Cache key rules
//!
//! Keys are opaque and content-derived upstream. The cache only insists that
//! a key can safely be used as a single file name.

use crate::error::{CacheError, CacheResult};

/// Check that `key` is usable as a file name inside a cache directory
pub fn validate_key(key: &str) -> CacheResult<()> {
    let reason = if key.is_empty() {
        "key is empty"
    } else if key == "." || key == ".." {
        "key is a relative path component"
    } else if key.contains(['/', '\\']) {
        "key contains a path separator"
    } else if key.contains('\0') {
        "key contains a NUL byte"
    } else {
        return Ok(());
    };

    Err(CacheError::InvalidKey {
        key: key.to_string(),
        reason,
    })
}
