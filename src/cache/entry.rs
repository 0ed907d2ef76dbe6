//! Layer build entry
//!
//! Metadata the builder records for a packed filesystem layer. The schema is
//! owned by the builder; the cache stores it in the layer map and as JSON in
//! the durable `builds/` namespace.

use crate::error::CacheResult;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Result of a layer build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerEntry {
    /// Content digest of the compressed layer
    pub digest: String,

    /// Compressed layer size in bytes
    pub size: u64,

    /// Hash of the uncompressed tarball, if the builder recorded it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tar_hash: Option<String>,

    /// Popularity score used while grouping layers; only meaningful within a build
    #[serde(skip)]
    pub merge_rating: u64,
}

impl LayerEntry {
    /// Create an entry with just a digest and size
    pub fn new(digest: impl Into<String>, size: u64) -> Self {
        Self {
            digest: digest.into(),
            size,
            tar_hash: None,
            merge_rating: 0,
        }
    }

    /// Attach the uncompressed tarball hash
    pub fn with_tar_hash(mut self, tar_hash: impl Into<String>) -> Self {
        self.tar_hash = Some(tar_hash.into());
        self
    }

    /// Serialize for the durable tier
    pub fn to_bytes(&self) -> CacheResult<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    /// Parse an entry read back from the durable tier
    pub fn from_slice(data: &[u8]) -> CacheResult<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_camel_case_without_rating() {
        let mut entry = LayerEntry::new("sha256:deadbeef", 42).with_tar_hash("sha256:cafe");
        entry.merge_rating = 7;

        let json: serde_json::Value =
            serde_json::from_slice(&entry.to_bytes().unwrap()).unwrap();
        assert_eq!(json["digest"], "sha256:deadbeef");
        assert_eq!(json["size"], 42);
        assert_eq!(json["tarHash"], "sha256:cafe");
        assert!(json.get("mergeRating").is_none());
    }

    #[test]
    fn tar_hash_omitted_when_absent() {
        let bytes = LayerEntry::new("deadbeef", 1).to_bytes().unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(!text.contains("tarHash"));
    }

    #[test]
    fn parses_builder_output() {
        let entry = LayerEntry::from_slice(br#"{"digest":"deadbeef","size":42}"#).unwrap();
        assert_eq!(entry, LayerEntry::new("deadbeef", 42));
    }

    #[test]
    fn rejects_malformed_entry() {
        assert!(LayerEntry::from_slice(b"{\"digest\":").is_err());
        assert!(LayerEntry::from_slice(br#"{"size":42}"#).is_err());
    }
}
