//! Index configuration.
//!
//! An `IndexConfig` is fixed for the lifetime of an index. A different
//! `(hash_min, depth)` pair lives in a different keyspace (see
//! [`Schema`](crate::schema::Schema)), so changing it means building a new
//! index rather than migrating an existing one.

use crate::error::{GeoTrieError, Result};
use geotrie_types::cell::MAX_CELL_LEN;
use serde::de::Error;

/// Length of a full SHA-512 hex digest.
pub const FULL_DIGEST_LEN: usize = 128;

/// Shortest allowed content id: 128 bits of the digest. Always longer than
/// any cell code, so leaves and edges never share a length.
pub const MIN_CONTENT_ID_LEN: usize = 32;

/// Configuration of the adaptive geohash trie.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
    /// Shortest cell length in the trie (the root level).
    #[serde(default = "IndexConfig::default_hash_min")]
    pub hash_min: usize,

    /// Number of levels below `hash_min`; `hash_max = hash_min + depth`.
    #[serde(default = "IndexConfig::default_depth")]
    pub depth: usize,

    /// Refinement threshold. Larger values index more coarsely.
    #[serde(default = "IndexConfig::default_delta")]
    pub delta: f64,

    /// Number of hex characters kept from the content digest.
    #[serde(default = "IndexConfig::default_content_id_len")]
    pub content_id_len: usize,

    /// Default number of content rows fetched per batch during queries.
    #[serde(default = "IndexConfig::default_chunk_size")]
    pub chunk_size: usize,
}

impl IndexConfig {
    const fn default_hash_min() -> usize {
        4
    }

    const fn default_depth() -> usize {
        3
    }

    const fn default_delta() -> f64 {
        1.5
    }

    const fn default_content_id_len() -> usize {
        FULL_DIGEST_LEN
    }

    const fn default_chunk_size() -> usize {
        100
    }

    /// Longest cell length in the trie.
    pub fn hash_max(&self) -> usize {
        self.hash_min + self.depth
    }

    /// Iterator over every level length, `hash_min..=hash_max`.
    pub fn levels(&self) -> std::ops::RangeInclusive<usize> {
        self.hash_min..=self.hash_max()
    }

    pub fn with_hash_min(mut self, hash_min: usize) -> Self {
        self.hash_min = hash_min;
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_content_id_len(mut self, len: usize) -> Self {
        self.content_id_len = len;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Check every constraint. Content ids shorter than
    /// [`MIN_CONTENT_ID_LEN`] are rejected: ids are the dedup key, so a
    /// prefix collision would drop an item from the index.
    pub fn validate(&self) -> Result<()> {
        if self.hash_min == 0 {
            return Err(GeoTrieError::Configuration(
                "hash_min must be at least 1".into(),
            ));
        }

        if self.hash_max() > MAX_CELL_LEN {
            return Err(GeoTrieError::Configuration(format!(
                "hash_min + depth must not exceed {}, got {}",
                MAX_CELL_LEN,
                self.hash_max()
            )));
        }

        if !self.delta.is_finite() || self.delta <= 1.0 {
            return Err(GeoTrieError::Configuration(format!(
                "delta must be a finite number greater than 1.0, got {}",
                self.delta
            )));
        }

        if !(MIN_CONTENT_ID_LEN..=FULL_DIGEST_LEN).contains(&self.content_id_len) {
            return Err(GeoTrieError::Configuration(format!(
                "content_id_len must be in {}..={}, got {}",
                MIN_CONTENT_ID_LEN, FULL_DIGEST_LEN, self.content_id_len
            )));
        }

        if self.chunk_size == 0 {
            return Err(GeoTrieError::Configuration(
                "chunk_size must be greater than zero".into(),
            ));
        }

        if self.depth >= 6 {
            log::warn!(
                "Trie depth {} spans {} levels; fine levels on large items can fan out heavily",
                self.depth,
                self.depth + 1
            );
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: IndexConfig = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let config: IndexConfig = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            hash_min: Self::default_hash_min(),
            depth: Self::default_depth(),
            delta: Self::default_delta(),
            content_id_len: Self::default_content_id_len(),
            chunk_size: Self::default_chunk_size(),
        }
    }
}
