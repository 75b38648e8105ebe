//! Error types for geotrie.

use geotrie_types::cell::InvalidValue;
use thiserror::Error;

/// Errors raised by the index, its configuration and its collaborators.
#[derive(Error, Debug)]
pub enum GeoTrieError {
    /// Invalid index configuration. Fatal, surfaced at construction.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Failure reported by the backing key-value store. Never retried here.
    #[error("Backing store error: {0}")]
    BackingStore(String),

    /// Rejected item, geometry, or call argument.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Geohash encoding or decoding failure.
    #[error("Invalid geohash: {0}")]
    InvalidGeohash(String),

    /// Item (de)serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored data that cannot be decoded.
    #[error("Corrupt entry: {0}")]
    CorruptEntry(String),
}

impl From<InvalidValue> for GeoTrieError {
    fn from(err: InvalidValue) -> Self {
        GeoTrieError::InvalidInput(err.0)
    }
}

impl From<geohash::GeohashError> for GeoTrieError {
    fn from(err: geohash::GeohashError) -> Self {
        GeoTrieError::InvalidGeohash(err.to_string())
    }
}

/// Result type for geotrie operations.
pub type Result<T> = std::result::Result<T, GeoTrieError>;
