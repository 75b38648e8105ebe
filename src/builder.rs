//! Index builder
//!
//! Collects a namespace, a configuration and a backing store and opens a
//! [`GeoTrieIndex`] on them.

use crate::config::IndexConfig;
use crate::error::Result;
use crate::index::GeoTrieIndex;
use crate::namespace::NamespaceName;
use crate::storage::{KvStore, MemoryStore};

/// Builder for [`GeoTrieIndex`].
///
/// # Examples
///
/// ```
/// use geotrie::IndexBuilder;
///
/// let index = IndexBuilder::new()
///     .namespace("parcels")
///     .hash_min(3)
///     .depth(4)
///     .build()?;
///
/// assert_eq!(index.schema().keyspace(), "parcels_hash_min3_depth4");
/// # Ok::<(), geotrie::GeoTrieError>(())
/// ```
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    namespace: Option<String>,
    config: IndexConfig,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self {
            namespace: None,
            config: IndexConfig::default(),
        }
    }

    /// Namespace prefixing every table name. Validated on build.
    pub fn namespace<N: Into<String>>(mut self, name: N) -> Self {
        self.namespace = Some(name.into());
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: IndexConfig) -> Self {
        self.config = config;
        self
    }

    pub fn hash_min(mut self, hash_min: usize) -> Self {
        self.config = self.config.with_hash_min(hash_min);
        self
    }

    pub fn depth(mut self, depth: usize) -> Self {
        self.config = self.config.with_depth(depth);
        self
    }

    pub fn delta(mut self, delta: f64) -> Self {
        self.config = self.config.with_delta(delta);
        self
    }

    pub fn content_id_len(mut self, len: usize) -> Self {
        self.config = self.config.with_content_id_len(len);
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.config = self.config.with_chunk_size(chunk_size);
        self
    }

    fn resolve_namespace(&self) -> Result<NamespaceName> {
        match &self.namespace {
            Some(name) => NamespaceName::parse(name.as_str()),
            None => Ok(NamespaceName::default()),
        }
    }

    /// Open the index on `store`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a bad namespace, `Configuration` for an invalid
    /// configuration, `BackingStore` if the store cannot create the tables.
    pub fn build_with<S: KvStore>(self, store: S) -> Result<GeoTrieIndex<S>> {
        let namespace = self.resolve_namespace()?;
        GeoTrieIndex::open(store, namespace, self.config)
    }

    /// Open the index on a fresh [`MemoryStore`].
    pub fn build(self) -> Result<GeoTrieIndex<MemoryStore>> {
        self.build_with(MemoryStore::new())
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}
