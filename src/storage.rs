//! Backing store abstraction for geotrie
//!
//! The index only needs a handful of operations from its store: named tables
//! mapping a string key to a set of string values, an idempotent conditional
//! insert, and batched point lookups. Any partitioned key-value store that can
//! offer these plugs in by implementing [`KvStore`].

use crate::error::Result;
use rustc_hash::FxHashMap;
use std::sync::Arc;

mod memory;

pub use memory::{MemoryStore, TableDump};

/// Values found by a batched lookup, keyed by the requested key. Keys with no
/// values are absent.
pub type Rows = FxHashMap<String, Vec<String>>;

/// Trait for backing store implementations
///
/// All methods take `&self`: the index is shared between concurrent callers
/// and relies on `put_if_absent` being idempotent rather than on locking.
/// Failures are reported as [`GeoTrieError::BackingStore`](crate::GeoTrieError::BackingStore)
/// and are never retried by the index.
pub trait KvStore: Send + Sync {
    /// Provision a table. Creating an existing table is a no-op.
    fn create_table(&self, table: &str) -> Result<()>;

    /// Insert `value` under `key` unless the exact pair already exists.
    ///
    /// Returns `true` if the pair was new.
    fn put_if_absent(&self, table: &str, key: &str, value: &str) -> Result<bool>;

    /// Batched point lookup of `keys`.
    fn get_many(&self, table: &str, keys: &[&str]) -> Result<Rows>;

    /// Check if any value is stored under `key`
    fn contains_key(&self, table: &str, key: &str) -> Result<bool> {
        Ok(self.get_many(table, &[key])?.contains_key(key))
    }
}

impl<S: KvStore + ?Sized> KvStore for Arc<S> {
    fn create_table(&self, table: &str) -> Result<()> {
        (**self).create_table(table)
    }

    fn put_if_absent(&self, table: &str, key: &str, value: &str) -> Result<bool> {
        (**self).put_if_absent(table, key, value)
    }

    fn get_many(&self, table: &str, keys: &[&str]) -> Result<Rows> {
        (**self).get_many(table, keys)
    }

    fn contains_key(&self, table: &str, key: &str) -> Result<bool> {
        (**self).contains_key(table, key)
    }
}

/// Backing store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of provisioned tables
    pub table_count: usize,
    /// Number of keys across all tables
    pub key_count: usize,
    /// Number of (key, value) pairs across all tables
    pub value_count: usize,
    /// Number of `put_if_absent` calls that inserted a new pair
    pub inserts: u64,
    /// Number of `put_if_absent` calls that found the pair already present
    pub duplicate_inserts: u64,
    /// Number of keys requested through `get_many`
    pub keys_read: u64,
}
