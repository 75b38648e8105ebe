//! In-memory backing store implementation.

use super::{KvStore, Rows, StoreStats};
use crate::error::{GeoTrieError, Result};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};

type Table = FxHashMap<String, BTreeSet<String>>;

/// Ordered copy of every table, for comparing store contents.
pub type TableDump = BTreeMap<String, BTreeMap<String, BTreeSet<String>>>;

/// In-memory multi-value table store.
///
/// Tables must be created before use, like the pre-provisioned tables of a
/// real cluster; reads and writes against unknown tables fail with a backing
/// store error.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<FxHashMap<String, Table>>,
    inserts: AtomicU64,
    duplicate_inserts: AtomicU64,
    keys_read: AtomicU64,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn missing_table(table: &str) -> GeoTrieError {
        GeoTrieError::BackingStore(format!("table '{}' does not exist", table))
    }

    /// Get store statistics
    pub fn stats(&self) -> StoreStats {
        let tables = self.tables.read();
        StoreStats {
            table_count: tables.len(),
            key_count: tables.values().map(|t| t.len()).sum(),
            value_count: tables
                .values()
                .flat_map(|t| t.values())
                .map(|v| v.len())
                .sum(),
            inserts: self.inserts.load(Ordering::Relaxed),
            duplicate_inserts: self.duplicate_inserts.load(Ordering::Relaxed),
            keys_read: self.keys_read.load(Ordering::Relaxed),
        }
    }

    /// Ordered snapshot of all tables.
    pub fn dump(&self) -> TableDump {
        self.tables
            .read()
            .iter()
            .map(|(name, table)| {
                let rows = table
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                (name.clone(), rows)
            })
            .collect()
    }

    /// Names of all provisioned tables, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl KvStore for MemoryStore {
    fn create_table(&self, table: &str) -> Result<()> {
        self.tables.write().entry(table.to_string()).or_default();
        Ok(())
    }

    fn put_if_absent(&self, table: &str, key: &str, value: &str) -> Result<bool> {
        let mut tables = self.tables.write();
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| Self::missing_table(table))?;

        let inserted = rows
            .entry(key.to_string())
            .or_default()
            .insert(value.to_string());

        if inserted {
            self.inserts.fetch_add(1, Ordering::Relaxed);
        } else {
            self.duplicate_inserts.fetch_add(1, Ordering::Relaxed);
        }

        Ok(inserted)
    }

    fn get_many(&self, table: &str, keys: &[&str]) -> Result<Rows> {
        let tables = self.tables.read();
        let rows = tables.get(table).ok_or_else(|| Self::missing_table(table))?;

        self.keys_read
            .fetch_add(keys.len() as u64, Ordering::Relaxed);

        let mut found = Rows::default();
        for key in keys {
            if let Some(values) = rows.get(*key) {
                found.insert(key.to_string(), values.iter().cloned().collect());
            }
        }

        Ok(found)
    }
}
