//! Typed description of the tables backing one index instance.

use crate::config::IndexConfig;
use crate::error::{GeoTrieError, Result};
use crate::namespace::{NamespaceName, TABLE_SEPARATOR};

/// Table layout of an index: one level table per cell length plus the
/// content table.
///
/// The keyspace embeds `hash_min` and `depth`, so two indexes with different
/// level ranges never share tables.
///
/// ```text
/// geotrie_hash_min2_depth3.level2
/// geotrie_hash_min2_depth3.level3
/// geotrie_hash_min2_depth3.level4
/// geotrie_hash_min2_depth3.level5
/// geotrie_hash_min2_depth3.content
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    keyspace: String,
    hash_min: usize,
    levels: Vec<String>,
    content: String,
}

impl Schema {
    pub fn new(namespace: &NamespaceName, config: &IndexConfig) -> Self {
        let keyspace = format!(
            "{}_hash_min{}_depth{}",
            namespace.as_str(),
            config.hash_min,
            config.depth
        );
        let levels = config
            .levels()
            .map(|len| format!("{}{}level{}", keyspace, TABLE_SEPARATOR, len))
            .collect();
        let content = format!("{}{}content", keyspace, TABLE_SEPARATOR);

        Self {
            keyspace,
            hash_min: config.hash_min,
            levels,
            content,
        }
    }

    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    /// Table holding cells of length `len`.
    pub fn level(&self, len: usize) -> Result<&str> {
        len.checked_sub(self.hash_min)
            .and_then(|i| self.levels.get(i))
            .map(String::as_str)
            .ok_or_else(|| {
                GeoTrieError::InvalidInput(format!(
                    "no level table for cell length {} in {}",
                    len, self.keyspace
                ))
            })
    }

    /// `(length, table)` pairs in increasing length order.
    pub fn level_tables(&self) -> impl Iterator<Item = (usize, &str)> {
        self.levels
            .iter()
            .enumerate()
            .map(move |(i, t)| (self.hash_min + i, t.as_str()))
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Every table name, levels first.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.levels
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.content.as_str()))
    }
}
