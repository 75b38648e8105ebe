//! Writes an item's cells into the trie.

use crate::compute::covering::cover;
use crate::compute::resolution::select_resolution;
use crate::config::IndexConfig;
use crate::error::{GeoTrieError, Result};
use crate::schema::Schema;
use crate::storage::KvStore;
use crate::trie::codec::TrieCodec;
use geotrie_types::bbox::BoundingBox;
use geotrie_types::cell::{ContentId, TrieValue};

/// Summary of one trie write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Cell length the item terminates at.
    pub terminal_length: usize,
    /// Edge entries written, across all levels.
    pub edges: usize,
    /// Leaf entries written at the terminal level.
    pub leaves: usize,
    /// Entries the store had not seen before.
    pub new_entries: usize,
}

/// Writes edges, leaves and the content row for one item.
pub struct TrieWriter<'a, S: KvStore + ?Sized> {
    store: &'a S,
    schema: &'a Schema,
    config: &'a IndexConfig,
    codec: TrieCodec,
}

impl<'a, S: KvStore + ?Sized> TrieWriter<'a, S> {
    pub fn new(store: &'a S, schema: &'a Schema, config: &'a IndexConfig) -> Self {
        Self {
            store,
            schema,
            config,
            codec: TrieCodec::from_config(config),
        }
    }

    /// Index `bbox` under `id` and store `payload` as its content.
    ///
    /// Edges are written from the root level down to the terminal level,
    /// then the leaves, then the content row. A content row is therefore
    /// only present once every trie entry above it exists, and an
    /// interrupted write can simply be repeated.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `id` does not have the configured content id
    /// length, since it would read back as an edge.
    pub fn write(&self, bbox: &BoundingBox, id: &ContentId, payload: &str) -> Result<WriteReport> {
        if id.len() != self.codec.content_id_len() {
            return Err(GeoTrieError::InvalidInput(format!(
                "content id {} has length {}, expected {}",
                id,
                id.len(),
                self.codec.content_id_len()
            )));
        }

        let resolution = select_resolution(bbox, self.config)?;
        let terminal = resolution.length;

        let mut report = WriteReport {
            terminal_length: terminal,
            ..WriteReport::default()
        };

        for level in self.config.hash_min..terminal {
            let table = self.schema.level(level)?;
            let children = if level + 1 == terminal {
                resolution.covering.clone()
            } else {
                cover(bbox, level + 1)?
            };

            for child in &children {
                let parent = child.parent().ok_or_else(|| {
                    GeoTrieError::InvalidGeohash(format!("cell {} has no parent", child))
                })?;
                let edge = TrieValue::Edge(child.clone());
                if self.store.put_if_absent(table, parent.as_str(), self.codec.encode(&edge))? {
                    report.new_entries += 1;
                }
                report.edges += 1;
            }

            log::trace!("Wrote {} edges into {}", children.len(), table);
        }

        let table = self.schema.level(terminal)?;
        let leaf = TrieValue::Leaf(id.clone());
        for cell in &resolution.covering {
            if self.store.put_if_absent(table, cell.as_str(), self.codec.encode(&leaf))? {
                report.new_entries += 1;
            }
            report.leaves += 1;
        }

        if self.store.put_if_absent(self.schema.content(), id.as_str(), payload)? {
            report.new_entries += 1;
        }

        Ok(report)
    }
}
