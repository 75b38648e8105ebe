//! Level-by-level trie walk answering range queries.

use crate::compute::covering::{Covering, cell_overlaps, cover_many};
use crate::config::IndexConfig;
use crate::error::Result;
use crate::schema::Schema;
use crate::storage::KvStore;
use crate::trie::codec::TrieCodec;
use geotrie_types::bbox::BoundingBox;
use geotrie_types::cell::{ContentId, TrieValue};
use rustc_hash::FxHashSet;

/// Counters collected during one walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrieWalkStats {
    /// Levels whose table was read.
    pub levels_visited: usize,
    /// Cells looked up across all levels.
    pub cells_probed: usize,
    /// Child links accepted into the next frontier.
    pub edges_followed: usize,
    /// Leaf values seen, before deduplication.
    pub leaves_found: usize,
    /// Edges dropped because their length did not match the next level.
    pub edges_skipped: usize,
    /// Linked cells dropped because they lie outside every query box.
    pub cells_pruned: usize,
}

/// Result of a walk: candidate content ids, sorted, plus counters.
#[derive(Debug, Clone, Default)]
pub struct TrieWalk {
    pub candidates: Vec<ContentId>,
    pub stats: TrieWalkStats,
}

/// Reads the trie for a set of query boxes.
pub struct TrieReader<'a, S: KvStore + ?Sized> {
    store: &'a S,
    schema: &'a Schema,
    config: &'a IndexConfig,
    codec: TrieCodec,
}

impl<'a, S: KvStore + ?Sized> TrieReader<'a, S> {
    pub fn new(store: &'a S, schema: &'a Schema, config: &'a IndexConfig) -> Self {
        Self {
            store,
            schema,
            config,
            codec: TrieCodec::from_config(config),
        }
    }

    /// Collect content ids of every item whose cells overlap `boxes`.
    ///
    /// The result is a superset of the items that truly intersect the
    /// boxes. The root level reads the covering of the boxes. Below it, only
    /// linked cells that still overlap some box are kept, so branches that
    /// only share a coarse ancestor with the query are dropped early and
    /// the work per level stays bounded by the frontier.
    pub fn walk(&self, boxes: &[BoundingBox]) -> Result<TrieWalk> {
        let mut stats = TrieWalkStats::default();
        let mut candidates: FxHashSet<ContentId> = FxHashSet::default();

        if boxes.is_empty() {
            return Ok(TrieWalk::default());
        }

        let mut frontier = cover_many(boxes, self.config.hash_min)?;

        for level in self.config.levels() {
            if level > self.config.hash_min {
                let linked = frontier.len();
                frontier = self.prune(frontier, boxes)?;
                stats.cells_pruned += linked - frontier.len();
            }

            if frontier.is_empty() {
                break;
            }

            let table = self.schema.level(level)?;
            let keys: Vec<&str> = frontier.iter().map(|c| c.as_str()).collect();
            let rows = self.store.get_many(table, &keys)?;

            stats.levels_visited += 1;
            stats.cells_probed += keys.len();

            let mut next = Covering::default();
            for (cell, values) in &rows {
                for raw in values {
                    match self.codec.decode(raw)? {
                        TrieValue::Leaf(id) => {
                            stats.leaves_found += 1;
                            candidates.insert(id);
                        }
                        TrieValue::Edge(child) if child.len() == level + 1 => {
                            stats.edges_followed += 1;
                            next.insert(child);
                        }
                        TrieValue::Edge(child) => {
                            stats.edges_skipped += 1;
                            log::warn!(
                                "Skipping edge {} -> {} in {}: expected length {}",
                                cell,
                                child,
                                table,
                                level + 1
                            );
                        }
                    }
                }
            }

            log::trace!(
                "Level {}: probed {} cells, {} rows, {} children, {} candidates so far",
                level,
                keys.len(),
                rows.len(),
                next.len(),
                candidates.len()
            );

            frontier = next;
        }

        let mut candidates: Vec<ContentId> = candidates.into_iter().collect();
        candidates.sort();

        Ok(TrieWalk { candidates, stats })
    }

    fn prune(&self, frontier: Covering, boxes: &[BoundingBox]) -> Result<Covering> {
        let mut kept = Covering::default();
        for cell in frontier {
            let mut overlaps = false;
            for bbox in boxes {
                if cell_overlaps(&cell, bbox)? {
                    overlaps = true;
                    break;
                }
            }
            if overlaps {
                kept.insert(cell);
            }
        }
        Ok(kept)
    }
}
