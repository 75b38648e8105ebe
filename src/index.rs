//! The index facade: insert items, query by polygon.

use crate::compute::validation::validate_ring;
use crate::config::IndexConfig;
use crate::error::{GeoTrieError, Result};
use crate::item::{Item, ring_bbox, ring_polygon};
use crate::namespace::NamespaceName;
use crate::polygon::PolygonIndex;
use crate::schema::Schema;
use crate::storage::{KvStore, MemoryStore};
use crate::trie::{TrieReader, TrieWalkStats, TrieWriter};
use geotrie_types::cell::ContentId;
use std::sync::Arc;

/// What an insert did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Content id the item is stored under.
    pub id: ContentId,
    /// The content row already existed and nothing was written.
    pub duplicate: bool,
    /// Level the item terminates at. `None` for duplicates.
    pub terminal_length: Option<usize>,
    /// Edge entries written.
    pub edges: usize,
    /// Leaf entries written.
    pub leaves: usize,
}

/// Counters for one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Trie walk counters.
    pub walk: TrieWalkStats,
    /// Distinct content ids found in the trie.
    pub candidates: usize,
    /// Content rows loaded from the store.
    pub loaded: usize,
    /// Items that passed the exact intersection test.
    pub matched: usize,
}

/// Adaptive multi-resolution geohash index over a [`KvStore`].
///
/// All methods take `&self`. Writes are idempotent conditional inserts, so
/// concurrent inserts of the same or overlapping items converge to the same
/// store contents. A query racing an insert may miss that item.
///
/// # Examples
///
/// ```
/// use geotrie::{IndexBuilder, Item};
/// use serde_json::json;
///
/// let index = IndexBuilder::new().hash_min(2).depth(3).build()?;
///
/// let item = Item::from_value(json!({
///     "file": "one",
///     "polygon": [[0, 0], [0, 1], [1, 1], [1, 0]]
/// }))?;
/// index.insert(&item, true)?;
///
/// let hits = index.intersect(&[(0.5, 0.5), (0.5, 2.0), (2.0, 2.0)], true)?;
/// assert_eq!(hits.len(), 1);
/// # Ok::<(), geotrie::GeoTrieError>(())
/// ```
pub struct GeoTrieIndex<S: KvStore = MemoryStore> {
    store: S,
    namespace: NamespaceName,
    config: IndexConfig,
    schema: Schema,
}

impl<S: KvStore> GeoTrieIndex<S> {
    /// Open an index on `store`, provisioning its tables.
    ///
    /// # Errors
    ///
    /// `Configuration` if `config` is invalid, `BackingStore` if a table
    /// cannot be created.
    pub fn open(store: S, namespace: NamespaceName, config: IndexConfig) -> Result<Self> {
        config.validate()?;
        let schema = Schema::new(&namespace, &config);

        for table in schema.tables() {
            store.create_table(table)?;
        }

        log::debug!(
            "Opened index {} with levels {}..={}",
            schema.keyspace(),
            config.hash_min,
            config.hash_max()
        );

        Ok(Self {
            store,
            namespace,
            config,
            schema,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn namespace(&self) -> &NamespaceName {
        &self.namespace
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Index an item.
    ///
    /// Items already present (same content id) are not written again.
    /// Retrying a failed insert is safe.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for rings outside the geographic range, `BackingStore`
    /// on store failures.
    pub fn insert(&self, item: &Item, lon_first: bool) -> Result<InsertOutcome> {
        validate_ring(item.ring(), lon_first)?;
        let id = item.content_id(self.config.content_id_len)?;

        if self.store.contains_key(self.schema.content(), id.as_str())? {
            log::debug!("Item {} already indexed", id);
            return Ok(InsertOutcome {
                id,
                duplicate: true,
                terminal_length: None,
                edges: 0,
                leaves: 0,
            });
        }

        let bbox = item.bbox(lon_first)?;
        let payload = item.to_canonical_json()?;
        let report = TrieWriter::new(&self.store, &self.schema, &self.config)
            .write(&bbox, &id, &payload)?;

        log::debug!(
            "Indexed {} at length {}: {} edges, {} leaves",
            id,
            report.terminal_length,
            report.edges,
            report.leaves
        );

        Ok(InsertOutcome {
            id,
            duplicate: false,
            terminal_length: Some(report.terminal_length),
            edges: report.edges,
            leaves: report.leaves,
        })
    }

    /// Check whether an item with the same content is indexed.
    pub fn contains(&self, item: &Item) -> Result<bool> {
        let id = item.content_id(self.config.content_id_len)?;
        self.store.contains_key(self.schema.content(), id.as_str())
    }

    /// Load an indexed item by content id.
    pub fn get(&self, id: &ContentId) -> Result<Option<Item>> {
        let rows = self.store.get_many(self.schema.content(), &[id.as_str()])?;
        rows.get(id.as_str())
            .and_then(|values| values.first())
            .map(|payload| decode_content(id, payload))
            .transpose()
    }

    /// Items intersecting any of `polygons`, loading content `chunk_size`
    /// rows at a time.
    ///
    /// `lon_first` gives the axis order of both the query rings and the
    /// stored items' rings.
    pub fn query<R: AsRef<[(f64, f64)]>>(
        &self,
        polygons: &[R],
        lon_first: bool,
        chunk_size: usize,
    ) -> Result<PolygonIndex> {
        self.query_with_stats(polygons, lon_first, chunk_size)
            .map(|(found, _)| found)
    }

    /// [`query`](Self::query) with the configured chunk size.
    pub fn query_default<R: AsRef<[(f64, f64)]>>(
        &self,
        polygons: &[R],
        lon_first: bool,
    ) -> Result<PolygonIndex> {
        self.query(polygons, lon_first, self.config.chunk_size)
    }

    /// Items intersecting a single polygon.
    pub fn intersect(&self, polygon: &[(f64, f64)], lon_first: bool) -> Result<PolygonIndex> {
        self.query_default(&[polygon], lon_first)
    }

    /// [`query`](Self::query), also returning counters for the walk, the
    /// content loads and the exact filter.
    pub fn query_with_stats<R: AsRef<[(f64, f64)]>>(
        &self,
        polygons: &[R],
        lon_first: bool,
        chunk_size: usize,
    ) -> Result<(PolygonIndex, QueryStats)> {
        if chunk_size == 0 {
            return Err(GeoTrieError::InvalidInput(
                "chunk_size must be greater than 0".into(),
            ));
        }

        let mut found = PolygonIndex::new(lon_first);
        let mut stats = QueryStats::default();

        if polygons.is_empty() {
            return Ok((found, stats));
        }

        let mut boxes = Vec::with_capacity(polygons.len());
        let mut shapes = Vec::with_capacity(polygons.len());
        for ring in polygons {
            let ring = ring.as_ref();
            validate_ring(ring, lon_first)?;
            boxes.push(ring_bbox(ring, lon_first)?);
            shapes.push(ring_polygon(ring, lon_first));
        }

        let walk = TrieReader::new(&self.store, &self.schema, &self.config).walk(&boxes)?;
        stats.walk = walk.stats;
        stats.candidates = walk.candidates.len();

        for chunk in walk.candidates.chunks(chunk_size) {
            let keys: Vec<&str> = chunk.iter().map(ContentId::as_str).collect();
            let rows = self.store.get_many(self.schema.content(), &keys)?;

            let mut loaded = PolygonIndex::new(lon_first);
            for id in chunk {
                let Some(payload) = rows.get(id.as_str()).and_then(|v| v.first()) else {
                    // Trie entries are written before the content row.
                    log::debug!("Candidate {} has no content row yet", id);
                    continue;
                };
                let item = decode_content(id, payload)?;
                loaded.insert_with_id(id.clone(), Arc::new(item))?;
            }
            stats.loaded += loaded.len();

            for shape in &shapes {
                found.merge(loaded.intersect(shape));
            }
        }

        stats.matched = found.len();

        log::debug!(
            "Query over {} polygons: {} candidates, {} loaded, {} matched",
            polygons.len(),
            stats.candidates,
            stats.loaded,
            stats.matched
        );

        Ok((found, stats))
    }
}

fn decode_content(id: &ContentId, payload: &str) -> Result<Item> {
    Item::from_json(payload)
        .map_err(|e| GeoTrieError::CorruptEntry(format!("content {}: {}", id, e)))
}
