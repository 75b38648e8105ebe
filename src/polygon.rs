//! Exact polygon accumulator.
//!
//! [`PolygonIndex`] holds query results. Each item's ring is turned into a
//! `geo::Polygon` once on insert and stored in an R*-tree keyed by its
//! envelope, so intersection tests only run the exact predicate on items
//! whose envelopes overlap the query.

use crate::config::FULL_DIGEST_LEN;
use crate::error::{GeoTrieError, Result};
use crate::item::Item;
use geo::{BoundingRect, Intersects, Polygon};
use geotrie_types::cell::ContentId;
use rstar::{AABB, RTree, RTreeObject};
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// A stored item with its normalized polygon.
#[derive(Debug, Clone)]
pub struct PolygonEntry {
    id: ContentId,
    item: Arc<Item>,
    polygon: Polygon<f64>,
    envelope: AABB<[f64; 2]>,
}

impl PolygonEntry {
    fn new(id: ContentId, item: Arc<Item>, lon_first: bool) -> Result<Self> {
        let polygon = item.polygon(lon_first);
        let rect = polygon.bounding_rect().ok_or_else(|| {
            GeoTrieError::InvalidInput(format!("Item {} has an empty polygon", id))
        })?;
        let envelope = AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);

        Ok(Self {
            id,
            item,
            polygon,
            envelope,
        })
    }

    pub fn id(&self) -> &ContentId {
        &self.id
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    /// Polygon with `x` = lon and `y` = lat.
    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }
}

impl RTreeObject for PolygonEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Deduplicating polygon collection with exact intersection.
///
/// # Examples
///
/// ```
/// use geo::polygon;
/// use geotrie::{Item, PolygonIndex};
/// use serde_json::json;
///
/// let mut index = PolygonIndex::new(true);
/// let item = Item::from_value(json!({
///     "name": "square",
///     "polygon": [[0, 0], [0, 1], [1, 1], [1, 0]]
/// })).unwrap();
///
/// assert!(index.insert(item.clone()).unwrap());
/// assert!(!index.insert(item).unwrap()); // duplicate
///
/// let query = polygon![(x: 0.5, y: 0.5), (x: 2.0, y: 0.5), (x: 2.0, y: 2.0)];
/// assert_eq!(index.intersect(&query).len(), 1);
/// ```
pub struct PolygonIndex {
    tree: RTree<PolygonEntry>,
    ids: FxHashSet<ContentId>,
    lon_first: bool,
}

impl PolygonIndex {
    /// Create an empty accumulator. `lon_first` gives the axis order of the
    /// rings of items inserted later.
    pub fn new(lon_first: bool) -> Self {
        Self {
            tree: RTree::new(),
            ids: FxHashSet::default(),
            lon_first,
        }
    }

    pub fn lon_first(&self) -> bool {
        self.lon_first
    }

    /// Insert an item keyed by its full content digest.
    ///
    /// Returns `false` if an item with the same id is already present.
    pub fn insert(&mut self, item: Item) -> Result<bool> {
        let id = item.content_id(FULL_DIGEST_LEN)?;
        self.insert_with_id(id, Arc::new(item))
    }

    /// Insert an item under an id already known to the caller.
    pub(crate) fn insert_with_id(&mut self, id: ContentId, item: Arc<Item>) -> Result<bool> {
        if self.ids.contains(&id) {
            return Ok(false);
        }

        let entry = PolygonEntry::new(id.clone(), item, self.lon_first)?;
        self.tree.insert(entry);
        self.ids.insert(id);
        Ok(true)
    }

    fn push_entry(&mut self, entry: PolygonEntry) {
        if self.ids.insert(entry.id.clone()) {
            self.tree.insert(entry);
        }
    }

    pub fn contains(&self, id: &ContentId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate stored entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &PolygonEntry> {
        self.tree.iter()
    }

    /// Content ids of all stored items, sorted.
    pub fn ids(&self) -> Vec<ContentId> {
        let mut ids: Vec<ContentId> = self.ids.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Items whose polygon intersects `query`.
    ///
    /// `query` must already use `x` = lon and `y` = lat. Touching boundaries
    /// count as an intersection.
    pub fn intersect(&self, query: &Polygon<f64>) -> PolygonIndex {
        let mut found = PolygonIndex::new(self.lon_first);

        let Some(rect) = query.bounding_rect() else {
            return found;
        };
        let envelope = AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);

        for entry in self.tree.locate_in_envelope_intersecting(&envelope) {
            if entry.polygon.intersects(query) {
                found.push_entry(entry.clone());
            }
        }

        found
    }

    /// Move every entry of `other` into `self`, skipping known ids.
    pub fn merge(&mut self, other: PolygonIndex) {
        for entry in other.tree.iter() {
            self.push_entry(entry.clone());
        }
    }
}

impl std::fmt::Debug for PolygonIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolygonIndex")
            .field("len", &self.len())
            .field("lon_first", &self.lon_first)
            .finish()
    }
}

impl Default for PolygonIndex {
    fn default() -> Self {
        Self::new(true)
    }
}
