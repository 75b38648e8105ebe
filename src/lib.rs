//! Adaptive multi-resolution geohash index over a partitioned key-value store.
//!
//! Each inserted item is indexed at a cell length chosen from the size of its
//! bounding box, with parent-to-child links written from the root level down
//! so queries can refine level by level. Candidates found in the trie are
//! checked against the query polygons exactly before being returned.
//!
//! ```rust
//! use geotrie::{IndexBuilder, Item};
//! use serde_json::json;
//!
//! let index = IndexBuilder::new().hash_min(2).depth(3).delta(1.5).build()?;
//!
//! for (name, min, max) in [("a", 0.0, 1.0), ("b", 0.2, 0.4), ("c", 30.0, 31.0)] {
//!     let item = Item::from_value(json!({
//!         "file": name,
//!         "polygon": [[min, min], [min, max], [max, max], [max, min]]
//!     }))?;
//!     index.insert(&item, true)?;
//! }
//!
//! let query = [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)];
//! let found = index.query(&[query], true, 100)?;
//! assert_eq!(found.len(), 2);
//! # Ok::<(), geotrie::GeoTrieError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod error;
pub mod index;
pub mod item;
pub mod namespace;
pub mod polygon;
pub mod schema;
pub mod storage;
pub mod trie;

pub use builder::IndexBuilder;
pub use config::IndexConfig;
pub use error::{GeoTrieError, Result};
pub use index::{GeoTrieIndex, InsertOutcome, QueryStats};
pub use item::Item;
pub use namespace::NamespaceName;
pub use polygon::{PolygonEntry, PolygonIndex};
pub use schema::Schema;
pub use storage::{KvStore, MemoryStore, StoreStats, TableDump};

pub use geotrie_types::bbox::BoundingBox;
pub use geotrie_types::cell::{CellCode, ContentId, TrieValue};

/// Index backed by the in-process store.
pub type MemoryIndex = GeoTrieIndex<MemoryStore>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{GeoTrieError, GeoTrieIndex, IndexBuilder, IndexConfig, Item, Result};

    pub use crate::{KvStore, MemoryStore, PolygonIndex};

    pub use crate::{BoundingBox, CellCode, ContentId};

    pub use geo::Polygon;
}
