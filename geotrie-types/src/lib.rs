//! # geotrie-types
//!
//! Core value types shared by the geotrie index and its storage adapters.
//!
//! - **Bounding boxes**: `BoundingBox` in `(lat_min, lon_min, lat_max, lon_max)` order
//! - **Cells**: `CellCode`, a geohash string of a fixed length
//! - **Content ids**: `ContentId`, the fixed-length hex digest of an item
//! - **Trie values**: `TrieValue`, the tagged `Edge`/`Leaf` value stored in level tables
//!
//! All types are serializable with Serde and the bounding box can be built
//! from a `geo::Rect`.
//!
//! ## Examples
//!
//! ```rust
//! use geotrie_types::bbox::BoundingBox;
//! use geotrie_types::cell::CellCode;
//!
//! let bbox = BoundingBox::new(40.68, -74.05, 40.88, -73.90);
//! assert!(bbox.lat_extent() > 0.0);
//!
//! let cell = CellCode::parse("dr5r").unwrap();
//! assert_eq!(cell.parent().unwrap().as_str(), "dr5");
//! ```

pub mod bbox;
pub mod cell;
