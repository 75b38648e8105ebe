//! Pure geometry computations behind the index.
//!
//! Nothing in this module touches storage:
//! - `covering`: geohash cells covering a bounding box at a given length
//! - `resolution`: the terminal trie level for an item's bounding box
//! - `validation`: coordinate, box and ring checks

pub mod covering;
pub mod resolution;
pub mod validation;
