//! Per-item resolution selection.
//!
//! An item is indexed at the coarsest level whose cells are no more than
//! `delta` times larger than the item's box, capped at `hash_max`. Small
//! items end up deep in the trie with few cells each; large items stop early
//! and avoid fanning out over thousands of fine cells.

use crate::compute::covering::{Covering, cell_size, cover};
use crate::config::IndexConfig;
use crate::error::Result;
use geotrie_types::bbox::BoundingBox;

/// Terminal level chosen for a box, with the box's covering at that level.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub length: usize,
    pub covering: Covering,
}

fn ratio(cell: f64, extent: f64) -> f64 {
    if extent > 0.0 {
        cell / extent
    } else {
        f64::INFINITY
    }
}

/// How many times larger a length-`len` cell is than `bbox`, taking the
/// worse of the two dimensions. Zero extents yield infinity.
pub fn refinement_ratio(bbox: &BoundingBox, len: usize) -> Result<f64> {
    let size = cell_size(len)?;
    Ok(ratio(size.lat, bbox.lat_extent()).max(ratio(size.lon, bbox.lon_extent())))
}

/// Terminal level for `bbox`, in `hash_min..=hash_max`.
///
/// # Examples
///
/// ```
/// use geotrie::compute::resolution::terminal_length;
/// use geotrie::IndexConfig;
/// use geotrie_types::bbox::BoundingBox;
///
/// let config = IndexConfig::default().with_hash_min(2).with_depth(3);
///
/// // A 10-degree box is coarse enough for the root level
/// let large = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
/// assert_eq!(terminal_length(&large, &config).unwrap(), 2);
///
/// // A point refines all the way down
/// let point = BoundingBox::new(1.0, 1.0, 1.0, 1.0);
/// assert_eq!(terminal_length(&point, &config).unwrap(), 5);
/// ```
pub fn terminal_length(bbox: &BoundingBox, config: &IndexConfig) -> Result<usize> {
    let hash_max = config.hash_max();
    let mut length = config.hash_min;

    while length < hash_max && refinement_ratio(bbox, length)? > config.delta {
        length += 1;
    }

    Ok(length)
}

/// Terminal level for `bbox` and its covering at that level.
pub fn select_resolution(bbox: &BoundingBox, config: &IndexConfig) -> Result<Resolution> {
    let length = terminal_length(bbox, config)?;
    let covering = cover(bbox, length)?;

    log::trace!(
        "Resolution for {:?}: length {} with {} cells",
        bbox,
        length,
        covering.len()
    );

    Ok(Resolution { length, covering })
}
