//! Geohash coverings of bounding boxes.
//!
//! A covering of a box at length `L` is the set of length-`L` cells whose
//! rectangles together contain the box. Cells are found by walking a grid
//! over the box spaced one cell apart in each dimension and encoding every
//! grid point, so no cell column or row between the box edges can be
//! skipped.
//!
//! ```text
//!   lon_min                lon_max
//!     +------+------+------+--+   lat_max  (last row clamped to the edge)
//!     |  *   |  *   |  *   | *|
//!     +------+------+------+--+
//!     |  *   |  *   |  *   | *|
//!     +------+------+------+--+   lat_min
//! ```

use crate::compute::validation::{validate_bbox, validate_lat_lon};
use crate::error::{GeoTrieError, Result};
use geotrie_types::bbox::BoundingBox;
use geotrie_types::cell::{CellCode, MAX_CELL_LEN};
use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

/// Deduplicated set of cells of a single length.
pub type Covering = FxHashSet<CellCode>;

/// Coverings larger than this are logged; they usually mean a large box is
/// being covered at a fine level.
const LARGE_COVERING: usize = 100_000;

/// Angular size of a cell, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSize {
    pub lat: f64,
    pub lon: f64,
}

/// Cell sizes indexed by code length. Geohash interleaves bits starting with
/// longitude, so longitude gets the extra bit on odd bit counts.
static CELL_SIZES: Lazy<[CellSize; MAX_CELL_LEN + 1]> = Lazy::new(|| {
    let mut sizes = [CellSize {
        lat: 180.0,
        lon: 360.0,
    }; MAX_CELL_LEN + 1];

    for (len, size) in sizes.iter_mut().enumerate().skip(1) {
        let bits = 5 * len as i32;
        let lon_bits = (bits + 1) / 2;
        let lat_bits = bits / 2;
        *size = CellSize {
            lat: 180.0 / 2f64.powi(lat_bits),
            lon: 360.0 / 2f64.powi(lon_bits),
        };
    }

    sizes
});

fn check_len(len: usize) -> Result<()> {
    if len == 0 || len > MAX_CELL_LEN {
        return Err(GeoTrieError::InvalidGeohash(format!(
            "cell length must be in 1..={}, got {}",
            MAX_CELL_LEN, len
        )));
    }
    Ok(())
}

/// Angular size of cells of length `len`, from the precomputed table.
///
/// # Examples
///
/// ```
/// use geotrie::compute::covering::cell_size;
///
/// let size = cell_size(1).unwrap();
/// assert_eq!(size.lat, 45.0);
/// assert_eq!(size.lon, 45.0);
/// ```
pub fn cell_size(len: usize) -> Result<CellSize> {
    check_len(len)?;
    Ok(CELL_SIZES[len])
}

/// Rectangle of a single cell.
pub fn cell_bbox(cell: &CellCode) -> Result<BoundingBox> {
    let rect = geohash::decode_bbox(cell.as_str())?;
    Ok(BoundingBox::from_rect(rect))
}

/// Distance by which points on the north or east edge of the world are moved
/// inside it. Far below the size of a length-12 cell.
const EDGE_NUDGE: f64 = 1e-9;

fn nudge_lat(lat: f64) -> f64 {
    if lat >= 90.0 { 90.0 - EDGE_NUDGE } else { lat }
}

fn nudge_lon(lon: f64) -> f64 {
    if lon >= 180.0 { 180.0 - EDGE_NUDGE } else { lon }
}

/// Encode a coordinate to the cell of length `len` containing it.
///
/// Latitude 90 and longitude 180 are encoded as the top/right-most cells
/// rather than wrapping around to the opposite edge.
pub fn encode(lat: f64, lon: f64, len: usize) -> Result<CellCode> {
    validate_lat_lon(lat, lon)?;
    let lat = nudge_lat(lat);
    let lon = nudge_lon(lon);
    let code = geohash::encode(geohash::Coord { x: lon, y: lat }, len)?;
    Ok(CellCode::parse(code)?)
}

/// Size of the cell of length `len` at the box's lower-left corner.
fn reference_cell_size(bbox: &BoundingBox, len: usize) -> Result<CellSize> {
    let reference = encode(bbox.lat_min, bbox.lon_min, len)?;
    let (_, lon_err, lat_err) = geohash::decode(reference.as_str())?;
    Ok(CellSize {
        lat: 2.0 * lat_err,
        lon: 2.0 * lon_err,
    })
}

/// Number of steps needed to reach `extent`, the upper bound included.
fn steps(extent: f64, step: f64) -> usize {
    (extent / step).ceil() as usize
}

/// The `i`-th grid coordinate, clamped so the last one lands on `max`.
fn grid_point(min: f64, max: f64, step: f64, i: usize) -> f64 {
    (min + i as f64 * step).min(max)
}

/// Cells of length `len` covering `bbox`.
///
/// The union of the returned cell rectangles always contains the box.
///
/// # Examples
///
/// ```
/// use geotrie::compute::covering::cover;
/// use geotrie_types::bbox::BoundingBox;
///
/// // A single point is covered by exactly one cell
/// let point = BoundingBox::new(40.7128, -74.0060, 40.7128, -74.0060);
/// let cells = cover(&point, 7).unwrap();
/// assert_eq!(cells.len(), 1);
/// ```
pub fn cover(bbox: &BoundingBox, len: usize) -> Result<Covering> {
    check_len(len)?;
    validate_bbox(bbox)?;

    let step = reference_cell_size(bbox, len)?;
    let lat_steps = steps(bbox.lat_extent(), step.lat);
    let lon_steps = steps(bbox.lon_extent(), step.lon);

    let points = (lat_steps + 1).saturating_mul(lon_steps + 1);
    if points > LARGE_COVERING {
        log::warn!(
            "Covering box {:?} at length {} walks {} grid points",
            bbox,
            len,
            points
        );
    }

    let mut cells = Covering::default();
    for i in 0..=lat_steps {
        let lat = grid_point(bbox.lat_min, bbox.lat_max, step.lat, i);
        for j in 0..=lon_steps {
            let lon = grid_point(bbox.lon_min, bbox.lon_max, step.lon, j);
            cells.insert(encode(lat, lon, len)?);
        }
    }

    Ok(cells)
}

/// True if `cell` belongs to the covering of `bbox` at the cell's length.
///
/// Cells are half-open (`[min, max)` on both axes) and the box is closed,
/// with the same north/east edge handling as [`encode`]. This answers
/// `cover(bbox, cell.len()).contains(cell)` without building the covering.
pub fn cell_overlaps(cell: &CellCode, bbox: &BoundingBox) -> Result<bool> {
    let rect = cell_bbox(cell)?;
    Ok(rect.lat_min <= nudge_lat(bbox.lat_max)
        && rect.lat_max > nudge_lat(bbox.lat_min)
        && rect.lon_min <= nudge_lon(bbox.lon_max)
        && rect.lon_max > nudge_lon(bbox.lon_min))
}

/// Union of the coverings of several boxes at the same length.
pub fn cover_many<'a, I>(bboxes: I, len: usize) -> Result<Covering>
where
    I: IntoIterator<Item = &'a BoundingBox>,
{
    let mut cells = Covering::default();
    for bbox in bboxes {
        cells.extend(cover(bbox, len)?);
    }
    Ok(cells)
}
