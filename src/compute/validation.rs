//! Validation for geographic coordinates, boxes and rings.

use crate::error::{GeoTrieError, Result};
use geotrie_types::bbox::BoundingBox;

/// Smallest number of vertices a ring needs to enclose an area.
pub const MIN_RING_LEN: usize = 3;

/// Validates a latitude/longitude pair.
///
/// Longitude: [-180.0, 180.0], Latitude: [-90.0, 90.0]
///
/// # Examples
///
/// ```
/// use geotrie::compute::validation::validate_lat_lon;
///
/// assert!(validate_lat_lon(40.7128, -74.0060).is_ok());
/// assert!(validate_lat_lon(95.0, -74.0).is_err());
/// assert!(validate_lat_lon(40.0, 200.0).is_err());
/// ```
pub fn validate_lat_lon(lat: f64, lon: f64) -> Result<()> {
    if !lon.is_finite() {
        return Err(GeoTrieError::InvalidInput(format!(
            "Longitude must be finite, got: {}",
            lon
        )));
    }

    if !lat.is_finite() {
        return Err(GeoTrieError::InvalidInput(format!(
            "Latitude must be finite, got: {}",
            lat
        )));
    }

    if !(-180.0..=180.0).contains(&lon) {
        return Err(GeoTrieError::InvalidInput(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            lon
        )));
    }

    if !(-90.0..=90.0).contains(&lat) {
        return Err(GeoTrieError::InvalidInput(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            lat
        )));
    }

    Ok(())
}

/// Validates both corners of a bounding box.
pub fn validate_bbox(bbox: &BoundingBox) -> Result<()> {
    validate_lat_lon(bbox.lat_min, bbox.lon_min)
        .map_err(|e| GeoTrieError::InvalidInput(format!("Bounding box lower corner: {}", e)))?;
    validate_lat_lon(bbox.lat_max, bbox.lon_max)
        .map_err(|e| GeoTrieError::InvalidInput(format!("Bounding box upper corner: {}", e)))?;
    Ok(())
}

/// Validates a raw coordinate ring.
///
/// `lon_first` says whether pairs are `(lon, lat)` or `(lat, lon)`.
///
/// # Examples
///
/// ```
/// use geotrie::compute::validation::validate_ring;
///
/// let ring = [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)];
/// assert!(validate_ring(&ring, true).is_ok());
///
/// // Two vertices cannot enclose anything
/// assert!(validate_ring(&ring[..2], true).is_err());
/// ```
pub fn validate_ring(ring: &[(f64, f64)], lon_first: bool) -> Result<()> {
    if ring.len() < MIN_RING_LEN {
        return Err(GeoTrieError::InvalidInput(format!(
            "Ring needs at least {} vertices, got {}",
            MIN_RING_LEN,
            ring.len()
        )));
    }

    for (idx, &(a, b)) in ring.iter().enumerate() {
        let (lat, lon) = if lon_first { (b, a) } else { (a, b) };
        validate_lat_lon(lat, lon).map_err(|e| {
            GeoTrieError::InvalidInput(format!("Ring vertex at index {}: {}", idx, e))
        })?;
    }

    Ok(())
}
