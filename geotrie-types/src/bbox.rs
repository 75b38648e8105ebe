use geo::Rect;
use serde::{Deserialize, Serialize};

/// An axis-aligned geographic bounding box.
///
/// Stored in `(lat_min, lon_min, lat_max, lon_max)` order, which is the order
/// the index reasons in. Conversion from `geo::Rect` reads `x` as
/// longitude and `y` as latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lon_min: f64,
    pub lat_max: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    /// Create a new bounding box. Bounds are reordered if given swapped.
    ///
    /// # Examples
    ///
    /// ```
    /// use geotrie_types::bbox::BoundingBox;
    ///
    /// let bbox = BoundingBox::new(1.0, 2.0, 0.0, 0.0);
    /// assert_eq!(bbox.lat_min, 0.0);
    /// assert_eq!(bbox.lon_max, 2.0);
    /// ```
    pub fn new(lat_min: f64, lon_min: f64, lat_max: f64, lon_max: f64) -> Self {
        Self {
            lat_min: lat_min.min(lat_max),
            lon_min: lon_min.min(lon_max),
            lat_max: lat_min.max(lat_max),
            lon_max: lon_min.max(lon_max),
        }
    }

    /// Create a bounding box from a `geo::Rect` (`x` = lon, `y` = lat).
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.min().y, rect.min().x, rect.max().y, rect.max().x)
    }

    /// Angular height of the box in degrees.
    pub fn lat_extent(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// Angular width of the box in degrees.
    pub fn lon_extent(&self) -> f64 {
        self.lon_max - self.lon_min
    }
}
