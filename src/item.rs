//! Indexed items and their content ids.
//!
//! An item is a JSON object carrying a coordinate ring under `polygon`:
//!
//! ```json
//! { "file": "one", "polygon": [[0, 0], [0, 1], [1, 1], [1, 0]] }
//! ```
//!
//! Pairs are `(lon, lat)` or `(lat, lon)` depending on the caller's
//! `lon_first` flag; the item itself does not record which.

use crate::compute::validation::MIN_RING_LEN;
use crate::error::{GeoTrieError, Result};
use geo::{BoundingRect, LineString, Polygon};
use geotrie_types::bbox::BoundingBox;
use geotrie_types::cell::ContentId;
use serde_json::{Map, Value};
use sha2::{Digest, Sha512};

/// Field holding an item's coordinate ring.
pub const POLYGON_FIELD: &str = "polygon";

/// A polygon-bearing record. Immutable once built.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Item {
    fields: Map<String, Value>,
    ring: Vec<(f64, f64)>,
}

impl Item {
    /// Build an item from a JSON value.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the value is not an object, has no `polygon` field,
    /// or the ring is not at least three pairs of finite numbers.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(fields) = value else {
            return Err(GeoTrieError::InvalidInput(
                "Item must be a JSON object".into(),
            ));
        };

        let ring = fields
            .get(POLYGON_FIELD)
            .ok_or_else(|| {
                GeoTrieError::InvalidInput(format!("Item has no '{}' field", POLYGON_FIELD))
            })
            .and_then(parse_ring)?;

        Ok(Self { fields, ring })
    }

    /// Parse an item from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// The raw coordinate ring, in the caller's axis order.
    pub fn ring(&self) -> &[(f64, f64)] {
        &self.ring
    }

    /// Look up an application field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Compact JSON with keys in sorted order. Identical items always
    /// serialize to identical text.
    pub fn to_canonical_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.fields)?)
    }

    /// Content id: SHA-512 of the canonical JSON, hex encoded and cut to
    /// `len` characters.
    pub fn content_id(&self, len: usize) -> Result<ContentId> {
        content_digest(&self.to_canonical_json()?, len)
    }

    /// The ring as a `geo::Polygon` with `x` = lon and `y` = lat.
    pub fn polygon(&self, lon_first: bool) -> Polygon<f64> {
        ring_polygon(&self.ring, lon_first)
    }

    /// Bounding box of the ring.
    pub fn bbox(&self, lon_first: bool) -> Result<BoundingBox> {
        ring_bbox(&self.ring, lon_first)
    }
}

impl TryFrom<Value> for Item {
    type Error = GeoTrieError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl From<Item> for Value {
    fn from(item: Item) -> Self {
        Value::Object(item.fields)
    }
}

/// Hex SHA-512 digest of `canonical`, truncated to `len` characters.
pub fn content_digest(canonical: &str, len: usize) -> Result<ContentId> {
    let mut hasher = Sha512::new();
    hasher.update(canonical.as_bytes());
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(len);
    Ok(ContentId::parse(hex)?)
}

/// Read a `[[a, b], ...]` ring out of a JSON value.
pub fn parse_ring(value: &Value) -> Result<Vec<(f64, f64)>> {
    let invalid = |msg: String| GeoTrieError::InvalidInput(msg);

    let pairs = value
        .as_array()
        .ok_or_else(|| invalid("Ring must be an array of coordinate pairs".into()))?;

    if pairs.len() < MIN_RING_LEN {
        return Err(invalid(format!(
            "Ring needs at least {} vertices, got {}",
            MIN_RING_LEN,
            pairs.len()
        )));
    }

    pairs
        .iter()
        .enumerate()
        .map(|(idx, pair)| {
            let coords: Option<Vec<f64>> = pair
                .as_array()
                .and_then(|p| p.iter().map(Value::as_f64).collect());
            match coords.as_deref() {
                Some(&[a, b]) if a.is_finite() && b.is_finite() => Ok((a, b)),
                _ => Err(invalid(format!(
                    "Ring vertex at index {} is not a pair of finite numbers: {}",
                    idx, pair
                ))),
            }
        })
        .collect()
}

/// Normalize a raw ring into a polygon with `x` = lon and `y` = lat.
pub fn ring_polygon(ring: &[(f64, f64)], lon_first: bool) -> Polygon<f64> {
    let coords: Vec<(f64, f64)> = ring
        .iter()
        .map(|&(a, b)| if lon_first { (a, b) } else { (b, a) })
        .collect();
    Polygon::new(LineString::from(coords), vec![])
}

/// Bounding box of a raw ring.
pub fn ring_bbox(ring: &[(f64, f64)], lon_first: bool) -> Result<BoundingBox> {
    ring_polygon(ring, lon_first)
        .bounding_rect()
        .map(BoundingBox::from_rect)
        .ok_or_else(|| GeoTrieError::InvalidInput("Ring has no extent".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unit_item() -> Item {
        Item::from_value(json!({
            "file": "one",
            "polygon": [[0, 0], [0, 1], [1, 1], [1, 0]]
        }))
        .unwrap()
    }

    #[test]
    fn test_item_parsing() {
        let item = unit_item();
        assert_eq!(item.ring().len(), 4);
        assert_eq!(item.get("file"), Some(&json!("one")));
    }

    #[test]
    fn test_item_rejects_bad_shapes() {
        assert!(Item::from_value(json!([1, 2])).is_err());
        assert!(Item::from_value(json!({ "file": "x" })).is_err());
        assert!(Item::from_value(json!({ "polygon": [[0, 0], [1, 1]] })).is_err());
        assert!(Item::from_value(json!({ "polygon": [[0, 0], [1], [1, 1]] })).is_err());
        assert!(Item::from_value(json!({ "polygon": [[0, 0], [1, "a"], [1, 1]] })).is_err());
        assert!(Item::from_value(json!({ "polygon": "nope" })).is_err());
    }

    #[test]
    fn test_canonical_json_ignores_key_order() {
        let a = Item::from_json(r#"{"b": 1, "polygon": [[0,0],[0,1],[1,1]], "a": 2}"#).unwrap();
        let b = Item::from_json(r#"{"a": 2, "polygon": [[0,0],[0,1],[1,1]], "b": 1}"#).unwrap();
        assert_eq!(a.to_canonical_json().unwrap(), b.to_canonical_json().unwrap());
        assert_eq!(a.content_id(128).unwrap(), b.content_id(128).unwrap());
    }

    #[test]
    fn test_content_id_length_and_prefix() {
        let item = unit_item();
        let full = item.content_id(128).unwrap();
        let short = item.content_id(20).unwrap();
        assert_eq!(full.len(), 128);
        assert_eq!(short.len(), 20);
        assert!(full.as_str().starts_with(short.as_str()));
    }

    #[test]
    fn test_content_id_differs_by_content() {
        let other = Item::from_value(json!({
            "file": "two",
            "polygon": [[0, 0], [0, 1], [1, 1], [1, 0]]
        }))
        .unwrap();
        assert_ne!(
            unit_item().content_id(128).unwrap(),
            other.content_id(128).unwrap()
        );
    }

    #[test]
    fn test_known_digest() {
        // SHA-512 of the empty string.
        let id = content_digest("", 16).unwrap();
        assert_eq!(id.as_str(), "cf83e1357eefb8bd");
    }

    #[test]
    fn test_bbox_axis_order() {
        let item = Item::from_value(json!({
            "polygon": [[10, 50], [12, 50], [12, 51], [10, 51]]
        }))
        .unwrap();

        // (lon, lat) pairs
        let bbox = item.bbox(true).unwrap();
        assert_eq!(bbox, BoundingBox::new(50.0, 10.0, 51.0, 12.0));

        // (lat, lon) pairs
        let bbox = item.bbox(false).unwrap();
        assert_eq!(bbox, BoundingBox::new(10.0, 50.0, 12.0, 51.0));
    }

    #[test]
    fn test_serde_round_trip_validates() {
        let item = unit_item();
        let text = serde_json::to_string(&item).unwrap();
        let back: Item = serde_json::from_str(&text).unwrap();
        assert_eq!(back, item);

        assert!(serde_json::from_str::<Item>(r#"{"file": "x"}"#).is_err());
    }
}
