use serde::{Deserialize, Serialize};
use std::fmt;

/// Geohash base32 alphabet.
pub const GEOHASH_ALPHABET: &str = "0123456789bcdefghjkmnpqrstuvwxyz";

/// Longest geohash the encoder supports.
pub const MAX_CELL_LEN: usize = 12;

/// Rejected cell code or content id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidValue(pub String);

impl fmt::Display for InvalidValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvalidValue {}

/// A geohash cell code.
///
/// The length of the code is the cell's level in the trie; longer codes
/// denote smaller cells and a cell's parent is its code minus the last
/// character.
///
/// # Examples
///
/// ```
/// use geotrie_types::cell::CellCode;
///
/// let cell = CellCode::parse("s00").unwrap();
/// assert_eq!(cell.len(), 3);
/// assert!(CellCode::parse("s0a").is_err()); // 'a' is not in the alphabet
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellCode(String);

impl CellCode {
    /// Parse and validate a geohash string.
    pub fn parse<S: Into<String>>(code: S) -> Result<Self, InvalidValue> {
        let code = code.into();

        if code.is_empty() || code.len() > MAX_CELL_LEN {
            return Err(InvalidValue(format!(
                "cell code '{}' must be 1..={} characters",
                code, MAX_CELL_LEN
            )));
        }

        if let Some(bad) = code.chars().find(|c| !GEOHASH_ALPHABET.contains(*c)) {
            return Err(InvalidValue(format!(
                "cell code '{}' contains invalid character '{}'",
                code, bad
            )));
        }

        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Level of the cell, i.e. its code length.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The enclosing cell one level up, or `None` for a length-1 cell.
    pub fn parent(&self) -> Option<CellCode> {
        if self.0.len() <= 1 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_string()))
    }
}

impl fmt::Display for CellCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CellCode {
    type Error = InvalidValue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CellCode> for String {
    fn from(cell: CellCode) -> Self {
        cell.0
    }
}

/// Fixed-length lowercase hex digest identifying an item's content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(String);

impl ContentId {
    /// Parse and validate a hex digest.
    pub fn parse<S: Into<String>>(id: S) -> Result<Self, InvalidValue> {
        let id = id.into();

        if id.is_empty() {
            return Err(InvalidValue("content id cannot be empty".into()));
        }

        if !id.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')) {
            return Err(InvalidValue(format!(
                "content id '{}' is not lowercase hex",
                id
            )));
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContentId {
    type Error = InvalidValue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ContentId> for String {
    fn from(id: ContentId) -> Self {
        id.0
    }
}

/// A value stored under a cell in a level table.
///
/// On the wire both variants are plain strings; the reader tells them apart
/// by length, which is why content ids must never share a length with a
/// cell level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrieValue {
    /// Link to a child cell one level deeper.
    Edge(CellCode),
    /// Terminal pointer to the content of an indexed item.
    Leaf(ContentId),
}

impl TrieValue {
    /// String form written to the backing store.
    pub fn wire(&self) -> &str {
        match self {
            TrieValue::Edge(cell) => cell.as_str(),
            TrieValue::Leaf(id) => id.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_parse_rejects_bad_input() {
        assert!(CellCode::parse("").is_err());
        assert!(CellCode::parse("0123456789bcd").is_err()); // 13 chars
        assert!(CellCode::parse("abc").is_err()); // 'a' excluded
        assert!(CellCode::parse("S00").is_err()); // uppercase
        assert!(CellCode::parse("s00twy01mt").is_ok());
    }

    #[test]
    fn test_cell_parent() {
        let cell = CellCode::parse("u4pr").unwrap();
        let parent = cell.parent().unwrap();
        assert_eq!(parent.as_str(), "u4p");
        assert_eq!(parent.parent().unwrap().as_str(), "u4");
        assert!(CellCode::parse("u").unwrap().parent().is_none());
    }

    #[test]
    fn test_content_id_parse() {
        assert!(ContentId::parse("deadbeef").is_ok());
        assert!(ContentId::parse("DEADBEEF").is_err());
        assert!(ContentId::parse("xyz").is_err());
        assert!(ContentId::parse("").is_err());
    }

    #[test]
    fn test_trie_value_wire() {
        let edge = TrieValue::Edge(CellCode::parse("s0").unwrap());
        let leaf = TrieValue::Leaf(ContentId::parse("ab12").unwrap());
        assert_eq!(edge.wire(), "s0");
        assert_eq!(leaf.wire(), "ab12");
    }

    #[test]
    fn test_try_from_string_validates() {
        assert!(CellCode::try_from("s0".to_string()).is_ok());
        assert!(CellCode::try_from("s0!".to_string()).is_err());
        assert!(ContentId::try_from("00ff".to_string()).is_ok());
    }
}
