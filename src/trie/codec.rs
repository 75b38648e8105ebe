//! String encoding of trie values.

use crate::config::IndexConfig;
use crate::error::{GeoTrieError, Result};
use geotrie_types::cell::{CellCode, ContentId, TrieValue};

/// Decodes raw level-table values into [`TrieValue`]s.
///
/// A value whose length equals `content_id_len` is a leaf, anything else is
/// an edge. `IndexConfig::validate` guarantees the two never overlap.
#[derive(Debug, Clone, Copy)]
pub struct TrieCodec {
    content_id_len: usize,
}

impl TrieCodec {
    pub fn new(content_id_len: usize) -> Self {
        Self { content_id_len }
    }

    pub fn from_config(config: &IndexConfig) -> Self {
        Self::new(config.content_id_len)
    }

    pub fn content_id_len(&self) -> usize {
        self.content_id_len
    }

    pub fn encode<'a>(&self, value: &'a TrieValue) -> &'a str {
        value.wire()
    }

    /// Decode a stored value.
    ///
    /// # Errors
    ///
    /// `CorruptEntry` if the value is neither a valid content id of the
    /// configured length nor a valid cell code.
    pub fn decode(&self, raw: &str) -> Result<TrieValue> {
        let corrupt = |e: geotrie_types::cell::InvalidValue| {
            GeoTrieError::CorruptEntry(format!("trie value '{}': {}", raw, e))
        };

        if raw.len() == self.content_id_len {
            ContentId::parse(raw).map(TrieValue::Leaf).map_err(corrupt)
        } else {
            CellCode::parse(raw).map(TrieValue::Edge).map_err(corrupt)
        }
    }
}
