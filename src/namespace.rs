//! Namespace names for index keyspaces.
//!
//! Every index instance writes into its own keyspace, derived from a
//! namespace name and the trie's level range. Table names are formed as
//! `{keyspace}{TABLE_SEPARATOR}{table}`, so a namespace name must never
//! contain the separator.

use crate::error::{GeoTrieError, Result};

/// Separator between a keyspace and a table name.
pub const TABLE_SEPARATOR: &str = ".";

/// Namespace used when the builder is not given one.
pub const DEFAULT_NAMESPACE: &str = "geotrie";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceName(String);

impl NamespaceName {
    /// Parses and validates a string as a namespace name.
    ///
    /// # Errors
    ///
    /// Returns `GeoTrieError::InvalidInput` if the name is empty, contains
    /// the table separator or a null byte, or exceeds 255 characters.
    pub fn parse<S: Into<String>>(name: S) -> Result<Self> {
        let name = name.into();

        if name.is_empty() {
            return Err(GeoTrieError::InvalidInput(
                "Namespace name cannot be empty".into(),
            ));
        }

        if name.contains(TABLE_SEPARATOR) {
            return Err(GeoTrieError::InvalidInput(format!(
                "Namespace name '{}' cannot contain separator '{}'",
                name, TABLE_SEPARATOR
            )));
        }

        if name.contains('\0') {
            return Err(GeoTrieError::InvalidInput(
                "Namespace name cannot contain null bytes".into(),
            ));
        }

        if name.len() > 255 {
            return Err(GeoTrieError::InvalidInput(
                "Namespace name cannot exceed 255 characters".into(),
            ));
        }

        Ok(Self(name))
    }

    /// Returns a reference to the inner string of the namespace name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NamespaceName {
    fn default() -> Self {
        Self(DEFAULT_NAMESPACE.to_string())
    }
}

impl From<NamespaceName> for String {
    fn from(name: NamespaceName) -> Self {
        name.0
    }
}

impl std::fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
