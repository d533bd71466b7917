//! Validated table identifiers

use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{DataStorageError, DataStorageResult};

/// Identifiers allowed to be interpolated into SQL text
pub const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

/// Prefix `SQLite` keeps for its own objects, matched case-insensitively
pub const RESERVED_PREFIX: &str = "sqlite_";

/// Compiled [`IDENTIFIER_PATTERN`]
static IDENTIFIER_REGEX: OnceLock<Regex> = OnceLock::new();

fn identifier_regex() -> DataStorageResult<&'static Regex> {
    if let Some(pattern) = IDENTIFIER_REGEX.get() {
        return Ok(pattern);
    }
    let pattern = Regex::new(IDENTIFIER_PATTERN).map_err(|e| {
        DataStorageError::configuration(format!("Invalid identifier pattern: {e}"))
    })?;
    Ok(IDENTIFIER_REGEX.get_or_init(|| pattern))
}

/// Name of a per-file table, checked against [`IDENTIFIER_PATTERN`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    /// Validate `name` as a table identifier
    ///
    /// # Errors
    ///
    /// Returns error if `name` is not a plain SQL identifier or uses the
    /// reserved `sqlite_` prefix
    pub fn new(name: impl Into<String>) -> DataStorageResult<Self> {
        let name = name.into();

        if !identifier_regex()?.is_match(&name) {
            return Err(DataStorageError::invalid_identifier(
                name,
                "expected letters, digits and underscores, not starting with a digit",
            ));
        }
        if name.to_ascii_lowercase().starts_with(RESERVED_PREFIX) {
            return Err(DataStorageError::invalid_identifier(
                name,
                "prefix is reserved for SQLite internal objects",
            ));
        }
        Ok(Self(name))
    }

    /// Key under which `SQLite` resolves this name; identifiers are matched
    /// without regard to ASCII case
    #[must_use]
    pub fn storage_key(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// Derive the table name for a log file
    ///
    /// Base name without its extension, hyphens removed: `logs/access-short.log`
    /// becomes `accessshort`. The same file always maps to the same table.
    ///
    /// # Errors
    ///
    /// Returns error if the path has no usable base name or the derived name
    /// is not a plain SQL identifier
    pub fn from_path(path: &Path) -> DataStorageResult<Self> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                DataStorageError::invalid_identifier(
                    path.display().to_string(),
                    "path has no UTF-8 base name",
                )
            })?;

        Self::new(stem.replace('-', ""))
    }

    /// Raw identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifier quoted for SQL text
    #[must_use]
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::PathBuf;

    #[test]
    fn test_from_path_strips_extension_and_hyphens() -> DataStorageResult<()> {
        let table = TableName::from_path(Path::new("logs/access-short.log"))?;
        assert_eq!(table.as_str(), "accessshort");
        assert_eq!(table.quoted(), "\"accessshort\"");

        let table = TableName::from_path(Path::new("/var/log/nginx/access_log"))?;
        assert_eq!(table.as_str(), "access_log");
        Ok(())
    }

    #[test]
    fn test_unsafe_names_rejected() {
        for candidate in [
            "access.2020",
            "drop table x",
            "x\"; DROP TABLE y; --",
            "1access",
            "",
        ] {
            assert!(
                matches!(
                    TableName::new(candidate),
                    Err(DataStorageError::InvalidIdentifier { .. })
                ),
                "accepted {candidate:?}"
            );
        }
    }

    #[test]
    fn test_reserved_prefix_rejected() {
        for candidate in ["sqlite_master", "SQLite_stat1", "sqlite_foo"] {
            assert!(
                matches!(
                    TableName::new(candidate),
                    Err(DataStorageError::InvalidIdentifier { .. })
                ),
                "accepted {candidate:?}"
            );
        }
        assert!(matches!(
            TableName::from_path(Path::new("logs/sqlite_foo.log")),
            Err(DataStorageError::InvalidIdentifier { .. })
        ));
        // only the exact prefix is reserved
        assert!(TableName::new("sqlitefoo").is_ok());
    }

    #[test]
    fn test_storage_key_folds_case() -> DataStorageResult<()> {
        let upper = TableName::from_path(Path::new("logs/Access.log"))?;
        let lower = TableName::from_path(Path::new("logs/access.log"))?;
        assert_ne!(upper, lower);
        assert_eq!(upper.storage_key(), lower.storage_key());
        Ok(())
    }

    #[test]
    fn test_path_without_stem_rejected() {
        assert!(TableName::from_path(Path::new("/")).is_err());
    }

    proptest! {
        #[test]
        fn prop_derivation_is_deterministic(stem in "[a-z][a-z0-9_-]{0,16}", ext in "[a-z]{1,4}") {
            let path = PathBuf::from(format!("logs/{stem}.{ext}"));
            let first = TableName::from_path(&path).expect("valid stem");
            let second = TableName::from_path(&path).expect("valid stem");
            prop_assert_eq!(&first, &second);
            prop_assert!(!first.as_str().contains('-'));
        }
    }
}
