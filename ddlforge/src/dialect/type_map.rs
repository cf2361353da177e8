//! Abstract-to-native type mapping tables
//!
//! One [`TypeMapping`] exists per dialect. The table is total over
//! [`SqlType`]: construction fails with a configuration error when an entry
//! is missing, so lookups never fail at render time.

use crate::error::{Error, Result};
use crate::model::SqlType;

/// One row of a dialect's type table
#[derive(Debug, Clone)]
pub struct TypeEntry {
    /// Native type name the dialect stores this abstract type as
    pub native: &'static str,
    /// Size spec applied when the column declares none
    pub default_size: Option<&'static str>,
    /// Whether the rendered type must always carry a size spec
    pub size_required: bool,
    /// The abstract type the engine reports back for a column stored under
    /// this type; used to detect round-trip-safe type changes
    pub round_trip: SqlType,
    /// Whether a nullable column of this type needs an explicit NULL default
    pub null_default: bool,
}

impl TypeEntry {
    /// Entry for a type the engine stores and reports back unchanged
    pub fn native(native: &'static str, round_trip: SqlType) -> Self {
        Self {
            native,
            default_size: None,
            size_required: false,
            round_trip,
            null_default: false,
        }
    }

    /// Require a size spec, using the given default when the column has none
    pub fn sized(mut self, default_size: &'static str) -> Self {
        self.default_size = Some(default_size);
        self.size_required = true;
        self
    }

    /// Mark the type as needing an explicit NULL default when nullable
    pub fn null_default(mut self) -> Self {
        self.null_default = true;
        self
    }
}

/// Total mapping from abstract types to native types for one dialect
#[derive(Debug, Clone)]
pub struct TypeMapping {
    dialect: &'static str,
    entries: Vec<TypeEntry>,
}

impl TypeMapping {
    /// Build a mapping from a type table, validating totality over the
    /// abstract type enumeration.
    pub fn new(dialect: &'static str, table: Vec<(SqlType, TypeEntry)>) -> Result<Self> {
        let mut slots: Vec<Option<TypeEntry>> = vec![None; SqlType::ALL.len()];
        for (sql_type, entry) in table {
            if slots[sql_type.index()].replace(entry).is_some() {
                return Err(Error::ConfigError(format!(
                    "duplicate type mapping for {} on dialect '{}'",
                    sql_type, dialect
                )));
            }
        }

        let missing: Vec<&str> = SqlType::ALL
            .iter()
            .filter(|t| slots[t.index()].is_none())
            .map(|t| t.name())
            .collect();
        if !missing.is_empty() {
            return Err(Error::ConfigError(format!(
                "dialect '{}' has no type mapping for: {}",
                dialect,
                missing.join(", ")
            )));
        }

        let entries = slots.into_iter().flatten().collect();
        Ok(Self { dialect, entries })
    }

    /// The dialect this mapping belongs to
    pub fn dialect(&self) -> &'static str {
        self.dialect
    }

    fn entry(&self, sql_type: SqlType) -> &TypeEntry {
        &self.entries[sql_type.index()]
    }

    /// The native type name for an abstract type
    pub fn native_type(&self, sql_type: SqlType) -> &'static str {
        self.entry(sql_type).native
    }

    /// The size applied when a column of this type declares none
    pub fn default_size(&self, sql_type: SqlType) -> Option<&'static str> {
        self.entry(sql_type).default_size
    }

    /// Whether the rendered type must carry a size spec
    pub fn requires_size(&self, sql_type: SqlType) -> bool {
        self.entry(sql_type).size_required
    }

    /// The abstract type the engine reports back after storing a column of
    /// the given abstract type
    pub fn round_trip(&self, sql_type: SqlType) -> SqlType {
        self.entry(sql_type).round_trip
    }

    /// Whether a nullable column of this type needs an explicit NULL default
    pub fn has_null_default(&self, sql_type: SqlType) -> bool {
        self.entry(sql_type).null_default
    }

    /// The size a column effectively gets on this dialect.
    ///
    /// A missing, empty or zero size means "unspecified" and resolves to the
    /// default size of the column's round-trip type.
    pub fn effective_size(&self, column: &crate::model::Column) -> Option<String> {
        match column.size.as_deref().map(str::trim) {
            None | Some("") | Some("0") => self
                .default_size(self.round_trip(column.sql_type))
                .map(str::to_string),
            Some(size) => Some(size.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::profiles;
    use rstest::rstest;

    #[test]
    fn test_partial_table_is_a_configuration_error() {
        let err = TypeMapping::new(
            "partial",
            vec![(
                SqlType::Integer,
                TypeEntry::native("INTEGER", SqlType::Integer),
            )],
        )
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("partial"));
        assert!(message.contains("VARCHAR"));
    }

    #[test]
    fn test_duplicate_entry_is_a_configuration_error() {
        let err = TypeMapping::new(
            "dup",
            vec![
                (
                    SqlType::Integer,
                    TypeEntry::native("INTEGER", SqlType::Integer),
                ),
                (SqlType::Integer, TypeEntry::native("INT", SqlType::Integer)),
            ],
        )
        .unwrap_err();

        assert!(err.to_string().contains("duplicate type mapping"));
    }

    #[rstest]
    #[case(profiles::hsqldb_types())]
    #[case(profiles::mysql_types())]
    #[case(profiles::postgresql_types())]
    #[case(profiles::oracle_types())]
    #[case(profiles::mssql_types())]
    fn test_builtin_tables_are_total(#[case] mapping: Result<TypeMapping>) {
        let mapping = mapping.expect("builtin type table must be total");
        for sql_type in SqlType::ALL {
            assert!(!mapping.native_type(sql_type).is_empty());
        }
    }

    #[test]
    fn test_hsqldb_round_trips() {
        let mapping = profiles::hsqldb_types().unwrap();
        assert_eq!(mapping.round_trip(SqlType::TinyInt), SqlType::SmallInt);
        assert_eq!(mapping.round_trip(SqlType::SmallInt), SqlType::SmallInt);
        assert_eq!(mapping.round_trip(SqlType::Bit), SqlType::Boolean);
        assert_eq!(mapping.round_trip(SqlType::Varchar), SqlType::Varchar);
    }

    #[test]
    fn test_default_sizes() {
        let mapping = profiles::hsqldb_types().unwrap();
        assert_eq!(mapping.default_size(SqlType::Varchar), Some("254"));
        assert!(mapping.requires_size(SqlType::Varchar));
        assert!(!mapping.requires_size(SqlType::Integer));
    }
}
