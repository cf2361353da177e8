//! Type definitions for database schema objects
//!
//! The model is dialect-neutral: columns carry abstract type codes, and all
//! engine-specific rendering decisions are deferred to the SQL builder.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};
use crate::utils::naming::names_equal;

/// Abstract column types, covering the JDBC-style type lattice.
///
/// Every dialect maps each of these to a native type name; the mapping is
/// total and checked at platform construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SqlType {
    Bit,
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Float,
    Double,
    Numeric,
    Decimal,
    Char,
    Varchar,
    LongVarchar,
    Clob,
    Date,
    Time,
    Timestamp,
    Binary,
    Varbinary,
    LongVarbinary,
    Blob,
}

impl SqlType {
    /// All abstract types, in a fixed order used for table-driven mappings
    pub const ALL: [SqlType; 22] = [
        SqlType::Bit,
        SqlType::Boolean,
        SqlType::TinyInt,
        SqlType::SmallInt,
        SqlType::Integer,
        SqlType::BigInt,
        SqlType::Real,
        SqlType::Float,
        SqlType::Double,
        SqlType::Numeric,
        SqlType::Decimal,
        SqlType::Char,
        SqlType::Varchar,
        SqlType::LongVarchar,
        SqlType::Clob,
        SqlType::Date,
        SqlType::Time,
        SqlType::Timestamp,
        SqlType::Binary,
        SqlType::Varbinary,
        SqlType::LongVarbinary,
        SqlType::Blob,
    ];

    /// Position of this type within [`SqlType::ALL`]
    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|t| *t == self)
            .unwrap_or_default()
    }

    /// The upper-case type name, matching the serialized form
    pub fn name(self) -> &'static str {
        match self {
            SqlType::Bit => "BIT",
            SqlType::Boolean => "BOOLEAN",
            SqlType::TinyInt => "TINYINT",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Real => "REAL",
            SqlType::Float => "FLOAT",
            SqlType::Double => "DOUBLE",
            SqlType::Numeric => "NUMERIC",
            SqlType::Decimal => "DECIMAL",
            SqlType::Char => "CHAR",
            SqlType::Varchar => "VARCHAR",
            SqlType::LongVarchar => "LONGVARCHAR",
            SqlType::Clob => "CLOB",
            SqlType::Date => "DATE",
            SqlType::Time => "TIME",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Binary => "BINARY",
            SqlType::Varbinary => "VARBINARY",
            SqlType::LongVarbinary => "LONGVARBINARY",
            SqlType::Blob => "BLOB",
        }
    }

    /// Whether values of this type are character data
    pub fn is_text(self) -> bool {
        matches!(
            self,
            SqlType::Char | SqlType::Varchar | SqlType::LongVarchar | SqlType::Clob
        )
    }

    /// Whether values of this type are raw bytes
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            SqlType::Binary | SqlType::Varbinary | SqlType::LongVarbinary | SqlType::Blob
        )
    }

    /// Whether values of this type are numbers
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            SqlType::Bit
                | SqlType::Boolean
                | SqlType::TinyInt
                | SqlType::SmallInt
                | SqlType::Integer
                | SqlType::BigInt
                | SqlType::Real
                | SqlType::Float
                | SqlType::Double
                | SqlType::Numeric
                | SqlType::Decimal
        )
    }

    /// Whether this type carries an explicit precision/scale pair
    pub fn is_decimal(self) -> bool {
        matches!(self, SqlType::Numeric | SqlType::Decimal)
    }

    /// Whether values of this type are dates or times
    pub fn is_temporal(self) -> bool {
        matches!(self, SqlType::Date | SqlType::Time | SqlType::Timestamp)
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Represents a database column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub sql_type: SqlType,
    /// Size, kept as a string because some dialects encode a compound
    /// "precision,scale" in a single spec
    pub size: Option<String>,
    pub scale: Option<u32>,
    pub required: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    /// Default value in its string literal form; typed only at render time
    pub default: Option<String>,
}

impl Column {
    /// Create a new column with the given name and abstract type
    pub fn new(name: &str, sql_type: SqlType) -> Self {
        Self {
            name: name.to_string(),
            sql_type,
            size: None,
            scale: None,
            required: false,
            primary_key: false,
            auto_increment: false,
            default: None,
        }
    }

    /// Set the size spec; a compound "precision,scale" value also sets the scale
    pub fn size(mut self, size: &str) -> Self {
        match size.split_once(',') {
            Some((precision, scale)) => {
                self.size = Some(precision.trim().to_string());
                self.scale = scale.trim().parse().ok();
            }
            None => self.size = Some(size.to_string()),
        }
        self
    }

    /// Set the scale for decimal types
    pub fn scale(mut self, scale: u32) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Mark the column NOT NULL
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the column as part of the primary key
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark the column auto-incrementing
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Set a default value for the column
    pub fn default_value(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    /// A primary-key column is implicitly NOT NULL
    pub fn is_required(&self) -> bool {
        self.required || self.primary_key
    }

    /// The size as a number, when it parses as one
    pub fn size_as_int(&self) -> Option<u64> {
        self.size.as_deref().and_then(|s| s.trim().parse().ok())
    }
}

/// Represents an index (plain or unique)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub unique: bool,
    pub columns: Vec<String>,
}

impl Index {
    /// Create a new non-unique index
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            unique: false,
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Create a new unique index
    pub fn unique(name: &str, columns: &[&str]) -> Self {
        Self {
            unique: true,
            ..Self::new(name, columns)
        }
    }

    /// Whether two indexes cover the same columns with the same uniqueness,
    /// names ignored
    pub fn same_structure(&self, other: &Index, case_sensitive: bool) -> bool {
        self.unique == other.unique
            && self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .zip(&other.columns)
                .all(|(a, b)| names_equal(a, b, case_sensitive))
    }
}

/// A single local-to-foreign column pairing within a foreign key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub local: String,
    pub foreign: String,
}

impl Reference {
    pub fn new(local: &str, foreign: &str) -> Self {
        Self {
            local: local.to_string(),
            foreign: foreign.to_string(),
        }
    }
}

/// Represents a foreign key constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint name; when absent the builder derives one deterministically
    pub name: Option<String>,
    pub foreign_table: String,
    pub references: Vec<Reference>,
}

impl ForeignKey {
    /// Create a foreign key against the given table
    pub fn new(foreign_table: &str, references: Vec<Reference>) -> Self {
        Self {
            name: None,
            foreign_table: foreign_table.to_string(),
            references,
        }
    }

    /// Set an explicit constraint name
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// The local column names, in declaration order
    pub fn local_columns(&self) -> Vec<&str> {
        self.references.iter().map(|r| r.local.as_str()).collect()
    }

    /// Whether two foreign keys reference the same target through the same
    /// column pairs, names ignored
    pub fn same_structure(&self, other: &ForeignKey, case_sensitive: bool) -> bool {
        names_equal(&self.foreign_table, &other.foreign_table, case_sensitive)
            && self.references.len() == other.references.len()
            && self.references.iter().zip(&other.references).all(|(a, b)| {
                names_equal(&a.local, &b.local, case_sensitive)
                    && names_equal(&a.foreign, &b.foreign, case_sensitive)
            })
    }

    /// Whether the foreign key involves the given local column
    pub fn covers_column(&self, column: &str, case_sensitive: bool) -> bool {
        self.references
            .iter()
            .any(|r| names_equal(&r.local, column, case_sensitive))
    }
}

/// Represents a database table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub indexes: Vec<Index>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    /// Create a new table with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Add a column to the table
    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Builder-style variant of [`Table::add_column`]
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Add an index to the table
    pub fn add_index(&mut self, index: Index) {
        self.indexes.push(index);
    }

    /// Builder-style variant of [`Table::add_index`]
    pub fn with_index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Add a foreign key to the table
    pub fn add_foreign_key(&mut self, fk: ForeignKey) {
        self.foreign_keys.push(fk);
    }

    /// Builder-style variant of [`Table::add_foreign_key`]
    pub fn with_foreign_key(mut self, fk: ForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str, case_sensitive: bool) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| names_equal(&c.name, name, case_sensitive))
    }

    /// Find a column by name, mutably
    pub fn find_column_mut(&mut self, name: &str, case_sensitive: bool) -> Option<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| names_equal(&c.name, name, case_sensitive))
    }

    /// Remove a column by name, returning it if present
    pub fn remove_column(&mut self, name: &str, case_sensitive: bool) -> Option<Column> {
        let pos = self
            .columns
            .iter()
            .position(|c| names_equal(&c.name, name, case_sensitive))?;
        Some(self.columns.remove(pos))
    }

    /// The columns flagged as primary key, in declaration order
    pub fn primary_key_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }

    /// The columns flagged auto-increment, in declaration order
    pub fn auto_increment_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.auto_increment).collect()
    }

    /// Find an index by name
    pub fn find_index(&self, name: &str, case_sensitive: bool) -> Option<&Index> {
        self.indexes
            .iter()
            .find(|i| names_equal(&i.name, name, case_sensitive))
    }

    /// Remove an index by name, returning it if present
    pub fn remove_index(&mut self, name: &str, case_sensitive: bool) -> Option<Index> {
        let pos = self
            .indexes
            .iter()
            .position(|i| names_equal(&i.name, name, case_sensitive))?;
        Some(self.indexes.remove(pos))
    }

    /// Remove the first foreign key structurally matching the given one
    pub fn remove_foreign_key(&mut self, fk: &ForeignKey, case_sensitive: bool) -> Option<ForeignKey> {
        let pos = self
            .foreign_keys
            .iter()
            .position(|f| f.same_structure(fk, case_sensitive))?;
        Some(self.foreign_keys.remove(pos))
    }

    fn structurally_equal(&self, other: &Table, case_sensitive: bool) -> bool {
        // Declared column order is significant; index and foreign key order
        // is not.
        self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .zip(&other.columns)
                .all(|(a, b)| columns_equal(a, b, case_sensitive))
            && same_elements(&self.indexes, &other.indexes, |a, b| {
                names_equal(&a.name, &b.name, case_sensitive) && a.same_structure(b, case_sensitive)
            })
            && same_elements(&self.foreign_keys, &other.foreign_keys, |a, b| {
                names_match_optional(&a.name, &b.name, case_sensitive)
                    && a.same_structure(b, case_sensitive)
            })
    }
}

/// Represents a complete database schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub name: String,
    /// Tables in declaration order; later tables may reference earlier ones
    pub tables: Vec<Table>,
}

impl Database {
    /// Create a new empty database
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tables: Vec::new(),
        }
    }

    /// Add a table to the schema
    pub fn add_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    /// Builder-style variant of [`Database::add_table`]
    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    /// Find a table by name
    pub fn find_table(&self, name: &str, case_sensitive: bool) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| names_equal(&t.name, name, case_sensitive))
    }

    /// Find a table by name, mutably
    pub fn find_table_mut(&mut self, name: &str, case_sensitive: bool) -> Option<&mut Table> {
        self.tables
            .iter_mut()
            .find(|t| names_equal(&t.name, name, case_sensitive))
    }

    /// Remove a table by name, returning it if present
    pub fn remove_table(&mut self, name: &str, case_sensitive: bool) -> Option<Table> {
        let pos = self
            .tables
            .iter()
            .position(|t| names_equal(&t.name, name, case_sensitive))?;
        Some(self.tables.remove(pos))
    }

    /// Check the structural invariants of the model.
    ///
    /// Returns a model validation error identifying the offending element
    /// for duplicate table or column names, indexes referencing missing
    /// columns, and foreign keys with no references or a missing target
    /// table.
    pub fn validate(&self, case_sensitive: bool) -> Result<()> {
        let mut seen_tables = HashSet::new();
        for table in &self.tables {
            let key = fold_name(&table.name, case_sensitive);
            if !seen_tables.insert(key) {
                return Err(Error::ModelValidationError(format!(
                    "duplicate table name '{}'",
                    table.name
                )));
            }

            let mut seen_columns = HashSet::new();
            for column in &table.columns {
                let key = fold_name(&column.name, case_sensitive);
                if !seen_columns.insert(key) {
                    return Err(Error::ModelValidationError(format!(
                        "duplicate column name '{}' in table '{}'",
                        column.name, table.name
                    )));
                }
            }

            for index in &table.indexes {
                for column in &index.columns {
                    if table.find_column(column, case_sensitive).is_none() {
                        return Err(Error::ModelValidationError(format!(
                            "index '{}' on table '{}' references unknown column '{}'",
                            index.name, table.name, column
                        )));
                    }
                }
            }

            for fk in &table.foreign_keys {
                if fk.references.is_empty() {
                    return Err(Error::ModelValidationError(format!(
                        "foreign key on table '{}' against '{}' has no column references",
                        table.name, fk.foreign_table
                    )));
                }
                if self.find_table(&fk.foreign_table, case_sensitive).is_none() {
                    return Err(Error::ModelValidationError(format!(
                        "foreign key on table '{}' references unknown table '{}'",
                        table.name, fk.foreign_table
                    )));
                }
                for reference in &fk.references {
                    if table.find_column(&reference.local, case_sensitive).is_none() {
                        return Err(Error::ModelValidationError(format!(
                            "foreign key on table '{}' references unknown local column '{}'",
                            table.name, reference.local
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Structural equality between two models.
    ///
    /// Tables are matched by name independent of declaration order; column
    /// lists must match in declared order; index and foreign key collections
    /// are compared independent of their internal ordering.
    pub fn structurally_equal(&self, other: &Database, case_sensitive: bool) -> bool {
        self.tables.len() == other.tables.len()
            && self.tables.iter().all(|table| {
                other
                    .find_table(&table.name, case_sensitive)
                    .is_some_and(|o| table.structurally_equal(o, case_sensitive))
            })
    }
}

fn columns_equal(a: &Column, b: &Column, case_sensitive: bool) -> bool {
    names_equal(&a.name, &b.name, case_sensitive)
        && a.sql_type == b.sql_type
        && a.size == b.size
        && a.scale == b.scale
        && a.is_required() == b.is_required()
        && a.primary_key == b.primary_key
        && a.auto_increment == b.auto_increment
        && a.default == b.default
}

fn names_match_optional(a: &Option<String>, b: &Option<String>, case_sensitive: bool) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => names_equal(a, b, case_sensitive),
        (None, None) => true,
        _ => false,
    }
}

fn fold_name(name: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        name.to_string()
    } else {
        name.to_lowercase()
    }
}

fn same_elements<T, F>(a: &[T], b: &[T], matches: F) -> bool
where
    F: Fn(&T, &T) -> bool,
{
    a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| matches(x, y)))
}

/// Table indices in a creation order that satisfies non-circular foreign key
/// dependencies: referenced tables come first, ties broken by declaration
/// order. Tables involved in reference cycles keep their declaration order;
/// cycles are resolved by deferring constraint creation, never table
/// creation.
pub fn creation_order(tables: &[Table], case_sensitive: bool) -> Vec<usize> {
    let find = |name: &str| {
        tables
            .iter()
            .position(|t| names_equal(&t.name, name, case_sensitive))
    };

    // Kahn's algorithm with declaration-order tie-breaking.
    let mut dependencies: Vec<HashSet<usize>> = vec![HashSet::new(); tables.len()];
    for (idx, table) in tables.iter().enumerate() {
        for fk in &table.foreign_keys {
            if let Some(target) = find(&fk.foreign_table) {
                if target != idx {
                    dependencies[idx].insert(target);
                }
            }
        }
    }

    let mut order = Vec::with_capacity(tables.len());
    let mut placed = vec![false; tables.len()];
    loop {
        let next = (0..tables.len()).find(|&idx| {
            !placed[idx] && dependencies[idx].iter().all(|&dep| placed[dep])
        });
        match next {
            Some(idx) => {
                placed[idx] = true;
                order.push(idx);
            }
            None => break,
        }
    }

    // Remaining tables are part of a cycle; keep declaration order.
    for idx in 0..tables.len() {
        if !placed[idx] {
            order.push(idx);
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        Table::new("orders")
            .with_column(Column::new("id", SqlType::Integer).primary_key())
            .with_column(Column::new("customer_id", SqlType::Integer).required())
            .with_column(Column::new("note", SqlType::Varchar).size("64"))
            .with_index(Index::new("ix_orders_customer", &["customer_id"]))
            .with_foreign_key(ForeignKey::new(
                "customers",
                vec![Reference::new("customer_id", "id")],
            ))
    }

    #[test]
    fn test_compound_size_sets_scale() {
        let column = Column::new("price", SqlType::Decimal).size("15,3");
        assert_eq!(column.size.as_deref(), Some("15"));
        assert_eq!(column.scale, Some(3));
    }

    #[test]
    fn test_primary_key_implies_required() {
        let column = Column::new("id", SqlType::Integer).primary_key();
        assert!(!column.required);
        assert!(column.is_required());
    }

    #[test]
    fn test_find_table_case_folding() {
        let db = Database::new("test").with_table(sample_table());
        assert!(db.find_table("ORDERS", false).is_some());
        assert!(db.find_table("ORDERS", true).is_none());
        assert!(db.find_table("orders", true).is_some());
    }

    #[test]
    fn test_validate_duplicate_column() {
        let mut table = sample_table();
        table.add_column(Column::new("ID", SqlType::Integer));
        let mut db = Database::new("test");
        db.add_table(Table::new("customers").with_column(Column::new("id", SqlType::Integer)));
        db.add_table(table);

        let err = db.validate(false).unwrap_err();
        assert!(err.to_string().contains("duplicate column name 'ID'"));
        assert!(db.validate(true).is_ok());
    }

    #[test]
    fn test_validate_dangling_index_column() {
        let mut db = Database::new("test");
        let mut table = Table::new("t");
        table.add_column(Column::new("a", SqlType::Integer));
        table.add_index(Index::new("ix_t_missing", &["missing"]));
        db.add_table(table);

        let err = db.validate(false).unwrap_err();
        assert!(err.to_string().contains("ix_t_missing"));
    }

    #[test]
    fn test_structural_equality_ignores_table_order() {
        let customers = Table::new("customers").with_column(Column::new("id", SqlType::Integer));
        let a = Database::new("test")
            .with_table(customers.clone())
            .with_table(sample_table());
        let b = Database::new("test")
            .with_table(sample_table())
            .with_table(customers);

        assert!(a.structurally_equal(&b, false));
    }

    #[test]
    fn test_structural_equality_respects_column_order() {
        let a = Database::new("test").with_table(
            Table::new("t")
                .with_column(Column::new("a", SqlType::Integer))
                .with_column(Column::new("b", SqlType::Integer)),
        );
        let b = Database::new("test").with_table(
            Table::new("t")
                .with_column(Column::new("b", SqlType::Integer))
                .with_column(Column::new("a", SqlType::Integer)),
        );

        assert!(!a.structurally_equal(&b, false));
    }

    #[test]
    fn test_creation_order_references_first() {
        let tables = vec![
            sample_table(),
            Table::new("customers").with_column(Column::new("id", SqlType::Integer)),
        ];
        assert_eq!(creation_order(&tables, false), vec![1, 0]);
    }

    #[test]
    fn test_creation_order_cycle_keeps_declaration_order() {
        let a = Table::new("a")
            .with_column(Column::new("id", SqlType::Integer).primary_key())
            .with_column(Column::new("b_id", SqlType::Integer))
            .with_foreign_key(ForeignKey::new("b", vec![Reference::new("b_id", "id")]));
        let b = Table::new("b")
            .with_column(Column::new("id", SqlType::Integer).primary_key())
            .with_column(Column::new("a_id", SqlType::Integer))
            .with_foreign_key(ForeignKey::new("a", vec![Reference::new("a_id", "id")]));

        assert_eq!(creation_order(&[a, b], false), vec![0, 1]);
    }

    #[test]
    fn test_self_reference_is_not_a_dependency() {
        let t = Table::new("employees")
            .with_column(Column::new("id", SqlType::Integer).primary_key())
            .with_column(Column::new("manager_id", SqlType::Integer))
            .with_foreign_key(ForeignKey::new(
                "employees",
                vec![Reference::new("manager_id", "id")],
            ));

        assert_eq!(creation_order(&[t], false), vec![0]);
    }
}
