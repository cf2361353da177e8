//! Dialect capability descriptors
//!
//! A [`DialectProfile`] captures the quirks of one database engine: quoting
//! style, identifier limits, identity rendering, drop semantics and ALTER
//! syntax. The SQL builder is a single generic algorithm parameterized by a
//! profile; there is no per-dialect builder type.

pub mod profiles;
pub mod type_map;

pub use type_map::{TypeEntry, TypeMapping};

/// How a dialect renders an auto-increment column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityStrategy {
    /// A native clause appended to the column definition
    Clause(&'static str),
    /// No native support; emulated with a companion sequence and an
    /// insert-time trigger around the table statement
    SequenceAndTrigger,
}

/// Shape of the DROP TABLE statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTableStyle {
    /// `DROP TABLE t`
    Plain,
    /// `DROP TABLE IF EXISTS t`
    IfExistsPrefix,
    /// `DROP TABLE t IF EXISTS`
    IfExistsSuffix,
    /// `DROP TABLE t CASCADE CONSTRAINTS`
    CascadeConstraints,
}

/// Shape of an in-place column alteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlterColumnStyle {
    /// `ALTER TABLE t ALTER COLUMN c TYPE x` plus separate NOT NULL and
    /// DEFAULT clauses
    AlterColumnType,
    /// `ALTER TABLE t MODIFY c <full definition>`
    ModifyColumn,
    /// `ALTER TABLE t ALTER COLUMN c <full definition>`
    AlterColumn,
}

/// How the primary key constraint is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryKeyDropStyle {
    /// `ALTER TABLE t DROP CONSTRAINT <name>` using the deterministic
    /// primary key constraint name
    DropConstraint,
    /// `ALTER TABLE t DROP PRIMARY KEY`
    DropPrimaryKey,
}

/// Per-engine capability and quirk descriptor
#[derive(Debug, Clone)]
pub struct DialectProfile {
    pub name: &'static str,
    pub quote_open: &'static str,
    pub quote_close: &'static str,
    /// Quote every identifier, not just reserved or unsafe ones
    pub always_quote: bool,
    pub max_identifier_length: usize,
    /// Dialect-specific reserved words on top of the shared keyword list
    pub reserved_words: &'static [&'static str],
    pub identity: IdentityStrategy,
    /// Whether an auto-increment column must be part of the primary key
    pub identity_requires_primary_key: bool,
    pub drop_table_style: DropTableStyle,
    /// Whether dropping a table implicitly removes foreign keys other
    /// tables declare against it
    pub drop_cascades_constraints: bool,
    pub alter_column_style: AlterColumnStyle,
    /// Whether a column type change is expressible as an in-place ALTER;
    /// when false the planner rewrites it as drop and recreate
    pub alter_column_in_place: bool,
    pub primary_key_drop_style: PrimaryKeyDropStyle,
    /// Clause naming the constraint in a foreign key drop, e.g.
    /// `DROP CONSTRAINT` or `DROP FOREIGN KEY`
    pub drop_foreign_key_clause: &'static str,
    /// Whether DROP INDEX needs an `ON <table>` qualifier
    pub drop_index_on_table: bool,
    pub supports_cast: bool,
    pub substring_function: &'static str,
    /// Whether nullable columns of certain types need an explicit
    /// `DEFAULT NULL` clause
    pub null_as_default_value_required: bool,
}
