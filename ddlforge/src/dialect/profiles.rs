//! Built-in dialect profiles and their type tables
//!
//! Each profile/table pair describes one supported engine. The tables are
//! deliberately explicit: every abstract type appears once, and totality is
//! validated when the mapping is constructed.

use crate::dialect::{
    AlterColumnStyle, DialectProfile, DropTableStyle, IdentityStrategy, PrimaryKeyDropStyle,
    TypeEntry, TypeMapping,
};
use crate::error::Result;
use crate::model::SqlType;

/// Profile for HSQLDB
pub fn hsqldb() -> DialectProfile {
    DialectProfile {
        name: "hsqldb",
        quote_open: "\"",
        quote_close: "\"",
        always_quote: true,
        max_identifier_length: 128,
        reserved_words: &[],
        identity: IdentityStrategy::Clause("GENERATED BY DEFAULT AS IDENTITY(START WITH 1)"),
        identity_requires_primary_key: true,
        drop_table_style: DropTableStyle::IfExistsSuffix,
        drop_cascades_constraints: false,
        alter_column_style: AlterColumnStyle::AlterColumn,
        alter_column_in_place: true,
        primary_key_drop_style: PrimaryKeyDropStyle::DropConstraint,
        drop_foreign_key_clause: "DROP CONSTRAINT",
        drop_index_on_table: false,
        supports_cast: true,
        substring_function: "SUBSTR",
        null_as_default_value_required: false,
    }
}

/// Type table for HSQLDB
pub fn hsqldb_types() -> Result<TypeMapping> {
    TypeMapping::new(
        "hsqldb",
        vec![
            (SqlType::Bit, TypeEntry::native("BOOLEAN", SqlType::Boolean)),
            (SqlType::Boolean, TypeEntry::native("BOOLEAN", SqlType::Boolean)),
            // HSQLDB has no TINYINT storage class and reports SMALLINT back
            (SqlType::TinyInt, TypeEntry::native("SMALLINT", SqlType::SmallInt)),
            (SqlType::SmallInt, TypeEntry::native("SMALLINT", SqlType::SmallInt)),
            (SqlType::Integer, TypeEntry::native("INTEGER", SqlType::Integer)),
            (SqlType::BigInt, TypeEntry::native("BIGINT", SqlType::BigInt)),
            (SqlType::Real, TypeEntry::native("REAL", SqlType::Real)),
            (SqlType::Float, TypeEntry::native("DOUBLE", SqlType::Double)),
            (SqlType::Double, TypeEntry::native("DOUBLE", SqlType::Double)),
            (SqlType::Numeric, TypeEntry::native("NUMERIC", SqlType::Numeric)),
            (SqlType::Decimal, TypeEntry::native("DECIMAL", SqlType::Decimal)),
            (SqlType::Char, TypeEntry::native("CHAR", SqlType::Char).sized("254")),
            (SqlType::Varchar, TypeEntry::native("VARCHAR", SqlType::Varchar).sized("254")),
            (SqlType::LongVarchar, TypeEntry::native("LONGVARCHAR", SqlType::LongVarchar)),
            (SqlType::Clob, TypeEntry::native("LONGVARCHAR", SqlType::LongVarchar)),
            (SqlType::Date, TypeEntry::native("DATE", SqlType::Date)),
            (SqlType::Time, TypeEntry::native("TIME", SqlType::Time)),
            (SqlType::Timestamp, TypeEntry::native("TIMESTAMP", SqlType::Timestamp)),
            (SqlType::Binary, TypeEntry::native("BINARY", SqlType::Binary).sized("254")),
            (SqlType::Varbinary, TypeEntry::native("VARBINARY", SqlType::Varbinary).sized("254")),
            (SqlType::LongVarbinary, TypeEntry::native("LONGVARBINARY", SqlType::LongVarbinary)),
            (SqlType::Blob, TypeEntry::native("LONGVARBINARY", SqlType::LongVarbinary)),
        ],
    )
}

/// Profile for MySQL
pub fn mysql() -> DialectProfile {
    DialectProfile {
        name: "mysql",
        quote_open: "`",
        quote_close: "`",
        always_quote: true,
        max_identifier_length: 64,
        reserved_words: &["fulltext", "spatial"],
        identity: IdentityStrategy::Clause("AUTO_INCREMENT"),
        identity_requires_primary_key: true,
        drop_table_style: DropTableStyle::IfExistsPrefix,
        drop_cascades_constraints: false,
        alter_column_style: AlterColumnStyle::ModifyColumn,
        alter_column_in_place: true,
        primary_key_drop_style: PrimaryKeyDropStyle::DropPrimaryKey,
        drop_foreign_key_clause: "DROP FOREIGN KEY",
        drop_index_on_table: true,
        supports_cast: true,
        substring_function: "SUBSTRING",
        null_as_default_value_required: true,
    }
}

/// Type table for MySQL
pub fn mysql_types() -> Result<TypeMapping> {
    TypeMapping::new(
        "mysql",
        vec![
            (SqlType::Bit, TypeEntry::native("BIT", SqlType::Bit)),
            (SqlType::Boolean, TypeEntry::native("TINYINT(1)", SqlType::TinyInt)),
            (SqlType::TinyInt, TypeEntry::native("TINYINT", SqlType::TinyInt)),
            (SqlType::SmallInt, TypeEntry::native("SMALLINT", SqlType::SmallInt)),
            (SqlType::Integer, TypeEntry::native("INTEGER", SqlType::Integer)),
            (SqlType::BigInt, TypeEntry::native("BIGINT", SqlType::BigInt)),
            (SqlType::Real, TypeEntry::native("FLOAT", SqlType::Real)),
            (SqlType::Float, TypeEntry::native("DOUBLE", SqlType::Double)),
            (SqlType::Double, TypeEntry::native("DOUBLE", SqlType::Double)),
            (SqlType::Numeric, TypeEntry::native("DECIMAL", SqlType::Decimal)),
            (SqlType::Decimal, TypeEntry::native("DECIMAL", SqlType::Decimal)),
            (SqlType::Char, TypeEntry::native("CHAR", SqlType::Char).sized("254")),
            (SqlType::Varchar, TypeEntry::native("VARCHAR", SqlType::Varchar).sized("254")),
            (SqlType::LongVarchar, TypeEntry::native("MEDIUMTEXT", SqlType::LongVarchar)),
            (SqlType::Clob, TypeEntry::native("LONGTEXT", SqlType::Clob)),
            (SqlType::Date, TypeEntry::native("DATE", SqlType::Date)),
            (SqlType::Time, TypeEntry::native("TIME", SqlType::Time)),
            // MySQL TIMESTAMP columns get an implicit default unless NULL
            // is spelled out
            (
                SqlType::Timestamp,
                TypeEntry::native("DATETIME", SqlType::Timestamp).null_default(),
            ),
            (SqlType::Binary, TypeEntry::native("BINARY", SqlType::Binary).sized("254")),
            (SqlType::Varbinary, TypeEntry::native("VARBINARY", SqlType::Varbinary).sized("254")),
            (SqlType::LongVarbinary, TypeEntry::native("MEDIUMBLOB", SqlType::LongVarbinary)),
            (SqlType::Blob, TypeEntry::native("LONGBLOB", SqlType::Blob)),
        ],
    )
}

/// Profile for PostgreSQL
pub fn postgresql() -> DialectProfile {
    DialectProfile {
        name: "postgresql",
        quote_open: "\"",
        quote_close: "\"",
        always_quote: false,
        max_identifier_length: 63,
        reserved_words: &["user", "session_user", "current_user"],
        identity: IdentityStrategy::Clause("GENERATED BY DEFAULT AS IDENTITY"),
        identity_requires_primary_key: false,
        drop_table_style: DropTableStyle::IfExistsPrefix,
        drop_cascades_constraints: false,
        alter_column_style: AlterColumnStyle::AlterColumnType,
        alter_column_in_place: true,
        primary_key_drop_style: PrimaryKeyDropStyle::DropConstraint,
        drop_foreign_key_clause: "DROP CONSTRAINT",
        drop_index_on_table: false,
        supports_cast: true,
        substring_function: "SUBSTR",
        null_as_default_value_required: false,
    }
}

/// Type table for PostgreSQL
pub fn postgresql_types() -> Result<TypeMapping> {
    TypeMapping::new(
        "postgresql",
        vec![
            (SqlType::Bit, TypeEntry::native("BOOLEAN", SqlType::Boolean)),
            (SqlType::Boolean, TypeEntry::native("BOOLEAN", SqlType::Boolean)),
            (SqlType::TinyInt, TypeEntry::native("SMALLINT", SqlType::SmallInt)),
            (SqlType::SmallInt, TypeEntry::native("SMALLINT", SqlType::SmallInt)),
            (SqlType::Integer, TypeEntry::native("INTEGER", SqlType::Integer)),
            (SqlType::BigInt, TypeEntry::native("BIGINT", SqlType::BigInt)),
            (SqlType::Real, TypeEntry::native("REAL", SqlType::Real)),
            (SqlType::Float, TypeEntry::native("DOUBLE PRECISION", SqlType::Double)),
            (SqlType::Double, TypeEntry::native("DOUBLE PRECISION", SqlType::Double)),
            (SqlType::Numeric, TypeEntry::native("NUMERIC", SqlType::Numeric)),
            (SqlType::Decimal, TypeEntry::native("NUMERIC", SqlType::Numeric)),
            (SqlType::Char, TypeEntry::native("CHAR", SqlType::Char).sized("254")),
            (SqlType::Varchar, TypeEntry::native("VARCHAR", SqlType::Varchar).sized("254")),
            (SqlType::LongVarchar, TypeEntry::native("TEXT", SqlType::LongVarchar)),
            (SqlType::Clob, TypeEntry::native("TEXT", SqlType::LongVarchar)),
            (SqlType::Date, TypeEntry::native("DATE", SqlType::Date)),
            (SqlType::Time, TypeEntry::native("TIME", SqlType::Time)),
            (SqlType::Timestamp, TypeEntry::native("TIMESTAMP", SqlType::Timestamp)),
            // every binary flavour is stored as BYTEA and read back as such
            (SqlType::Binary, TypeEntry::native("BYTEA", SqlType::LongVarbinary)),
            (SqlType::Varbinary, TypeEntry::native("BYTEA", SqlType::LongVarbinary)),
            (SqlType::LongVarbinary, TypeEntry::native("BYTEA", SqlType::LongVarbinary)),
            (SqlType::Blob, TypeEntry::native("BYTEA", SqlType::LongVarbinary)),
        ],
    )
}

/// Profile for Oracle
pub fn oracle() -> DialectProfile {
    DialectProfile {
        name: "oracle",
        quote_open: "\"",
        quote_close: "\"",
        always_quote: false,
        max_identifier_length: 30,
        reserved_words: &["level", "sysdate", "uid", "validate"],
        identity: IdentityStrategy::SequenceAndTrigger,
        identity_requires_primary_key: false,
        drop_table_style: DropTableStyle::CascadeConstraints,
        drop_cascades_constraints: true,
        alter_column_style: AlterColumnStyle::ModifyColumn,
        alter_column_in_place: false,
        primary_key_drop_style: PrimaryKeyDropStyle::DropConstraint,
        drop_foreign_key_clause: "DROP CONSTRAINT",
        drop_index_on_table: false,
        supports_cast: true,
        substring_function: "SUBSTR",
        null_as_default_value_required: false,
    }
}

/// Type table for Oracle
pub fn oracle_types() -> Result<TypeMapping> {
    TypeMapping::new(
        "oracle",
        vec![
            // everything NUMBER-based coalesces when read back
            (SqlType::Bit, TypeEntry::native("NUMBER(1)", SqlType::Decimal)),
            (SqlType::Boolean, TypeEntry::native("NUMBER(1)", SqlType::Decimal)),
            (SqlType::TinyInt, TypeEntry::native("NUMBER(3)", SqlType::Decimal)),
            (SqlType::SmallInt, TypeEntry::native("NUMBER(5)", SqlType::Decimal)),
            (SqlType::Integer, TypeEntry::native("INTEGER", SqlType::Integer)),
            (SqlType::BigInt, TypeEntry::native("NUMBER(38)", SqlType::Decimal)),
            (SqlType::Real, TypeEntry::native("REAL", SqlType::Real)),
            (SqlType::Float, TypeEntry::native("DOUBLE PRECISION", SqlType::Double)),
            (SqlType::Double, TypeEntry::native("DOUBLE PRECISION", SqlType::Double)),
            (SqlType::Numeric, TypeEntry::native("NUMBER", SqlType::Decimal)),
            (SqlType::Decimal, TypeEntry::native("NUMBER", SqlType::Decimal)),
            (SqlType::Char, TypeEntry::native("CHAR", SqlType::Char).sized("254")),
            (SqlType::Varchar, TypeEntry::native("VARCHAR2", SqlType::Varchar).sized("254")),
            (SqlType::LongVarchar, TypeEntry::native("CLOB", SqlType::Clob)),
            (SqlType::Clob, TypeEntry::native("CLOB", SqlType::Clob)),
            (SqlType::Date, TypeEntry::native("DATE", SqlType::Date)),
            (SqlType::Time, TypeEntry::native("DATE", SqlType::Date)),
            (SqlType::Timestamp, TypeEntry::native("TIMESTAMP", SqlType::Timestamp)),
            (SqlType::Binary, TypeEntry::native("RAW", SqlType::Varbinary).sized("254")),
            (SqlType::Varbinary, TypeEntry::native("RAW", SqlType::Varbinary).sized("254")),
            (SqlType::LongVarbinary, TypeEntry::native("BLOB", SqlType::Blob)),
            (SqlType::Blob, TypeEntry::native("BLOB", SqlType::Blob)),
        ],
    )
}

/// Profile for Microsoft SQL Server
pub fn mssql() -> DialectProfile {
    DialectProfile {
        name: "mssql",
        quote_open: "[",
        quote_close: "]",
        always_quote: true,
        max_identifier_length: 128,
        reserved_words: &["merge", "pivot", "unpivot"],
        identity: IdentityStrategy::Clause("IDENTITY(1,1)"),
        identity_requires_primary_key: false,
        drop_table_style: DropTableStyle::IfExistsPrefix,
        drop_cascades_constraints: false,
        alter_column_style: AlterColumnStyle::AlterColumn,
        alter_column_in_place: true,
        primary_key_drop_style: PrimaryKeyDropStyle::DropConstraint,
        drop_foreign_key_clause: "DROP CONSTRAINT",
        drop_index_on_table: false,
        supports_cast: true,
        substring_function: "SUBSTRING",
        null_as_default_value_required: false,
    }
}

/// Type table for Microsoft SQL Server
pub fn mssql_types() -> Result<TypeMapping> {
    TypeMapping::new(
        "mssql",
        vec![
            (SqlType::Bit, TypeEntry::native("BIT", SqlType::Bit)),
            (SqlType::Boolean, TypeEntry::native("BIT", SqlType::Bit)),
            (SqlType::TinyInt, TypeEntry::native("TINYINT", SqlType::TinyInt)),
            (SqlType::SmallInt, TypeEntry::native("SMALLINT", SqlType::SmallInt)),
            (SqlType::Integer, TypeEntry::native("INTEGER", SqlType::Integer)),
            (SqlType::BigInt, TypeEntry::native("BIGINT", SqlType::BigInt)),
            (SqlType::Real, TypeEntry::native("REAL", SqlType::Real)),
            (SqlType::Float, TypeEntry::native("FLOAT", SqlType::Double)),
            (SqlType::Double, TypeEntry::native("FLOAT", SqlType::Double)),
            (SqlType::Numeric, TypeEntry::native("NUMERIC", SqlType::Numeric)),
            (SqlType::Decimal, TypeEntry::native("DECIMAL", SqlType::Decimal)),
            (SqlType::Char, TypeEntry::native("CHAR", SqlType::Char).sized("254")),
            (SqlType::Varchar, TypeEntry::native("VARCHAR", SqlType::Varchar).sized("254")),
            (SqlType::LongVarchar, TypeEntry::native("TEXT", SqlType::LongVarchar)),
            (SqlType::Clob, TypeEntry::native("TEXT", SqlType::LongVarchar)),
            (SqlType::Date, TypeEntry::native("DATE", SqlType::Date)),
            (SqlType::Time, TypeEntry::native("TIME", SqlType::Time)),
            (SqlType::Timestamp, TypeEntry::native("DATETIME", SqlType::Timestamp)),
            (SqlType::Binary, TypeEntry::native("BINARY", SqlType::Binary).sized("254")),
            (SqlType::Varbinary, TypeEntry::native("VARBINARY", SqlType::Varbinary).sized("254")),
            (SqlType::LongVarbinary, TypeEntry::native("IMAGE", SqlType::LongVarbinary)),
            (SqlType::Blob, TypeEntry::native("IMAGE", SqlType::LongVarbinary)),
        ],
    )
}
