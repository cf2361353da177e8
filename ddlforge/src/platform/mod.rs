//! Platform facade
//!
//! A [`Platform`] binds a dialect profile to its type mapping and exposes
//! the end-to-end workflow: diff two models, order the changes, render
//! statements.

pub mod registry;

pub use registry::{default_registry, platform_for, PlatformRegistry};

use tracing::info;

use crate::config::EngineConfig;
use crate::dialect::{profiles, DialectProfile, TypeMapping};
use crate::diff::{ChangePlanner, ModelChange, ModelDiffer};
use crate::error::Result;
use crate::model::Database;
use crate::sql::SqlBuilder;

/// One database engine: its capability profile plus its type mapping
#[derive(Debug)]
pub struct Platform {
    pub name: &'static str,
    pub profile: DialectProfile,
    pub types: TypeMapping,
}

impl Platform {
    /// The HSQLDB platform
    pub fn hsqldb() -> Result<Self> {
        Ok(Self {
            name: "hsqldb",
            profile: profiles::hsqldb(),
            types: profiles::hsqldb_types()?,
        })
    }

    /// The MySQL platform
    pub fn mysql() -> Result<Self> {
        Ok(Self {
            name: "mysql",
            profile: profiles::mysql(),
            types: profiles::mysql_types()?,
        })
    }

    /// The PostgreSQL platform
    pub fn postgresql() -> Result<Self> {
        Ok(Self {
            name: "postgresql",
            profile: profiles::postgresql(),
            types: profiles::postgresql_types()?,
        })
    }

    /// The Oracle platform
    pub fn oracle() -> Result<Self> {
        Ok(Self {
            name: "oracle",
            profile: profiles::oracle(),
            types: profiles::oracle_types()?,
        })
    }

    /// The Microsoft SQL Server platform
    pub fn mssql() -> Result<Self> {
        Ok(Self {
            name: "mssql",
            profile: profiles::mssql(),
            types: profiles::mssql_types()?,
        })
    }

    /// A statement builder for this platform
    pub fn sql_builder<'a>(&'a self, config: &EngineConfig) -> SqlBuilder<'a> {
        SqlBuilder::new(&self.profile, &self.types, config)
    }

    /// Compute the unordered change set between two models
    pub fn diff(
        &self,
        current: &Database,
        desired: &Database,
        config: &EngineConfig,
    ) -> Vec<ModelChange> {
        ModelDiffer::new(&self.types, config).diff(current, desired)
    }

    /// Order a change set into a safe execution sequence
    pub fn plan(
        &self,
        current: &Database,
        changes: Vec<ModelChange>,
        config: &EngineConfig,
    ) -> Result<Vec<ModelChange>> {
        ChangePlanner::new(&self.profile, &self.types, config).plan(current, changes)
    }

    /// The statements creating a whole model from scratch
    pub fn create_sql(&self, database: &Database, config: &EngineConfig) -> Result<String> {
        self.sql_builder(config).create_schema(database)
    }

    /// The statements dropping a whole model
    pub fn drop_sql(&self, database: &Database, config: &EngineConfig) -> Result<String> {
        self.sql_builder(config).drop_schema(database)
    }

    /// Complete workflow: diff the models, order the changes and render the
    /// migration statements.
    pub fn migration_sql(
        &self,
        current: &Database,
        desired: &Database,
        config: &EngineConfig,
    ) -> Result<String> {
        desired.validate(config.case_sensitive)?;

        let changes = self.diff(current, desired, config);
        if changes.is_empty() {
            info!(dialect = self.name, "schemas are already in sync");
            return Ok(String::new());
        }

        let plan = self.plan(current, changes, config)?;
        self.sql_builder(config).alteration_sql(current, &plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, SqlType, Table};

    #[test]
    fn test_migration_sql_empty_when_in_sync() {
        let platform = Platform::hsqldb().unwrap();
        let config = EngineConfig::default();
        let db = Database::new("shop").with_table(
            Table::new("t").with_column(Column::new("id", SqlType::Integer).primary_key()),
        );

        let sql = platform.migration_sql(&db, &db.clone(), &config).unwrap();
        assert!(sql.is_empty());
    }

    #[test]
    fn test_migration_sql_creates_missing_table() {
        let platform = Platform::hsqldb().unwrap();
        let config = EngineConfig::default();
        let current = Database::new("shop");
        let desired = Database::new("shop").with_table(
            Table::new("T")
                .with_column(Column::new("PK", SqlType::Integer).primary_key())
                .with_column(Column::new("NAME", SqlType::Varchar).size("20")),
        );

        let sql = platform.migration_sql(&current, &desired, &config).unwrap();
        assert!(sql.starts_with("CREATE TABLE \"T\""));
        assert!(sql.contains("\"PK\" INTEGER"));
        assert!(sql.contains("\"NAME\" VARCHAR(20)"));
        assert!(sql.contains("PRIMARY KEY (\"PK\")"));
    }
}
