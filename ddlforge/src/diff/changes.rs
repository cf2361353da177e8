//! Atomic structural change operations
//!
//! A [`ModelChange`] is one structural delta between two schema models. Each
//! variant carries enough identity to be applied on its own to a target
//! model, which is how the planner's safety property is checked: applying the
//! planned sequence to a clone of the current model must reproduce the
//! desired one.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Column, Database, ForeignKey, Index, Table};

/// One atomic structural change between two schema models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelChange {
    /// A table present only in the desired model
    AddTable { table: Table },
    /// A table present only in the current model
    RemoveTable { table_name: String },
    /// A column present only in the desired table; `next_column` names the
    /// column it is inserted before, so a rebuilt column keeps its declared
    /// position
    AddColumn {
        table_name: String,
        column: Column,
        next_column: Option<String>,
    },
    /// A column present only in the current table
    RemoveColumn {
        table_name: String,
        column_name: String,
    },
    /// A column whose definition (type, size, scale, required, default or
    /// auto-increment) differs; carries both snapshots
    ChangeColumn {
        table_name: String,
        before: Column,
        after: Column,
    },
    /// A primary key appearing on a table that had none
    AddPrimaryKey {
        table_name: String,
        columns: Vec<String>,
    },
    /// A primary key disappearing entirely
    RemovePrimaryKey { table_name: String },
    /// A primary key whose column membership changed; one event per table,
    /// not per column
    ChangePrimaryKey {
        table_name: String,
        old_columns: Vec<String>,
        new_columns: Vec<String>,
    },
    /// An index present only in the desired table
    AddIndex { table_name: String, index: Index },
    /// An index present only in the current table
    RemoveIndex {
        table_name: String,
        index_name: String,
    },
    /// A foreign key present only in the desired table
    AddForeignKey {
        table_name: String,
        foreign_key: ForeignKey,
    },
    /// A foreign key present only in the current table
    RemoveForeignKey {
        table_name: String,
        foreign_key: ForeignKey,
    },
}

impl ModelChange {
    /// The name of the table this change targets
    pub fn table_name(&self) -> &str {
        match self {
            ModelChange::AddTable { table } => &table.name,
            ModelChange::RemoveTable { table_name }
            | ModelChange::AddColumn { table_name, .. }
            | ModelChange::RemoveColumn { table_name, .. }
            | ModelChange::ChangeColumn { table_name, .. }
            | ModelChange::AddPrimaryKey { table_name, .. }
            | ModelChange::RemovePrimaryKey { table_name }
            | ModelChange::ChangePrimaryKey { table_name, .. }
            | ModelChange::AddIndex { table_name, .. }
            | ModelChange::RemoveIndex { table_name, .. }
            | ModelChange::AddForeignKey { table_name, .. }
            | ModelChange::RemoveForeignKey { table_name, .. } => table_name,
        }
    }

    /// Apply this change to a model, mutating it in place.
    ///
    /// The engine only ever applies changes to clones; callers holding the
    /// original snapshots keep them intact.
    pub fn apply(&self, database: &mut Database, case_sensitive: bool) -> Result<()> {
        match self {
            ModelChange::AddTable { table } => {
                database.add_table(table.clone());
                Ok(())
            }
            ModelChange::RemoveTable { table_name } => {
                database
                    .remove_table(table_name, case_sensitive)
                    .map(|_| ())
                    .ok_or_else(|| missing_table(table_name))
            }
            ModelChange::AddColumn {
                table_name,
                column,
                next_column,
            } => {
                let table = find_table(database, table_name, case_sensitive)?;
                let pos = next_column.as_ref().and_then(|next| {
                    table
                        .columns
                        .iter()
                        .position(|c| crate::utils::naming::names_equal(&c.name, next, case_sensitive))
                });
                match pos {
                    Some(pos) => table.columns.insert(pos, column.clone()),
                    None => table.add_column(column.clone()),
                }
                Ok(())
            }
            ModelChange::RemoveColumn {
                table_name,
                column_name,
            } => {
                let table = find_table(database, table_name, case_sensitive)?;
                table
                    .remove_column(column_name, case_sensitive)
                    .map(|_| ())
                    .ok_or_else(|| missing_column(table_name, column_name))
            }
            ModelChange::ChangeColumn {
                table_name,
                before,
                after,
            } => {
                let table = find_table(database, table_name, case_sensitive)?;
                let column = table
                    .find_column_mut(&before.name, case_sensitive)
                    .ok_or_else(|| missing_column(table_name, &before.name))?;
                *column = after.clone();
                Ok(())
            }
            ModelChange::AddPrimaryKey {
                table_name,
                columns,
            }
            | ModelChange::ChangePrimaryKey {
                table_name,
                new_columns: columns,
                ..
            } => {
                let table = find_table(database, table_name, case_sensitive)?;
                for column in &mut table.columns {
                    // a column leaving the key keeps its effective NOT NULL
                    column.required = column.is_required();
                    column.primary_key = false;
                }
                for name in columns {
                    let column = table
                        .find_column_mut(name, case_sensitive)
                        .ok_or_else(|| missing_column(table_name, name))?;
                    column.primary_key = true;
                }
                Ok(())
            }
            ModelChange::RemovePrimaryKey { table_name } => {
                let table = find_table(database, table_name, case_sensitive)?;
                for column in &mut table.columns {
                    column.required = column.is_required();
                    column.primary_key = false;
                }
                Ok(())
            }
            ModelChange::AddIndex { table_name, index } => {
                let table = find_table(database, table_name, case_sensitive)?;
                table.add_index(index.clone());
                Ok(())
            }
            ModelChange::RemoveIndex {
                table_name,
                index_name,
            } => {
                let table = find_table(database, table_name, case_sensitive)?;
                table
                    .remove_index(index_name, case_sensitive)
                    .map(|_| ())
                    .ok_or_else(|| {
                        Error::ModelValidationError(format!(
                            "index '{}' not found on table '{}'",
                            index_name, table_name
                        ))
                    })
            }
            ModelChange::AddForeignKey {
                table_name,
                foreign_key,
            } => {
                let table = find_table(database, table_name, case_sensitive)?;
                table.add_foreign_key(foreign_key.clone());
                Ok(())
            }
            ModelChange::RemoveForeignKey {
                table_name,
                foreign_key,
            } => {
                let table = find_table(database, table_name, case_sensitive)?;
                table
                    .remove_foreign_key(foreign_key, case_sensitive)
                    .map(|_| ())
                    .ok_or_else(|| {
                        Error::ModelValidationError(format!(
                            "foreign key against '{}' not found on table '{}'",
                            foreign_key.foreign_table, table_name
                        ))
                    })
            }
        }
    }
}

fn find_table<'a>(
    database: &'a mut Database,
    name: &str,
    case_sensitive: bool,
) -> Result<&'a mut Table> {
    database
        .find_table_mut(name, case_sensitive)
        .ok_or_else(|| missing_table(name))
}

fn missing_table(name: &str) -> Error {
    Error::ModelValidationError(format!("table '{}' not found in model", name))
}

fn missing_column(table: &str, column: &str) -> Error {
    Error::ModelValidationError(format!(
        "column '{}' not found on table '{}'",
        column, table
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Reference, SqlType};

    fn sample_database() -> Database {
        Database::new("shop")
            .with_table(
                Table::new("customers")
                    .with_column(Column::new("id", SqlType::Integer).primary_key()),
            )
            .with_table(
                Table::new("orders")
                    .with_column(Column::new("id", SqlType::Integer).primary_key())
                    .with_column(Column::new("customer_id", SqlType::Integer).required())
                    .with_foreign_key(ForeignKey::new(
                        "customers",
                        vec![Reference::new("customer_id", "id")],
                    )),
            )
    }

    #[test]
    fn test_apply_remove_table() {
        let mut db = sample_database();
        let change = ModelChange::RemoveTable {
            table_name: "orders".to_string(),
        };
        change.apply(&mut db, false).unwrap();
        assert!(db.find_table("orders", false).is_none());
    }

    #[test]
    fn test_apply_to_missing_table_fails() {
        let mut db = sample_database();
        let change = ModelChange::RemoveTable {
            table_name: "nope".to_string(),
        };
        let err = change.apply(&mut db, false).unwrap_err();
        assert!(err.to_string().contains("'nope'"));
    }

    #[test]
    fn test_apply_change_column_keeps_position() {
        let mut db = sample_database();
        let before = Column::new("customer_id", SqlType::Integer).required();
        let after = Column::new("customer_id", SqlType::BigInt).required();
        let change = ModelChange::ChangeColumn {
            table_name: "orders".to_string(),
            before,
            after,
        };
        change.apply(&mut db, false).unwrap();

        let orders = db.find_table("orders", false).unwrap();
        assert_eq!(orders.columns[1].name, "customer_id");
        assert_eq!(orders.columns[1].sql_type, SqlType::BigInt);
    }

    #[test]
    fn test_apply_change_primary_key_moves_flags() {
        let mut db = sample_database();
        let change = ModelChange::ChangePrimaryKey {
            table_name: "orders".to_string(),
            old_columns: vec!["id".to_string()],
            new_columns: vec!["customer_id".to_string()],
        };
        change.apply(&mut db, false).unwrap();

        let orders = db.find_table("orders", false).unwrap();
        assert!(!orders.columns[0].primary_key);
        assert!(orders.columns[1].primary_key);
    }

    #[test]
    fn test_apply_remove_foreign_key_matches_structurally() {
        let mut db = sample_database();
        // same structure, different (absent vs named) constraint name
        let fk = ForeignKey::new("customers", vec![Reference::new("customer_id", "id")])
            .named("some_other_name");
        let change = ModelChange::RemoveForeignKey {
            table_name: "orders".to_string(),
            foreign_key: fk,
        };
        change.apply(&mut db, false).unwrap();
        assert!(db.find_table("orders", false).unwrap().foreign_keys.is_empty());
    }
}
