//! Schema difference calculator
//!
//! Compares two schema models and produces the unordered set of structural
//! changes needed to turn the current model into the desired one. Neither
//! input is mutated.

use tracing::debug;

use crate::config::EngineConfig;
use crate::dialect::TypeMapping;
use crate::diff::ModelChange;
use crate::model::{Column, Database, Table};

/// Computes the change set between two schema models.
///
/// Type and size comparisons go through the dialect's round-trip mapping so
/// that a column which merely reads back under a different abstract type is
/// not flagged as changed.
pub struct ModelDiffer<'a> {
    types: &'a TypeMapping,
    case_sensitive: bool,
    allow_table_removal: bool,
    allow_column_removal: bool,
}

impl<'a> ModelDiffer<'a> {
    /// Create a differ for the given dialect type mapping and configuration
    pub fn new(types: &'a TypeMapping, config: &EngineConfig) -> Self {
        Self {
            types,
            case_sensitive: config.case_sensitive,
            allow_table_removal: config.allow_table_removal,
            allow_column_removal: config.allow_column_removal,
        }
    }

    /// Compute the unordered change set between two models
    pub fn diff(&self, current: &Database, desired: &Database) -> Vec<ModelChange> {
        let mut changes = Vec::new();

        // Tables present only in the current model
        if self.allow_table_removal {
            for table in &current.tables {
                if desired.find_table(&table.name, self.case_sensitive).is_none() {
                    changes.push(ModelChange::RemoveTable {
                        table_name: table.name.clone(),
                    });
                }
            }
        }

        for table in &desired.tables {
            match current.find_table(&table.name, self.case_sensitive) {
                None => changes.push(ModelChange::AddTable {
                    table: table.clone(),
                }),
                Some(current_table) => self.diff_table(current_table, table, &mut changes),
            }
        }

        debug!(
            dialect = self.types.dialect(),
            changes = changes.len(),
            "computed model diff"
        );
        changes
    }

    fn diff_table(&self, current: &Table, desired: &Table, changes: &mut Vec<ModelChange>) {
        // Columns, matched by name
        if self.allow_column_removal {
            for column in &current.columns {
                if desired.find_column(&column.name, self.case_sensitive).is_none() {
                    changes.push(ModelChange::RemoveColumn {
                        table_name: desired.name.clone(),
                        column_name: column.name.clone(),
                    });
                }
            }
        }

        for column in &desired.columns {
            match current.find_column(&column.name, self.case_sensitive) {
                None => changes.push(ModelChange::AddColumn {
                    table_name: desired.name.clone(),
                    column: column.clone(),
                    next_column: None,
                }),
                Some(current_column) => {
                    if self.columns_differ(current_column, column) {
                        changes.push(ModelChange::ChangeColumn {
                            table_name: desired.name.clone(),
                            before: current_column.clone(),
                            after: column.clone(),
                        });
                    }
                }
            }
        }

        // Primary key membership, compared as a whole
        let current_pk = self.fold_names(current.primary_key_columns().iter().map(|c| c.name.as_str()));
        let desired_pk = self.fold_names(desired.primary_key_columns().iter().map(|c| c.name.as_str()));
        if current_pk != desired_pk {
            let new_columns: Vec<String> = desired
                .primary_key_columns()
                .iter()
                .map(|c| c.name.clone())
                .collect();
            let old_columns: Vec<String> = current
                .primary_key_columns()
                .iter()
                .map(|c| c.name.clone())
                .collect();

            let change = if current_pk.is_empty() {
                ModelChange::AddPrimaryKey {
                    table_name: desired.name.clone(),
                    columns: new_columns,
                }
            } else if desired_pk.is_empty() {
                ModelChange::RemovePrimaryKey {
                    table_name: desired.name.clone(),
                }
            } else {
                ModelChange::ChangePrimaryKey {
                    table_name: desired.name.clone(),
                    old_columns,
                    new_columns,
                }
            };
            changes.push(change);
        }

        // Indexes, matched structurally so that a cosmetic rename does not
        // produce a drop/add pair
        for index in &current.indexes {
            let survives = desired
                .indexes
                .iter()
                .any(|i| i.same_structure(index, self.case_sensitive));
            if !survives {
                changes.push(ModelChange::RemoveIndex {
                    table_name: desired.name.clone(),
                    index_name: index.name.clone(),
                });
            }
        }
        for index in &desired.indexes {
            let exists = current
                .indexes
                .iter()
                .any(|i| i.same_structure(index, self.case_sensitive));
            if !exists {
                changes.push(ModelChange::AddIndex {
                    table_name: desired.name.clone(),
                    index: index.clone(),
                });
            }
        }

        // Foreign keys, matched structurally
        for fk in &current.foreign_keys {
            let survives = desired
                .foreign_keys
                .iter()
                .any(|f| f.same_structure(fk, self.case_sensitive));
            if !survives {
                changes.push(ModelChange::RemoveForeignKey {
                    table_name: desired.name.clone(),
                    foreign_key: fk.clone(),
                });
            }
        }
        for fk in &desired.foreign_keys {
            let exists = current
                .foreign_keys
                .iter()
                .any(|f| f.same_structure(fk, self.case_sensitive));
            if !exists {
                changes.push(ModelChange::AddForeignKey {
                    table_name: desired.name.clone(),
                    foreign_key: fk.clone(),
                });
            }
        }
    }

    /// Whether two columns matched by name differ in definition.
    ///
    /// Primary key membership is tracked by the dedicated primary key
    /// changes and deliberately excluded here.
    fn columns_differ(&self, current: &Column, desired: &Column) -> bool {
        self.types.round_trip(current.sql_type) != self.types.round_trip(desired.sql_type)
            || self.types.effective_size(current) != self.types.effective_size(desired)
            || current.scale.unwrap_or(0) != desired.scale.unwrap_or(0)
            || current.is_required() != desired.is_required()
            || current.auto_increment != desired.auto_increment
            || current.default != desired.default
    }

    fn fold_names<'n>(&self, names: impl Iterator<Item = &'n str>) -> Vec<String> {
        let mut folded: Vec<String> = names
            .map(|n| {
                if self.case_sensitive {
                    n.to_string()
                } else {
                    n.to_lowercase()
                }
            })
            .collect();
        folded.sort();
        folded
    }
}
