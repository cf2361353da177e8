//! Change planner
//!
//! Orders an unordered change set into a sequence that can be applied
//! without violating referential integrity at any intermediate step, and
//! resolves structural side effects: a column change the dialect cannot
//! express in place becomes a drop-and-recreate group, and table removals
//! pull the foreign keys they would strand in front of themselves.

use tracing::debug;

use crate::config::EngineConfig;
use crate::dialect::{DialectProfile, TypeMapping};
use crate::diff::ModelChange;
use crate::error::{Error, Result};
use crate::model::{creation_order, Column, Database, Table};
use crate::utils::naming::names_equal;

/// Orders change sets into safe execution sequences
pub struct ChangePlanner<'a> {
    profile: &'a DialectProfile,
    types: &'a TypeMapping,
    case_sensitive: bool,
    allow_lossy_changes: bool,
}

/// Change buckets in emission order
#[derive(Default)]
struct Buckets {
    remove_foreign_keys: Vec<ModelChange>,
    remove_indexes: Vec<ModelChange>,
    remove_primary_keys: Vec<ModelChange>,
    remove_columns: Vec<ModelChange>,
    change_columns: Vec<ModelChange>,
    remove_tables: Vec<ModelChange>,
    add_tables: Vec<ModelChange>,
    add_columns: Vec<ModelChange>,
    primary_keys: Vec<ModelChange>,
    add_indexes: Vec<ModelChange>,
    add_foreign_keys: Vec<ModelChange>,
}

impl<'a> ChangePlanner<'a> {
    /// Create a planner for the given dialect and configuration
    pub fn new(
        profile: &'a DialectProfile,
        types: &'a TypeMapping,
        config: &EngineConfig,
    ) -> Self {
        Self {
            profile,
            types,
            case_sensitive: config.case_sensitive,
            allow_lossy_changes: config.allow_lossy_changes,
        }
    }

    /// Order the given change set into a safe execution sequence.
    ///
    /// `current` is the model the changes were diffed against; it is used to
    /// resolve dependencies and is not mutated.
    pub fn plan(
        &self,
        current: &Database,
        changes: Vec<ModelChange>,
    ) -> Result<Vec<ModelChange>> {
        let mut buckets = Buckets::default();

        for change in changes {
            match change {
                ModelChange::RemoveForeignKey { .. } => buckets.remove_foreign_keys.push(change),
                ModelChange::RemoveIndex { .. } => buckets.remove_indexes.push(change),
                ModelChange::RemovePrimaryKey { .. } => buckets.remove_primary_keys.push(change),
                ModelChange::RemoveColumn { .. } => buckets.remove_columns.push(change),
                ModelChange::ChangeColumn { .. } => {
                    self.plan_column_change(current, change, &mut buckets)?;
                }
                ModelChange::RemoveTable { .. } => buckets.remove_tables.push(change),
                ModelChange::AddTable { .. } => buckets.add_tables.push(change),
                ModelChange::AddColumn { .. } => buckets.add_columns.push(change),
                ModelChange::AddPrimaryKey { .. } | ModelChange::ChangePrimaryKey { .. } => {
                    buckets.primary_keys.push(change);
                }
                ModelChange::AddIndex { .. } => buckets.add_indexes.push(change),
                ModelChange::AddForeignKey { .. } => buckets.add_foreign_keys.push(change),
            }
        }

        self.plan_table_removals(current, &mut buckets);
        self.plan_table_additions(&mut buckets);

        let Buckets {
            mut remove_foreign_keys,
            remove_indexes,
            remove_primary_keys,
            remove_columns,
            change_columns,
            remove_tables,
            add_tables,
            add_columns,
            primary_keys,
            add_indexes,
            add_foreign_keys,
        } = buckets;

        let mut plan = Vec::new();
        plan.append(&mut remove_foreign_keys);
        plan.extend(remove_indexes);
        plan.extend(remove_primary_keys);
        plan.extend(remove_columns);
        plan.extend(change_columns);
        plan.extend(remove_tables);
        plan.extend(add_tables);
        plan.extend(add_columns);
        plan.extend(primary_keys);
        plan.extend(add_indexes);
        plan.extend(add_foreign_keys);

        debug!(
            dialect = self.profile.name,
            steps = plan.len(),
            "ordered change plan"
        );
        Ok(plan)
    }

    /// Keep an in-place column alteration, or rewrite it as
    /// drop-foreign-keys, drop-column, add-column, re-add-foreign-keys for
    /// dialects that cannot alter a column's type.
    fn plan_column_change(
        &self,
        current: &Database,
        change: ModelChange,
        buckets: &mut Buckets,
    ) -> Result<()> {
        let ModelChange::ChangeColumn {
            table_name,
            before,
            after,
        } = change
        else {
            return Ok(());
        };

        if self.is_lossy(&before, &after) && !self.allow_lossy_changes {
            return Err(Error::LossyChangeError(format!(
                "changing column '{}' on table '{}' from {} to {} may lose data",
                before.name, table_name, before.sql_type, after.sql_type
            )));
        }

        let storage_changed = self.types.round_trip(before.sql_type)
            != self.types.round_trip(after.sql_type)
            || self.types.effective_size(&before) != self.types.effective_size(&after)
            || before.scale.unwrap_or(0) != after.scale.unwrap_or(0);

        if self.profile.alter_column_in_place || !storage_changed {
            buckets.change_columns.push(ModelChange::ChangeColumn {
                table_name,
                before,
                after,
            });
            return Ok(());
        }

        // Rebuild: any foreign key touching the column has to go first and
        // come back afterwards.
        for table in &current.tables {
            for fk in &table.foreign_keys {
                let references_column = (names_equal(&table.name, &table_name, self.case_sensitive)
                    && fk.covers_column(&before.name, self.case_sensitive))
                    || (names_equal(&fk.foreign_table, &table_name, self.case_sensitive)
                        && fk
                            .references
                            .iter()
                            .any(|r| names_equal(&r.foreign, &before.name, self.case_sensitive)));
                if references_column {
                    buckets.remove_foreign_keys.push(ModelChange::RemoveForeignKey {
                        table_name: table.name.clone(),
                        foreign_key: fk.clone(),
                    });
                    buckets.add_foreign_keys.push(ModelChange::AddForeignKey {
                        table_name: table.name.clone(),
                        foreign_key: fk.clone(),
                    });
                }
            }
        }

        let next_column = current
            .find_table(&table_name, self.case_sensitive)
            .and_then(|t| self.column_after(t, &before.name));

        buckets.remove_columns.push(ModelChange::RemoveColumn {
            table_name: table_name.clone(),
            column_name: before.name.clone(),
        });
        buckets.add_columns.push(ModelChange::AddColumn {
            table_name,
            column: after,
            next_column,
        });
        Ok(())
    }

    /// Drop referencing tables before referenced ones and synthesize the
    /// foreign key removals the drops depend on.
    fn plan_table_removals(&self, current: &Database, buckets: &mut Buckets) {
        if buckets.remove_tables.is_empty() {
            return;
        }

        let removed: Vec<Table> = buckets
            .remove_tables
            .iter()
            .filter_map(|c| current.find_table(c.table_name(), self.case_sensitive))
            .cloned()
            .collect();

        // Foreign keys owned by removed tables vanish with them, but only
        // after an explicit drop; emit one unless the differ already did.
        for table in &removed {
            for fk in &table.foreign_keys {
                let already_planned = buckets.remove_foreign_keys.iter().any(|c| {
                    matches!(c, ModelChange::RemoveForeignKey { table_name, foreign_key }
                        if names_equal(table_name, &table.name, self.case_sensitive)
                            && foreign_key.same_structure(fk, self.case_sensitive))
                });
                if !already_planned {
                    buckets.remove_foreign_keys.push(ModelChange::RemoveForeignKey {
                        table_name: table.name.clone(),
                        foreign_key: fk.clone(),
                    });
                }
            }
        }

        // Creation order lists referenced tables first; drop in reverse.
        let order = creation_order(&removed, self.case_sensitive);
        buckets.remove_tables = order
            .into_iter()
            .rev()
            .map(|idx| ModelChange::RemoveTable {
                table_name: removed[idx].name.clone(),
            })
            .collect();
    }

    /// Create tables in dependency order and defer every new table's foreign
    /// keys behind all table creations, which is also what breaks reference
    /// cycles: constraint addition is deferred, table creation never is.
    fn plan_table_additions(&self, buckets: &mut Buckets) {
        if buckets.add_tables.is_empty() {
            return;
        }

        let mut added: Vec<Table> = buckets
            .add_tables
            .iter()
            .filter_map(|c| match c {
                ModelChange::AddTable { table } => Some(table.clone()),
                _ => None,
            })
            .collect();

        let order = creation_order(&added, self.case_sensitive);

        let mut deferred = Vec::new();
        for table in &mut added {
            for fk in table.foreign_keys.drain(..) {
                deferred.push(ModelChange::AddForeignKey {
                    table_name: table.name.clone(),
                    foreign_key: fk,
                });
            }
        }

        buckets.add_tables = order
            .into_iter()
            .map(|idx| ModelChange::AddTable {
                table: added[idx].clone(),
            })
            .collect();
        // New tables' constraints go after explicitly added ones were
        // collected, order within the bucket is immaterial.
        buckets.add_foreign_keys.extend(deferred);
    }

    /// Whether replacing `before` with `after` can truncate or reinterpret
    /// stored values.
    ///
    /// Types are compared after round-trip mapping; within a category the
    /// declaration order of the abstract type enumeration is a widening
    /// order, so moving to an earlier type or a smaller size narrows.
    fn is_lossy(&self, before: &Column, after: &Column) -> bool {
        let from = self.types.round_trip(before.sql_type);
        let to = self.types.round_trip(after.sql_type);

        let same_category = (from.is_text() && to.is_text())
            || (from.is_numeric() && to.is_numeric())
            || (from.is_binary() && to.is_binary())
            || (from.is_temporal() && to.is_temporal());
        if !same_category {
            return from != to;
        }

        if to.index() < from.index() {
            return true;
        }

        let narrowed_size = match (size_of(self.types, before), size_of(self.types, after)) {
            (Some(from_size), Some(to_size)) => to_size < from_size,
            _ => false,
        };
        let narrowed_scale = after.scale.unwrap_or(0) < before.scale.unwrap_or(0);
        narrowed_size || (from.is_decimal() && narrowed_scale)
    }

    fn column_after(&self, table: &Table, column: &str) -> Option<String> {
        let pos = table
            .columns
            .iter()
            .position(|c| names_equal(&c.name, column, self.case_sensitive))?;
        table.columns.get(pos + 1).map(|c| c.name.clone())
    }
}

fn size_of(types: &TypeMapping, column: &Column) -> Option<u64> {
    types
        .effective_size(column)
        .and_then(|s| s.trim().parse().ok())
}
