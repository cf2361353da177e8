//! DDL statement generator
//!
//! One generic builder renders model elements and change operations into
//! statement text for any dialect, steered entirely by the dialect profile
//! and type mapping. Generation is deterministic: the same model on the same
//! dialect always produces byte-identical text, including derived
//! constraint, sequence and trigger names.

use std::collections::HashSet;

use tracing::debug;

use crate::config::EngineConfig;
use crate::dialect::{
    AlterColumnStyle, DialectProfile, DropTableStyle, IdentityStrategy, PrimaryKeyDropStyle,
    TypeMapping,
};
use crate::diff::ModelChange;
use crate::error::{Error, Result};
use crate::model::{creation_order, Column, Database, ForeignKey, Index, Table};
use crate::utils::naming::{
    constraint_name, foreign_key_name, names_equal, primary_key_name, quote_identifier,
    truncate_identifier,
};

/// Renders schema elements and change operations as dialect-specific DDL
pub struct SqlBuilder<'a> {
    profile: &'a DialectProfile,
    types: &'a TypeMapping,
    case_sensitive: bool,
}

impl<'a> SqlBuilder<'a> {
    /// Create a builder for the given dialect and configuration
    pub fn new(
        profile: &'a DialectProfile,
        types: &'a TypeMapping,
        config: &EngineConfig,
    ) -> Self {
        Self {
            profile,
            types,
            case_sensitive: config.case_sensitive,
        }
    }

    fn quote(&self, name: &str) -> String {
        quote_identifier(name, self.profile)
    }

    fn max_len(&self) -> usize {
        self.profile.max_identifier_length
    }

    /// The rendered native type of a column, including its size spec
    fn column_type(&self, column: &Column) -> String {
        let native = self.types.native_type(column.sql_type);
        // native names like NUMBER(1) already carry their spec
        if native.contains('(') {
            return native.to_string();
        }

        let size = if self.types.requires_size(column.sql_type) {
            self.types.effective_size(column)
        } else {
            column.size.clone()
        };

        match size {
            Some(size) => {
                let scale = column.scale.filter(|_| column.sql_type.is_decimal());
                match scale {
                    Some(scale) => format!("{}({},{})", native, size, scale),
                    None => format!("{}({})", native, size),
                }
            }
            None => native.to_string(),
        }
    }

    /// Render a default value literal for a column
    fn default_literal(&self, column: &Column, value: &str) -> String {
        if column.sql_type.is_text() || column.sql_type.is_temporal() {
            format!("'{}'", value.replace('\'', "''"))
        } else {
            value.to_string()
        }
    }

    /// Render one column definition, shared by every statement that emits
    /// column clauses.
    fn column_definition(&self, table: &Table, column: &Column) -> Result<String> {
        let mut def = format!("{} {}", self.quote(&column.name), self.column_type(column));

        if column.auto_increment {
            if self.profile.identity_requires_primary_key && !column.primary_key {
                return Err(Error::ModelValidationError(format!(
                    "column '{}' in table '{}' is auto-incrementing but not part of the \
                     primary key, which {} does not support",
                    column.name, table.name, self.profile.name
                )));
            }
            if let IdentityStrategy::Clause(clause) = self.profile.identity {
                def.push(' ');
                def.push_str(clause);
            }
            // sequence-and-trigger dialects render nothing inline
        } else if let Some(value) = &column.default {
            def.push_str(" DEFAULT ");
            def.push_str(&self.default_literal(column, value));
        }

        if column.is_required() {
            def.push_str(" NOT NULL");
        } else if self.profile.null_as_default_value_required
            && self.types.has_null_default(column.sql_type)
            && column.default.is_none()
            && !column.auto_increment
        {
            def.push_str(" NULL");
        }

        Ok(def)
    }

    fn check_auto_increment(&self, table: &Table) -> Result<()> {
        let auto = table.auto_increment_columns();
        if auto.len() > 1 {
            return Err(Error::ModelValidationError(format!(
                "table '{}' declares {} auto-increment columns, at most one is supported",
                table.name,
                auto.len()
            )));
        }
        Ok(())
    }

    fn sequence_name(&self, table: &Table, column: &Column) -> String {
        constraint_name(&table.name, "seq", &[&column.name], self.max_len())
    }

    fn trigger_name(&self, table: &Table, column: &Column) -> String {
        constraint_name(&table.name, "trg", &[&column.name], self.max_len())
    }

    /// CREATE TABLE plus any companion statements the table needs: identity
    /// sequences and triggers for dialects without a native clause, and the
    /// table's index creations. Foreign keys are emitted separately so that
    /// reference cycles never constrain table creation order.
    pub fn create_table(&self, table: &Table) -> Result<String> {
        self.check_auto_increment(table)?;

        let emulated = matches!(self.profile.identity, IdentityStrategy::SequenceAndTrigger);
        let mut sql = String::new();

        if emulated {
            for column in table.auto_increment_columns() {
                sql.push_str(&format!(
                    "CREATE SEQUENCE {};\n",
                    self.quote(&self.sequence_name(table, column))
                ));
            }
        }

        let mut clauses = Vec::new();
        for column in &table.columns {
            clauses.push(format!("    {}", self.column_definition(table, column)?));
        }

        let pk: Vec<String> = table
            .primary_key_columns()
            .iter()
            .map(|c| self.quote(&c.name))
            .collect();
        if !pk.is_empty() {
            clauses.push(format!("    PRIMARY KEY ({})", pk.join(", ")));
        }

        sql.push_str(&format!(
            "CREATE TABLE {}\n(\n{}\n);\n",
            self.quote(&table.name),
            clauses.join(",\n")
        ));

        if emulated {
            for column in table.auto_increment_columns() {
                sql.push_str(&format!(
                    "CREATE OR REPLACE TRIGGER {} BEFORE INSERT ON {} FOR EACH ROW\n\
                     BEGIN\n\
                     SELECT {}.nextval INTO :new.{} FROM dual;\n\
                     END;\n",
                    self.quote(&self.trigger_name(table, column)),
                    self.quote(&table.name),
                    self.quote(&self.sequence_name(table, column)),
                    self.quote(&column.name),
                ));
            }
        }

        for index in &table.indexes {
            sql.push_str(&self.add_index(table, index)?);
        }

        Ok(sql)
    }

    /// The bare DROP TABLE statement in the dialect's syntax
    fn drop_table_statement(&self, table: &Table) -> String {
        let name = self.quote(&table.name);
        match self.profile.drop_table_style {
            DropTableStyle::Plain => format!("DROP TABLE {};\n", name),
            DropTableStyle::IfExistsPrefix => format!("DROP TABLE IF EXISTS {};\n", name),
            DropTableStyle::IfExistsSuffix => format!("DROP TABLE {} IF EXISTS;\n", name),
            DropTableStyle::CascadeConstraints => {
                format!("DROP TABLE {} CASCADE CONSTRAINTS;\n", name)
            }
        }
    }

    /// Statements dropping the sequence/trigger pair of emulated identity
    /// columns
    fn drop_identity_companions(&self, table: &Table) -> String {
        let mut sql = String::new();
        if matches!(self.profile.identity, IdentityStrategy::SequenceAndTrigger) {
            for column in table.auto_increment_columns() {
                sql.push_str(&format!(
                    "DROP TRIGGER {};\n",
                    self.quote(&self.trigger_name(table, column))
                ));
                sql.push_str(&format!(
                    "DROP SEQUENCE {};\n",
                    self.quote(&self.sequence_name(table, column))
                ));
            }
        }
        sql
    }

    /// DROP TABLE with its structural dependents: foreign keys other tables
    /// declare against it are dropped first (unless the dialect's drop
    /// cascades over them), companion sequences and triggers afterwards.
    pub fn drop_table(&self, database: &Database, table: &Table) -> Result<String> {
        let mut sql = String::new();

        if !self.profile.drop_cascades_constraints {
            for other in &database.tables {
                if names_equal(&other.name, &table.name, self.case_sensitive) {
                    continue;
                }
                for fk in &other.foreign_keys {
                    if names_equal(&fk.foreign_table, &table.name, self.case_sensitive) {
                        sql.push_str(&self.drop_foreign_key(other, fk)?);
                    }
                }
            }
        }

        sql.push_str(&self.drop_table_statement(table));
        sql.push_str(&self.drop_identity_companions(table));
        Ok(sql)
    }

    /// CREATE statements for a whole model: tables in dependency order, then
    /// every foreign key.
    pub fn create_schema(&self, database: &Database) -> Result<String> {
        database.validate(self.case_sensitive)?;

        let order = creation_order(&database.tables, self.case_sensitive);
        let mut sql = String::new();
        for &idx in &order {
            sql.push_str(&self.create_table(&database.tables[idx])?);
        }
        for &idx in &order {
            let table = &database.tables[idx];
            for fk in &table.foreign_keys {
                sql.push_str(&self.add_foreign_key(table, fk)?);
            }
        }

        debug!(
            dialect = self.profile.name,
            tables = database.tables.len(),
            "generated schema creation SQL"
        );
        Ok(sql)
    }

    /// DROP statements for a whole model: foreign keys first, then tables in
    /// reverse dependency order.
    pub fn drop_schema(&self, database: &Database) -> Result<String> {
        let order = creation_order(&database.tables, self.case_sensitive);
        let mut sql = String::new();

        if !self.profile.drop_cascades_constraints {
            for &idx in order.iter().rev() {
                let table = &database.tables[idx];
                for fk in &table.foreign_keys {
                    sql.push_str(&self.drop_foreign_key(table, fk)?);
                }
            }
        }
        for &idx in order.iter().rev() {
            let table = &database.tables[idx];
            sql.push_str(&self.drop_table_statement(table));
            sql.push_str(&self.drop_identity_companions(table));
        }
        Ok(sql)
    }

    /// ALTER TABLE ... ADD COLUMN, with identity emulation when needed
    pub fn add_column(&self, table: &Table, column: &Column) -> Result<String> {
        let mut sql = String::new();
        let emulated = column.auto_increment
            && matches!(self.profile.identity, IdentityStrategy::SequenceAndTrigger);

        if emulated {
            sql.push_str(&format!(
                "CREATE SEQUENCE {};\n",
                self.quote(&self.sequence_name(table, column))
            ));
        }

        sql.push_str(&format!(
            "ALTER TABLE {} ADD COLUMN {};\n",
            self.quote(&table.name),
            self.column_definition(table, column)?
        ));

        if emulated {
            sql.push_str(&format!(
                "CREATE OR REPLACE TRIGGER {} BEFORE INSERT ON {} FOR EACH ROW\n\
                 BEGIN\n\
                 SELECT {}.nextval INTO :new.{} FROM dual;\n\
                 END;\n",
                self.quote(&self.trigger_name(table, column)),
                self.quote(&table.name),
                self.quote(&self.sequence_name(table, column)),
                self.quote(&column.name),
            ));
        }
        Ok(sql)
    }

    /// ALTER TABLE ... DROP COLUMN, dropping identity companions first
    pub fn drop_column(&self, table: &Table, column_name: &str) -> Result<String> {
        let mut sql = String::new();
        if let Some(column) = table.find_column(column_name, self.case_sensitive) {
            if column.auto_increment
                && matches!(self.profile.identity, IdentityStrategy::SequenceAndTrigger)
            {
                sql.push_str(&format!(
                    "DROP TRIGGER {};\n",
                    self.quote(&self.trigger_name(table, column))
                ));
                sql.push_str(&format!(
                    "DROP SEQUENCE {};\n",
                    self.quote(&self.sequence_name(table, column))
                ));
            }
        }
        sql.push_str(&format!(
            "ALTER TABLE {} DROP COLUMN {};\n",
            self.quote(&table.name),
            self.quote(column_name)
        ));
        Ok(sql)
    }

    /// In-place column alteration.
    ///
    /// Fails with an unsupported-feature error when the dialect cannot
    /// change column storage via ALTER; the planner rewrites such changes as
    /// drop-and-recreate groups before rendering.
    pub fn alter_column(&self, table: &Table, before: &Column, after: &Column) -> Result<String> {
        let storage_changed = self.types.round_trip(before.sql_type)
            != self.types.round_trip(after.sql_type)
            || self.types.effective_size(before) != self.types.effective_size(after)
            || before.scale.unwrap_or(0) != after.scale.unwrap_or(0);

        if storage_changed && !self.profile.alter_column_in_place {
            return Err(Error::UnsupportedFeatureError {
                dialect: self.profile.name.to_string(),
                feature: format!(
                    "changing the type of column '{}' on table '{}' in place",
                    before.name, table.name
                ),
            });
        }

        let table_name = self.quote(&table.name);
        let column_name = self.quote(&after.name);

        match self.profile.alter_column_style {
            AlterColumnStyle::AlterColumnType => {
                // separate clauses for type, nullability and default
                let mut sql = String::new();
                if storage_changed {
                    sql.push_str(&format!(
                        "ALTER TABLE {} ALTER COLUMN {} TYPE {} USING {};\n",
                        table_name,
                        column_name,
                        self.column_type(after),
                        self.cast_expression(before, after)?
                    ));
                }
                if before.is_required() != after.is_required() {
                    let clause = if after.is_required() {
                        "SET NOT NULL"
                    } else {
                        "DROP NOT NULL"
                    };
                    sql.push_str(&format!(
                        "ALTER TABLE {} ALTER COLUMN {} {};\n",
                        table_name, column_name, clause
                    ));
                }
                if before.default != after.default {
                    match &after.default {
                        Some(value) => sql.push_str(&format!(
                            "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT {};\n",
                            table_name,
                            column_name,
                            self.default_literal(after, value)
                        )),
                        None => sql.push_str(&format!(
                            "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT;\n",
                            table_name, column_name
                        )),
                    }
                }
                Ok(sql)
            }
            AlterColumnStyle::ModifyColumn => Ok(format!(
                "ALTER TABLE {} MODIFY {};\n",
                table_name,
                self.column_definition(table, after)?
            )),
            AlterColumnStyle::AlterColumn => Ok(format!(
                "ALTER TABLE {} ALTER COLUMN {};\n",
                table_name,
                self.column_definition(table, after)?
            )),
        }
    }

    /// ALTER TABLE ... ADD CONSTRAINT ... FOREIGN KEY
    pub fn add_foreign_key(&self, table: &Table, fk: &ForeignKey) -> Result<String> {
        if fk.references.is_empty() {
            return Err(Error::ModelValidationError(format!(
                "foreign key on table '{}' against '{}' has no column references",
                table.name, fk.foreign_table
            )));
        }

        let locals: Vec<String> = fk
            .references
            .iter()
            .map(|r| self.quote(&r.local))
            .collect();
        let foreigns: Vec<String> = fk
            .references
            .iter()
            .map(|r| self.quote(&r.foreign))
            .collect();

        Ok(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({});\n",
            self.quote(&table.name),
            self.quote(&foreign_key_name(&table.name, fk, self.max_len())),
            locals.join(", "),
            self.quote(&fk.foreign_table),
            foreigns.join(", ")
        ))
    }

    /// Drop a foreign key constraint, deriving its name when absent
    pub fn drop_foreign_key(&self, table: &Table, fk: &ForeignKey) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} {} {};\n",
            self.quote(&table.name),
            self.profile.drop_foreign_key_clause,
            self.quote(&foreign_key_name(&table.name, fk, self.max_len()))
        ))
    }

    /// CREATE [UNIQUE] INDEX
    pub fn add_index(&self, table: &Table, index: &Index) -> Result<String> {
        for column in &index.columns {
            if table.find_column(column, self.case_sensitive).is_none() {
                return Err(Error::ModelValidationError(format!(
                    "index '{}' on table '{}' references unknown column '{}'",
                    index.name, table.name, column
                )));
            }
        }

        let columns: Vec<String> = index.columns.iter().map(|c| self.quote(c)).collect();
        Ok(format!(
            "CREATE {}INDEX {} ON {} ({});\n",
            if index.unique { "UNIQUE " } else { "" },
            self.quote(&truncate_identifier(&index.name, self.max_len())),
            self.quote(&table.name),
            columns.join(", ")
        ))
    }

    /// DROP INDEX, with the table qualifier where the dialect wants one
    pub fn drop_index(&self, table: &Table, index_name: &str) -> Result<String> {
        if self.profile.drop_index_on_table {
            Ok(format!(
                "DROP INDEX {} ON {};\n",
                self.quote(index_name),
                self.quote(&table.name)
            ))
        } else {
            Ok(format!("DROP INDEX {};\n", self.quote(index_name)))
        }
    }

    /// ALTER TABLE ... ADD [CONSTRAINT] PRIMARY KEY
    pub fn add_primary_key(&self, table: &Table, columns: &[String]) -> Result<String> {
        let quoted: Vec<String> = columns.iter().map(|c| self.quote(c)).collect();
        match self.profile.primary_key_drop_style {
            PrimaryKeyDropStyle::DropPrimaryKey => Ok(format!(
                "ALTER TABLE {} ADD PRIMARY KEY ({});\n",
                self.quote(&table.name),
                quoted.join(", ")
            )),
            PrimaryKeyDropStyle::DropConstraint => Ok(format!(
                "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY ({});\n",
                self.quote(&table.name),
                self.quote(&primary_key_name(&table.name, self.max_len())),
                quoted.join(", ")
            )),
        }
    }

    /// Drop the primary key constraint
    pub fn drop_primary_key(&self, table: &Table) -> Result<String> {
        match self.profile.primary_key_drop_style {
            PrimaryKeyDropStyle::DropPrimaryKey => Ok(format!(
                "ALTER TABLE {} DROP PRIMARY KEY;\n",
                self.quote(&table.name)
            )),
            PrimaryKeyDropStyle::DropConstraint => Ok(format!(
                "ALTER TABLE {} DROP CONSTRAINT {};\n",
                self.quote(&table.name),
                self.quote(&primary_key_name(&table.name, self.max_len()))
            )),
        }
    }

    /// The expression converting values stored under `source` into values
    /// valid for `target`.
    ///
    /// Narrowing a text type truncates as well as casts: the cast alone
    /// would fail on engines that check the declared size.
    pub fn cast_expression(&self, source: &Column, target: &Column) -> Result<String> {
        if !self.profile.supports_cast {
            return Err(Error::UnsupportedFeatureError {
                dialect: self.profile.name.to_string(),
                feature: "CAST expressions".to_string(),
            });
        }

        let source_name = self.quote(&source.name);
        let narrowing = target.sql_type.is_text()
            && match (sized(self.types, source), sized(self.types, target)) {
                (Some(from), Some(to)) => to < from,
                _ => false,
            };

        if narrowing {
            let size = self
                .types
                .effective_size(target)
                .unwrap_or_default();
            Ok(format!(
                "{}(CAST({} AS {}), 1, {})",
                self.profile.substring_function,
                source_name,
                self.types.native_type(target.sql_type),
                size
            ))
        } else {
            Ok(format!(
                "CAST({} AS {})",
                source_name,
                self.column_type(target)
            ))
        }
    }

    /// Render an ordered change sequence as executable statements.
    ///
    /// Changes are rendered against a working copy of the current model that
    /// is mutated as rendering progresses, so later statements see the
    /// effects of earlier ones. A column rebuilt via drop-and-recreate gets
    /// its data carried over through a deterministic backup column when the
    /// old and new types are compatible for a direct value copy.
    pub fn alteration_sql(&self, current: &Database, changes: &[ModelChange]) -> Result<String> {
        let mut working = current.clone();
        let rebuilt = rebuilt_columns(changes, self.case_sensitive);
        let mut sql = String::new();

        for change in changes {
            match change {
                ModelChange::AddTable { table } => sql.push_str(&self.create_table(table)?),
                ModelChange::RemoveTable { table_name } => {
                    let table = self.working_table(&working, table_name)?;
                    sql.push_str(&self.drop_table(&working, table)?);
                }
                ModelChange::AddColumn {
                    table_name, column, ..
                } => {
                    let table = self.working_table(&working, table_name)?;
                    sql.push_str(&self.add_column(table, column)?);
                    if rebuilt.contains(&fold(table_name, &column.name, self.case_sensitive)) {
                        sql.push_str(&self.restore_column_data(table, column));
                    }
                }
                ModelChange::RemoveColumn {
                    table_name,
                    column_name,
                } => {
                    let table = self.working_table(&working, table_name)?;
                    if let Some(backup) = self.backup_column_data(changes, table, column_name)? {
                        sql.push_str(&backup);
                    }
                    sql.push_str(&self.drop_column(table, column_name)?);
                }
                ModelChange::ChangeColumn {
                    table_name,
                    before,
                    after,
                } => {
                    let table = self.working_table(&working, table_name)?;
                    sql.push_str(&self.alter_column(table, before, after)?);
                }
                ModelChange::AddPrimaryKey {
                    table_name,
                    columns,
                } => {
                    let table = self.working_table(&working, table_name)?;
                    sql.push_str(&self.add_primary_key(table, columns)?);
                }
                ModelChange::RemovePrimaryKey { table_name } => {
                    let table = self.working_table(&working, table_name)?;
                    sql.push_str(&self.drop_primary_key(table)?);
                }
                ModelChange::ChangePrimaryKey {
                    table_name,
                    new_columns,
                    ..
                } => {
                    let table = self.working_table(&working, table_name)?;
                    sql.push_str(&self.drop_primary_key(table)?);
                    sql.push_str(&self.add_primary_key(table, new_columns)?);
                }
                ModelChange::AddIndex { table_name, index } => {
                    let table = self.working_table(&working, table_name)?;
                    sql.push_str(&self.add_index(table, index)?);
                }
                ModelChange::RemoveIndex {
                    table_name,
                    index_name,
                } => {
                    let table = self.working_table(&working, table_name)?;
                    sql.push_str(&self.drop_index(table, index_name)?);
                }
                ModelChange::AddForeignKey {
                    table_name,
                    foreign_key,
                } => {
                    let table = self.working_table(&working, table_name)?;
                    sql.push_str(&self.add_foreign_key(table, foreign_key)?);
                }
                ModelChange::RemoveForeignKey {
                    table_name,
                    foreign_key,
                } => {
                    let table = self.working_table(&working, table_name)?;
                    sql.push_str(&self.drop_foreign_key(table, foreign_key)?);
                }
            }

            change.apply(&mut working, self.case_sensitive)?;
        }

        debug!(
            dialect = self.profile.name,
            changes = changes.len(),
            "generated alteration SQL"
        );
        Ok(sql)
    }

    fn working_table<'t>(&self, working: &'t Database, name: &str) -> Result<&'t Table> {
        working.find_table(name, self.case_sensitive).ok_or_else(|| {
            Error::ModelValidationError(format!("table '{}' not found in model", name))
        })
    }

    fn backup_name(&self, column: &str) -> String {
        truncate_identifier(&format!("{}_bak", column), self.max_len())
    }

    /// When a dropped column comes back later in the same plan, stash its
    /// values in a backup column before the drop.
    fn backup_column_data(
        &self,
        changes: &[ModelChange],
        table: &Table,
        column_name: &str,
    ) -> Result<Option<String>> {
        let Some(new_column) = readded_column(changes, &table.name, column_name, self.case_sensitive)
        else {
            return Ok(None);
        };
        let Some(old_column) = table.find_column(column_name, self.case_sensitive) else {
            return Ok(None);
        };
        if !copy_compatible(self.types, old_column, new_column) {
            // acknowledged as lossy during planning, nothing to preserve
            return Ok(None);
        }

        let backup = self.backup_name(column_name);
        let mut tmp = new_column.clone();
        tmp.name = backup.clone();
        tmp.required = false;
        tmp.primary_key = false;
        tmp.auto_increment = false;

        let mut sql = format!(
            "ALTER TABLE {} ADD COLUMN {};\n",
            self.quote(&table.name),
            self.column_definition(table, &tmp)?
        );
        sql.push_str(&format!(
            "UPDATE {} SET {} = {};\n",
            self.quote(&table.name),
            self.quote(&backup),
            self.cast_expression(old_column, new_column)?
        ));
        Ok(Some(sql))
    }

    /// Copy preserved values back into the recreated column and drop the
    /// backup.
    fn restore_column_data(&self, table: &Table, column: &Column) -> String {
        let backup = self.backup_name(&column.name);
        let mut sql = format!(
            "UPDATE {} SET {} = {};\n",
            self.quote(&table.name),
            self.quote(&column.name),
            self.quote(&backup)
        );
        sql.push_str(&format!(
            "ALTER TABLE {} DROP COLUMN {};\n",
            self.quote(&table.name),
            self.quote(&backup)
        ));
        sql
    }
}

fn sized(types: &TypeMapping, column: &Column) -> Option<u64> {
    types
        .effective_size(column)
        .and_then(|s| s.trim().parse().ok())
}

/// Whether values can be copied directly between the two column types
fn copy_compatible(types: &TypeMapping, from: &Column, to: &Column) -> bool {
    let from = types.round_trip(from.sql_type);
    let to = types.round_trip(to.sql_type);
    (from.is_text() && to.is_text())
        || (from.is_numeric() && to.is_numeric())
        || (from.is_binary() && to.is_binary())
        || (from.is_temporal() && to.is_temporal())
}

fn fold(table: &str, column: &str, case_sensitive: bool) -> (String, String) {
    if case_sensitive {
        (table.to_string(), column.to_string())
    } else {
        (table.to_lowercase(), column.to_lowercase())
    }
}

/// The (table, column) pairs that are both removed and re-added within one
/// plan, i.e. columns being rebuilt in place
fn rebuilt_columns(changes: &[ModelChange], case_sensitive: bool) -> HashSet<(String, String)> {
    let mut removed = HashSet::new();
    for change in changes {
        if let ModelChange::RemoveColumn {
            table_name,
            column_name,
        } = change
        {
            removed.insert(fold(table_name, column_name, case_sensitive));
        }
    }

    let mut rebuilt = HashSet::new();
    for change in changes {
        if let ModelChange::AddColumn {
            table_name, column, ..
        } = change
        {
            let key = fold(table_name, &column.name, case_sensitive);
            if removed.contains(&key) {
                rebuilt.insert(key);
            }
        }
    }
    rebuilt
}

/// The definition a removed column is re-added under later in the plan
fn readded_column<'c>(
    changes: &'c [ModelChange],
    table: &str,
    column: &str,
    case_sensitive: bool,
) -> Option<&'c Column> {
    changes.iter().find_map(|change| match change {
        ModelChange::AddColumn {
            table_name,
            column: added,
            ..
        } if names_equal(table_name, table, case_sensitive)
            && names_equal(&added.name, column, case_sensitive) =>
        {
            Some(added)
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::profiles;
    use crate::model::{Reference, SqlType};
    use pretty_assertions::assert_eq;

    fn hsqldb_builder_parts() -> (DialectProfile, TypeMapping, EngineConfig) {
        (
            profiles::hsqldb(),
            profiles::hsqldb_types().unwrap(),
            EngineConfig::default(),
        )
    }

    fn simple_table() -> Table {
        Table::new("T")
            .with_column(Column::new("PK", SqlType::Integer).primary_key())
            .with_column(Column::new("NAME", SqlType::Varchar).size("20"))
    }

    #[test]
    fn test_create_table_hsqldb() {
        let (profile, types, config) = hsqldb_builder_parts();
        let builder = SqlBuilder::new(&profile, &types, &config);

        let sql = builder.create_table(&simple_table()).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE \"T\"\n\
             (\n\
             \x20   \"PK\" INTEGER NOT NULL,\n\
             \x20   \"NAME\" VARCHAR(20),\n\
             \x20   PRIMARY KEY (\"PK\")\n\
             );\n"
        );
    }

    #[test]
    fn test_create_table_is_deterministic() {
        let profile = profiles::oracle();
        let types = profiles::oracle_types().unwrap();
        let config = EngineConfig::default();
        let builder = SqlBuilder::new(&profile, &types, &config);

        let table = Table::new("orders")
            .with_column(Column::new("id", SqlType::Integer).primary_key().auto_increment())
            .with_column(Column::new("label", SqlType::Varchar).size("40"))
            .with_index(Index::new("ix_orders_label", &["label"]));

        let first = builder.create_table(&table).unwrap();
        let second = builder.create_table(&table).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_identity_requires_primary_key() {
        let (profile, types, config) = hsqldb_builder_parts();
        let builder = SqlBuilder::new(&profile, &types, &config);

        let table = Table::new("T")
            .with_column(Column::new("PK", SqlType::Integer).primary_key())
            .with_column(Column::new("COUNTER", SqlType::Integer).auto_increment());

        let err = builder.create_table(&table).unwrap_err();
        match err {
            Error::ModelValidationError(message) => {
                assert!(message.contains("COUNTER"));
                assert!(message.contains("'T'"));
            }
            other => panic!("expected model validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_identity_clause_hsqldb() {
        let (profile, types, config) = hsqldb_builder_parts();
        let builder = SqlBuilder::new(&profile, &types, &config);

        let table = Table::new("T")
            .with_column(Column::new("PK", SqlType::Integer).primary_key().auto_increment());

        let sql = builder.create_table(&table).unwrap();
        assert!(sql.contains("\"PK\" INTEGER GENERATED BY DEFAULT AS IDENTITY(START WITH 1)"));
    }

    #[test]
    fn test_sequence_and_trigger_emulation() {
        let profile = profiles::oracle();
        let types = profiles::oracle_types().unwrap();
        let config = EngineConfig::default();
        let builder = SqlBuilder::new(&profile, &types, &config);

        let table = Table::new("orders")
            .with_column(Column::new("id", SqlType::Integer).primary_key().auto_increment());

        let sql = builder.create_table(&table).unwrap();
        assert!(sql.starts_with("CREATE SEQUENCE orders_seq_id;\n"));
        assert!(sql.contains("CREATE OR REPLACE TRIGGER orders_trg_id BEFORE INSERT ON orders"));
        assert!(sql.contains("SELECT orders_seq_id.nextval INTO :new.id FROM dual;"));
        // no inline identity clause
        assert!(sql.contains("    id INTEGER NOT NULL,\n"));
    }

    #[test]
    fn test_drop_table_emits_companion_drops() {
        let profile = profiles::oracle();
        let types = profiles::oracle_types().unwrap();
        let config = EngineConfig::default();
        let builder = SqlBuilder::new(&profile, &types, &config);

        let table = Table::new("orders")
            .with_column(Column::new("id", SqlType::Integer).primary_key().auto_increment());
        let db = Database::new("shop").with_table(table.clone());

        let sql = builder.drop_table(&db, &table).unwrap();
        assert_eq!(
            sql,
            "DROP TABLE orders CASCADE CONSTRAINTS;\n\
             DROP TRIGGER orders_trg_id;\n\
             DROP SEQUENCE orders_seq_id;\n"
        );
    }

    #[test]
    fn test_drop_table_removes_external_foreign_keys_first() {
        let (profile, types, config) = hsqldb_builder_parts();
        let builder = SqlBuilder::new(&profile, &types, &config);

        let a = Table::new("a").with_column(Column::new("pk", SqlType::Integer).primary_key());
        let b = Table::new("b")
            .with_column(Column::new("pk", SqlType::Integer).primary_key())
            .with_column(Column::new("a_pk", SqlType::Integer))
            .with_foreign_key(ForeignKey::new("a", vec![Reference::new("a_pk", "pk")]));
        let db = Database::new("shop").with_table(a.clone()).with_table(b);

        let sql = builder.drop_table(&db, &a).unwrap();
        assert_eq!(
            sql,
            "ALTER TABLE \"b\" DROP CONSTRAINT \"b_fk_a_pk_a\";\n\
             DROP TABLE \"a\" IF EXISTS;\n"
        );
    }

    #[test]
    fn test_create_schema_defers_foreign_keys() {
        let (profile, types, config) = hsqldb_builder_parts();
        let builder = SqlBuilder::new(&profile, &types, &config);

        let db = Database::new("shop")
            .with_table(
                Table::new("b")
                    .with_column(Column::new("pk", SqlType::Integer).primary_key())
                    .with_column(Column::new("a_pk", SqlType::Integer))
                    .with_foreign_key(ForeignKey::new("a", vec![Reference::new("a_pk", "pk")])),
            )
            .with_table(
                Table::new("a").with_column(Column::new("pk", SqlType::Integer).primary_key()),
            );

        let sql = builder.create_schema(&db).unwrap();
        let create_a = sql.find("CREATE TABLE \"a\"").unwrap();
        let create_b = sql.find("CREATE TABLE \"b\"").unwrap();
        let add_fk = sql.find("ADD CONSTRAINT").unwrap();
        assert!(create_a < create_b);
        assert!(create_b < add_fk);
    }

    #[test]
    fn test_cast_expression_truncates_on_text_narrowing() {
        let (profile, types, config) = hsqldb_builder_parts();
        let builder = SqlBuilder::new(&profile, &types, &config);

        let from = Column::new("name", SqlType::Varchar).size("50");
        let to = Column::new("name", SqlType::Varchar).size("10");
        assert_eq!(
            builder.cast_expression(&from, &to).unwrap(),
            "SUBSTR(CAST(\"name\" AS VARCHAR), 1, 10)"
        );

        // widening needs no truncation
        assert_eq!(
            builder.cast_expression(&to, &from).unwrap(),
            "CAST(\"name\" AS VARCHAR(50))"
        );
    }

    #[test]
    fn test_mysql_timestamp_null_default() {
        let profile = profiles::mysql();
        let types = profiles::mysql_types().unwrap();
        let config = EngineConfig::default();
        let builder = SqlBuilder::new(&profile, &types, &config);

        let table = Table::new("t")
            .with_column(Column::new("id", SqlType::Integer).primary_key())
            .with_column(Column::new("seen_at", SqlType::Timestamp));

        let sql = builder.create_table(&table).unwrap();
        assert!(sql.contains("`seen_at` DATETIME NULL"));
    }

    #[test]
    fn test_alteration_sql_preserves_data_across_rebuild() {
        let profile = profiles::oracle();
        let types = profiles::oracle_types().unwrap();
        let mut config = EngineConfig::default();
        config.allow_lossy_changes = true;
        let builder = SqlBuilder::new(&profile, &types, &config);

        let current = Database::new("shop").with_table(
            Table::new("t")
                .with_column(Column::new("id", SqlType::Integer).primary_key())
                .with_column(Column::new("amount", SqlType::Integer)),
        );
        let changes = vec![
            ModelChange::RemoveColumn {
                table_name: "t".to_string(),
                column_name: "amount".to_string(),
            },
            ModelChange::AddColumn {
                table_name: "t".to_string(),
                column: Column::new("amount", SqlType::BigInt),
                next_column: None,
            },
        ];

        let sql = builder.alteration_sql(&current, &changes).unwrap();
        let expected_order = [
            "ALTER TABLE t ADD COLUMN amount_bak NUMBER(38);\n",
            "UPDATE t SET amount_bak = CAST(amount AS NUMBER(38));\n",
            "ALTER TABLE t DROP COLUMN amount;\n",
            "ALTER TABLE t ADD COLUMN amount NUMBER(38);\n",
            "UPDATE t SET amount = amount_bak;\n",
            "ALTER TABLE t DROP COLUMN amount_bak;\n",
        ];
        let mut last = 0;
        for fragment in expected_order {
            let pos = sql
                .find(fragment)
                .unwrap_or_else(|| panic!("missing fragment {:?} in {:?}", fragment, sql));
            assert!(pos >= last, "fragment {:?} out of order", fragment);
            last = pos;
        }
    }

    #[test]
    fn test_alter_column_postgresql_clauses() {
        let profile = profiles::postgresql();
        let types = profiles::postgresql_types().unwrap();
        let config = EngineConfig::default();
        let builder = SqlBuilder::new(&profile, &types, &config);

        let table = Table::new("t")
            .with_column(Column::new("id", SqlType::Integer).primary_key())
            .with_column(Column::new("n", SqlType::Integer));
        let before = Column::new("n", SqlType::Integer);
        let after = Column::new("n", SqlType::BigInt).required();

        let sql = builder.alter_column(&table, &before, &after).unwrap();
        assert!(sql.contains("ALTER TABLE t ALTER COLUMN n TYPE BIGINT USING CAST(n AS BIGINT);"));
        assert!(sql.contains("ALTER TABLE t ALTER COLUMN n SET NOT NULL;"));
    }

    #[test]
    fn test_alter_column_type_unsupported_without_in_place_support() {
        let profile = profiles::oracle();
        let types = profiles::oracle_types().unwrap();
        let config = EngineConfig::default();
        let builder = SqlBuilder::new(&profile, &types, &config);

        let table = Table::new("t").with_column(Column::new("n", SqlType::Integer));
        let err = builder
            .alter_column(
                &table,
                &Column::new("n", SqlType::Integer),
                &Column::new("n", SqlType::Varchar).size("20"),
            )
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFeatureError { .. }));
    }
}
