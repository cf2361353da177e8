//! End-to-end tests for ddlforge
//!
//! These exercise the full diff, plan and render pipeline the way a caller
//! would drive it, against the built-in platforms.

use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::config::EngineConfig;
use crate::diff::ModelChange;
use crate::error::Error;
use crate::model::{Column, Database, ForeignKey, Reference, SqlType, Table};
use crate::platform::{platform_for, Platform};

fn empty() -> Database {
    Database::new("test")
}

fn single_table() -> Database {
    Database::new("test").with_table(
        Table::new("T")
            .with_column(Column::new("PK", SqlType::Integer).primary_key())
            .with_column(Column::new("NAME", SqlType::Varchar).size("20")),
    )
}

fn linked_pair() -> Database {
    Database::new("test")
        .with_table(
            Table::new("A").with_column(Column::new("PK", SqlType::Integer).primary_key()),
        )
        .with_table(
            Table::new("B")
                .with_column(Column::new("PK", SqlType::Integer).primary_key())
                .with_column(Column::new("A_PK", SqlType::Integer).required())
                .with_foreign_key(ForeignKey::new("A", vec![Reference::new("A_PK", "PK")])),
        )
}

#[test]
fn test_empty_to_single_table_on_hsqldb() {
    let platform = platform_for("hsqldb").unwrap();
    let config = EngineConfig::default();

    let changes = platform.diff(&empty(), &single_table(), &config);
    assert_eq!(changes.len(), 1);
    assert!(matches!(changes[0], ModelChange::AddTable { .. }));

    let sql = platform
        .migration_sql(&empty(), &single_table(), &config)
        .unwrap();
    assert!(sql.starts_with("CREATE TABLE \"T\""));
    assert!(sql.contains("\"PK\" INTEGER"));
    assert!(sql.contains("\"NAME\" VARCHAR(20)"));
    assert!(sql.contains("PRIMARY KEY (\"PK\")"));
}

#[test]
fn test_round_trip_narrowing_is_not_a_change() {
    let platform = platform_for("hsqldb").unwrap();
    let config = EngineConfig::default();

    let current = Database::new("test").with_table(
        Table::new("T").with_column(Column::new("VALUE", SqlType::TinyInt)),
    );
    let desired = Database::new("test").with_table(
        Table::new("T").with_column(Column::new("VALUE", SqlType::SmallInt)),
    );

    assert!(platform.diff(&current, &desired, &config).is_empty());
}

#[test]
fn test_teardown_order_drops_constraints_first() {
    let platform = platform_for("hsqldb").unwrap();
    let config = EngineConfig::default();

    let changes = platform.diff(&linked_pair(), &empty(), &config);
    let plan = platform.plan(&linked_pair(), changes, &config).unwrap();

    let fk_removal = plan
        .iter()
        .position(|c| matches!(c, ModelChange::RemoveForeignKey { .. }))
        .expect("plan must remove the foreign key");
    let b_removal = plan
        .iter()
        .position(|c| matches!(c, ModelChange::RemoveTable { table_name } if table_name == "B"))
        .expect("plan must remove table B");
    let a_removal = plan
        .iter()
        .position(|c| matches!(c, ModelChange::RemoveTable { table_name } if table_name == "A"))
        .expect("plan must remove table A");
    assert!(fk_removal < b_removal);
    assert!(b_removal < a_removal);

    let sql = platform
        .migration_sql(&linked_pair(), &empty(), &config)
        .unwrap();
    let drop_fk = sql.find("DROP CONSTRAINT").unwrap();
    let drop_b = sql.find("DROP TABLE \"B\"").unwrap();
    let drop_a = sql.find("DROP TABLE \"A\"").unwrap();
    assert!(drop_fk < drop_b);
    assert!(drop_b < drop_a);
}

#[test]
fn test_auto_increment_off_primary_key_fails_generation() {
    let platform = platform_for("hsqldb").unwrap();
    let config = EngineConfig::default();

    let desired = Database::new("test").with_table(
        Table::new("T")
            .with_column(Column::new("PK", SqlType::Integer).primary_key())
            .with_column(Column::new("COUNTER", SqlType::Integer).auto_increment()),
    );

    let err = platform
        .migration_sql(&empty(), &desired, &config)
        .unwrap_err();
    match err {
        Error::ModelValidationError(message) => assert!(message.contains("COUNTER")),
        other => panic!("expected model validation error, got {:?}", other),
    }
}

#[rstest]
#[case("hsqldb")]
#[case("mysql")]
#[case("postgresql")]
#[case("oracle")]
#[case("mssql")]
fn test_generation_is_deterministic(#[case] dialect: &str) {
    let platform = platform_for(dialect).unwrap();
    let config = EngineConfig::default();

    let desired = linked_pair();
    let first = platform.migration_sql(&empty(), &desired, &config).unwrap();
    let second = platform.migration_sql(&empty(), &desired, &config).unwrap();
    assert_eq!(first, second);
}

#[rstest]
#[case("hsqldb")]
#[case("mysql")]
#[case("postgresql")]
#[case("oracle")]
#[case("mssql")]
fn test_plan_apply_reproduces_desired_model(#[case] dialect: &str) {
    let platform = platform_for(dialect).unwrap();
    let config = EngineConfig::default();

    let current = linked_pair();
    let desired = Database::new("test")
        .with_table(
            Table::new("A")
                .with_column(Column::new("PK", SqlType::Integer).primary_key())
                .with_column(Column::new("LABEL", SqlType::Varchar).size("30")),
        )
        .with_table(
            Table::new("C")
                .with_column(Column::new("ID", SqlType::Integer).primary_key())
                .with_column(Column::new("A_PK", SqlType::Integer))
                .with_foreign_key(ForeignKey::new("A", vec![Reference::new("A_PK", "PK")])),
        );

    let changes = platform.diff(&current, &desired, &config);
    let plan = platform.plan(&current, changes, &config).unwrap();

    let mut work = current.clone();
    for change in &plan {
        change.apply(&mut work, config.case_sensitive).unwrap();
    }
    assert!(work.structurally_equal(&desired, config.case_sensitive));
}

#[test]
fn test_case_insensitive_matching_by_default() {
    let platform = platform_for("hsqldb").unwrap();
    let config = EngineConfig::default();

    let current = single_table();
    let mut desired = single_table();
    desired.tables[0].name = "t".to_string();
    desired.tables[0].columns[1].name = "name".to_string();

    assert!(platform.diff(&current, &desired, &config).is_empty());
}

#[test]
fn test_lossy_migration_needs_acknowledgement() {
    let platform = platform_for("hsqldb").unwrap();
    let mut config = EngineConfig::default();

    let current = single_table();
    let mut desired = single_table();
    desired.tables[0].columns[1] = Column::new("NAME", SqlType::Varchar).size("10");

    let err = platform
        .migration_sql(&current, &desired, &config)
        .unwrap_err();
    assert!(matches!(err, Error::LossyChangeError(_)));

    config.allow_lossy_changes = true;
    let sql = platform
        .migration_sql(&current, &desired, &config)
        .unwrap();
    assert!(sql.contains("ALTER TABLE \"T\" ALTER COLUMN \"NAME\" VARCHAR(10);"));
}

#[test]
fn test_mutual_references_create_both_tables_before_constraints() {
    let platform = platform_for("postgresql").unwrap();
    let config = EngineConfig::default();

    let desired = Database::new("test")
        .with_table(
            Table::new("husbands")
                .with_column(Column::new("id", SqlType::Integer).primary_key())
                .with_column(Column::new("wife_id", SqlType::Integer))
                .with_foreign_key(ForeignKey::new("wives", vec![Reference::new("wife_id", "id")])),
        )
        .with_table(
            Table::new("wives")
                .with_column(Column::new("id", SqlType::Integer).primary_key())
                .with_column(Column::new("husband_id", SqlType::Integer))
                .with_foreign_key(ForeignKey::new(
                    "husbands",
                    vec![Reference::new("husband_id", "id")],
                )),
        );

    let sql = platform.migration_sql(&empty(), &desired, &config).unwrap();
    let last_create = sql.rfind("CREATE TABLE").unwrap();
    let first_fk = sql.find("FOREIGN KEY").unwrap();
    assert!(first_fk > last_create);
}

#[test]
fn test_dialects_disagree_on_quoting() {
    let config = EngineConfig::default();
    let desired = single_table();

    let mysql = Platform::mysql().unwrap();
    let sql = mysql.migration_sql(&empty(), &desired, &config).unwrap();
    assert!(sql.contains("CREATE TABLE `T`"));

    let mssql = Platform::mssql().unwrap();
    let sql = mssql.migration_sql(&empty(), &desired, &config).unwrap();
    assert!(sql.contains("CREATE TABLE [T]"));
}

#[test]
fn test_duplicate_table_names_fail_validation() {
    let platform = platform_for("hsqldb").unwrap();
    let config = EngineConfig::default();

    let mut desired = single_table();
    desired.add_table(Table::new("t").with_column(Column::new("id", SqlType::Integer)));

    let err = platform
        .migration_sql(&empty(), &desired, &config)
        .unwrap_err();
    assert!(matches!(err, Error::ModelValidationError(_)));
}
