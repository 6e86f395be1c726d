mod common;

use rusqlite::types::Value;
use tabula::error::{Result, TabulaError};
use tabula::mapping::{Mapped, Row, RowValues, Schema, TableSpec};
use tabula::query::Criteria;
use tabula::table::Table;

#[test]
fn bails_on_empty_table_name() {
    let schema = Schema::new().column("name", "text");
    let outcome = TableSpec::new("", schema);
    assert!(matches!(outcome, Err(TabulaError::Config(_))));
}

#[test]
fn bails_on_empty_schema() {
    let outcome = TableSpec::new("thingy", Schema::new());
    assert!(matches!(outcome, Err(TabulaError::Config(_))));
}

struct Squirrel {
    stash: i64,
}

impl Mapped for Squirrel {
    // no explicit table name: the type identifier is the fallback
    fn schema() -> Schema {
        Schema::new().column("stash", "integer")
    }
    fn to_row(&self) -> RowValues {
        vec![("stash".to_owned(), Value::from(self.stash))]
    }
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self { stash: row.get("stash")? })
    }
}

#[test]
fn table_name_falls_back_to_type_identifier() {
    let spec = TableSpec::of::<Squirrel>().expect("valid spec");
    assert_eq!(spec.name(), "Squirrel");
}

#[test]
fn fallback_named_table_round_trips() {
    let db = common::open();
    let table = Table::<Squirrel>::new(&db).expect("valid mapping");
    table.create().expect("create table");
    table.insert(&Squirrel { stash: 42 }).expect("insert");
    let found = table.find(&Criteria::new()).expect("find all");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].stash, 42);
}

#[test]
fn explicit_spec_overrides_the_record_type() {
    let db = common::open();
    let spec = TableSpec::new(
        "cats_archive",
        Schema::new()
            .column("name", "text primary key")
            .column("age", "integer"),
    )
    .expect("valid spec");
    let table = Table::<common::Cat>::with_spec(&db, spec);
    assert_eq!(table.name(), "cats_archive");
    table.create().expect("create table");
    table.insert(&common::Cat::new("Mochi", 1)).expect("insert");
    assert_eq!(table.find(&Criteria::new()).expect("find all").len(), 1);
}

#[test]
fn schema_provider_contract() {
    let schema = Schema::new()
        .column("name", "text primary key")
        .column("age", "integer");
    assert_eq!(schema.len(), 2);
    assert!(schema.contains("age"));
    assert!(!schema.contains("whiskers"));
    assert_eq!(schema.names(), vec!["name", "age"]);
}
