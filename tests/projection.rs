mod common;

use rusqlite::types::Value;
use tabula::error::TabulaError;
use tabula::query::Criteria;

#[test]
fn projected_rows_carry_only_requested_columns() {
    let db = common::open();
    let table = common::seeded(&db);
    let rows = table
        .find_rows(&Criteria::new().cols(["name"]).sort_by("name"))
        .expect("find projected rows");
    assert_eq!(rows.len(), 5);
    for row in &rows {
        assert_eq!(row.len(), 1);
        assert!(row.get::<String>("name").is_ok());
        assert!(matches!(
            row.get::<i64>("age"),
            Err(TabulaError::Mapping(_))
        ));
    }
}

#[test]
fn pluck_returns_bare_scalars() {
    let db = common::open();
    let table = common::seeded(&db);
    let plucked = table
        .pluck("name", &Criteria::new().sort_by("name").eq("age", 4))
        .expect("pluck names");
    assert_eq!(
        plucked,
        vec![
            Value::from("Basil".to_owned()),
            Value::from("Nutmeg".to_owned()),
            Value::from("Oregano".to_owned()),
        ]
    );
}

#[test]
fn first_row_and_pluck_first() {
    let db = common::open();
    let table = common::seeded(&db);
    let row = table
        .first_row(&Criteria::new().cols(["age"]).sort_by("name"))
        .expect("first projected row")
        .expect("a row");
    assert_eq!(row.get::<i64>("age").expect("age cell"), 2); // Allspice

    let scalar = table
        .pluck_first("name", &Criteria::new().sort_by("name"))
        .expect("pluck first");
    assert_eq!(scalar, Some(Value::from("Allspice".to_owned())));

    table.remove(&Criteria::new()).expect("remove all");
    assert_eq!(table.pluck_first("name", &Criteria::new()).expect("pluck first"), None);
}

#[test]
fn typed_reads_ignore_projection_directives() {
    let db = common::open();
    let table = common::seeded(&db);
    // a typed record needs the full schema, so the projection is dropped
    let found = table
        .find(&Criteria::new().cols(["name"]).eq("name", "Nutmeg".to_owned()))
        .expect("typed find");
    assert_eq!(found, vec![common::Cat::new("Nutmeg", 4)]);
}
