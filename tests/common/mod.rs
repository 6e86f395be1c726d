#![allow(dead_code)]

use rusqlite::Connection;
use rusqlite::types::Value;
use tabula::error::Result;
use tabula::mapping::{Mapped, Row, RowValues, Schema};
use tabula::table::Table;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cat {
    pub name: String,
    pub age: i64,
}

impl Cat {
    pub fn new(name: &str, age: i64) -> Self {
        Self { name: name.to_owned(), age }
    }
}

impl Mapped for Cat {
    fn table_name() -> String {
        "cats".to_owned()
    }
    fn schema() -> Schema {
        Schema::new()
            .column("name", "text primary key")
            .column("age", "integer")
    }
    fn to_row(&self) -> RowValues {
        vec![
            ("name".to_owned(), Value::from(self.name.clone())),
            ("age".to_owned(), Value::from(self.age)),
        ]
    }
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            name: row.get("name")?,
            age: row.get("age")?,
        })
    }
}

pub fn cats() -> Vec<Cat> {
    vec![
        Cat::new("Nutmeg", 4),
        Cat::new("Basil", 4),
        Cat::new("Oregano", 4),
        Cat::new("Allspice", 2),
        Cat::new("Musashi", 5),
    ]
}

pub fn open() -> Connection {
    Connection::open_in_memory().expect("in-memory database")
}

pub fn seeded<'db>(db: &'db Connection) -> Table<'db, Cat> {
    let table = Table::<Cat>::new(db).expect("valid mapping");
    table.create().expect("create table");
    for cat in cats() {
        table.insert(&cat).expect("insert seed row");
    }
    table
}
