//! Tabula – a dead simple table mapper for SQLite.
//!
//! Tabula translates declarative, structured query descriptions into
//! parameterized SQL text and caches the resulting prepared statements per
//! table. Each mapped table gets a fixed set of canonical operations
//! (select, insert, update, delete, create, drop); there is no planning, no
//! pooling, no migrations and no relations. The substance is the
//! SQL-fragment builder and the memoization discipline around prepared
//! statements; the storage engine (rusqlite) owns durability, atomicity and
//! every runtime constraint.
//!
//! ## Modules
//! * [`mapping`] – Table descriptors ([`mapping::TableSpec`]), the
//!   [`mapping::Mapped`] record contract and result [`mapping::Row`]s.
//! * [`query`] – [`query::Criteria`]/[`query::Changes`] plus the pure
//!   SQL-fragment builders. Generated text is a deterministic function of
//!   the criteria shape, which is what makes text-keyed memoization sound.
//! * [`table`] – The [`table::Table`] gateway wrapping a connection, with a
//!   per-table memo cache of compiled statements (never evicted, one entry
//!   per distinct SQL shape, fixed slots for INSERT/CREATE/DROP).
//! * [`error`] – [`error::TabulaError`] and the crate [`error::Result`].
//!
//! ## Quick Start
//! ```
//! use rusqlite::Connection;
//! use rusqlite::types::Value;
//! use tabula::error::Result;
//! use tabula::mapping::{Mapped, Row, RowValues, Schema};
//! use tabula::query::Criteria;
//! use tabula::table::Table;
//!
//! struct Cat { name: String, age: i64 }
//!
//! impl Mapped for Cat {
//!     fn table_name() -> String { "cats".to_owned() }
//!     fn schema() -> Schema {
//!         Schema::new()
//!             .column("name", "text primary key")
//!             .column("age", "integer")
//!     }
//!     fn to_row(&self) -> RowValues {
//!         vec![
//!             ("name".to_owned(), Value::from(self.name.clone())),
//!             ("age".to_owned(), Value::from(self.age)),
//!         ]
//!     }
//!     fn from_row(row: &Row) -> Result<Self> {
//!         Ok(Self { name: row.get("name")?, age: row.get("age")? })
//!     }
//! }
//!
//! let db = Connection::open_in_memory().unwrap();
//! let cats = Table::<Cat>::new(&db).unwrap();
//! cats.create().unwrap();
//! cats.insert(&Cat { name: "Nutmeg".to_owned(), age: 4 }).unwrap();
//! let found = cats.find(&Criteria::new().eq("age", 4)).unwrap();
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].name, "Nutmeg");
//! ```
//!
//! ## Errors
//! Configuration problems (missing name, empty schema) fail gateway
//! construction; everything the engine reports (compilation errors,
//! constraint violations, dropped tables) propagates verbatim as
//! [`error::TabulaError::Sql`]. Nothing is swallowed, retried or
//! reinterpreted; the only local diagnostics are `tracing` debug events
//! emitted when a statement is first compiled.

pub mod error;
pub mod mapping;
pub mod query;
pub mod table;
