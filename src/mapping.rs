//! Table descriptors and the record-type contract.
//!
//! A [`TableSpec`] is the static metadata for one mapped table: a name and an
//! ordered column schema. Types that want typed reads and writes implement
//! [`Mapped`], which supplies both, plus conversions to and from flat rows.

// used to bind and read storage values
use rusqlite::types::{FromSql, Value, ValueRef};

use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, TabulaError};

/// Flat column/value pairs, as extracted from a record for insertion.
pub type RowValues = Vec<(String, Value)>;

// ------------- Schema -------------
/// Ordered column declarations for one table.
///
/// Declaration strings are passed to the storage engine verbatim, so they may
/// carry engine-specific constraints ("integer primary key", "text not null").
/// Declaration order is the canonical column order for INSERT and CREATE.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<(String, String)>,
}

impl Schema {
    pub fn new() -> Self {
        Self { columns: Vec::new() }
    }
    /// Append a column with its type declaration.
    pub fn column(mut self, name: &str, declaration: &str) -> Self {
        self.columns.push((name.to_owned(), declaration.to_owned()));
        self
    }
    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().map(|(n, d)| (n.as_str(), d.as_str()))
    }
    /// Column names in declared order.
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }
    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }
    pub fn len(&self) -> usize {
        self.columns.len()
    }
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ------------- TableSpec -------------
/// Static metadata (name + column schema) describing one mapped table.
#[derive(Debug, Clone)]
pub struct TableSpec {
    name: String,
    schema: Schema,
}

impl TableSpec {
    /// A spec is only constructible in a usable state: both the name and the
    /// schema must be non-empty, otherwise this is a configuration error.
    pub fn new(name: impl Into<String>, schema: Schema) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(TabulaError::Config(
                "no name for table; specify one explicitly or implement `Mapped::table_name`"
                    .to_owned(),
            ));
        }
        if schema.is_empty() {
            return Err(TabulaError::Config(format!(
                "no schema for table '{name}'; declare at least one column"
            )));
        }
        Ok(Self { name, schema })
    }
    /// Derive a spec from a record type.
    pub fn of<T: Mapped>() -> Result<Self> {
        Self::new(T::table_name(), T::schema())
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

impl fmt::Display for TableSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` ({} columns)", self.name, self.schema.len())
    }
}

// ------------- Mapped -------------
/// The contract a record type fulfills to be mapped onto a table.
///
/// The schema is always obtained through the provider function; types with a
/// static schema simply return it. Instantiation on read goes through the
/// explicit [`Mapped::from_row`] factory rather than any runtime
/// introspection, so a type stays in full control of its own construction.
pub trait Mapped {
    /// Table name. Falls back to the type's own identifier.
    fn table_name() -> String {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full).to_owned()
    }
    /// Column schema provider.
    fn schema() -> Schema;
    /// Flatten into column/value pairs covering every schema column.
    fn to_row(&self) -> RowValues;
    /// Instantiate from a result row.
    fn from_row(row: &Row) -> Result<Self>
    where
        Self: Sized;
}

// ------------- Row -------------
/// One result row, cells keyed by column name.
#[derive(Debug, Clone, Default)]
pub struct Row {
    cells: HashMap<String, Value>,
}

impl Row {
    pub fn from_pairs<S, I>(pairs: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Value)>,
    {
        Self {
            cells: pairs.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }
    /// Typed access to one cell. A missing column or a value the target type
    /// cannot represent is a mapping error.
    pub fn get<T: FromSql>(&self, column: &str) -> Result<T> {
        let value = self
            .cells
            .get(column)
            .ok_or_else(|| TabulaError::Mapping(format!("no column '{column}' in row")))?;
        T::column_result(ValueRef::from(value))
            .map_err(|e| TabulaError::Mapping(format!("column '{column}': {e}")))
    }
    /// Untyped access to one cell.
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }
    /// Move one cell out of the row.
    pub fn take(mut self, column: &str) -> Result<Value> {
        self.cells
            .remove(column)
            .ok_or_else(|| TabulaError::Mapping(format!("no column '{column}' in row")))
    }
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }
    pub fn len(&self) -> usize {
        self.cells.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
