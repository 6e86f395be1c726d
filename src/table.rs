//! The table gateway: CRUD over one mapped table with memoized statements.
//!
//! A [`Table`] borrows a caller-owned [`Connection`] and owns a per-table
//! memo cache mapping generated SQL text to its compiled [`Statement`].
//! Statements are compiled lazily on first use and reused for as long as the
//! gateway lives; the cache is never evicted. INSERT, CREATE and DROP have
//! exactly one canonical form per table and get fixed slots instead of
//! text-keyed entries.
//!
//! Execution is synchronous and single-threaded (the connection is not
//! shareable across threads), so the memo sits behind a `RefCell` rather
//! than a lock.

// used for persistence
use rusqlite::types::{ToSql, Value};
use rusqlite::{Connection, Statement};

use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::BuildHasherDefault;
use std::marker::PhantomData;

use seahash::SeaHasher;
use tracing::debug;

use crate::error::{Result, TabulaError};
use crate::mapping::{Mapped, Row, TableSpec};
use crate::query::{self, Changes, Criteria};

pub type MemoHasher = BuildHasherDefault<SeaHasher>;

// ------------- Memo -------------
/// Compiled statements for one table, keyed by the SQL text that produced
/// them, plus fixed slots for the canonical single-form statements.
struct Memo<'db> {
    shaped: HashMap<String, Statement<'db>, MemoHasher>,
    insert: Option<Statement<'db>>,
    create: Option<Statement<'db>>,
    drop: Option<Statement<'db>>,
}

impl<'db> Memo<'db> {
    fn new() -> Self {
        Self {
            shaped: HashMap::default(),
            insert: None,
            create: None,
            drop: None,
        }
    }
}

// ------------- Table -------------
/// Gateway for one mapped table on one connection.
pub struct Table<'db, T: Mapped> {
    db: &'db Connection,
    spec: TableSpec,
    memo: RefCell<Memo<'db>>,
    record: PhantomData<T>,
}

impl<'db, T: Mapped> Table<'db, T> {
    /// Construct a gateway for `T`, validating its name and schema.
    pub fn new(db: &'db Connection) -> Result<Self> {
        Ok(Self::with_spec(db, TableSpec::of::<T>()?))
    }
    /// Construct a gateway over an already validated spec, for callers that
    /// name the table explicitly instead of through the record type.
    pub fn with_spec(db: &'db Connection, spec: TableSpec) -> Self {
        Self {
            db,
            spec,
            memo: RefCell::new(Memo::new()),
            record: PhantomData,
        }
    }
    pub fn spec(&self) -> &TableSpec {
        &self.spec
    }
    pub fn name(&self) -> &str {
        self.spec.name()
    }
    /// Number of shape-keyed statements compiled so far.
    pub fn memoized(&self) -> usize {
        self.memo.borrow().shaped.len()
    }

    /// Create the table if it does not exist yet.
    pub fn create(&self) -> Result<()> {
        self.with_canonical(
            |memo| &mut memo.create,
            || query::create(&self.spec),
            |stmt| {
                stmt.execute([])?;
                Ok(())
            },
        )
    }
    /// Drop the table. Dropping a nonexistent table is an engine error.
    pub fn drop(&self) -> Result<()> {
        self.with_canonical(
            |memo| &mut memo.drop,
            || query::drop(&self.spec),
            |stmt| {
                stmt.execute([])?;
                Ok(())
            },
        )
    }
    /// Insert one record; every schema column must be covered by
    /// [`Mapped::to_row`]. Returns the number of affected rows.
    pub fn insert(&self, record: &T) -> Result<usize> {
        let params: Vec<(String, Value)> = record
            .to_row()
            .into_iter()
            .map(|(name, value)| (format!("@{name}"), value))
            .collect();
        self.with_canonical(
            |memo| &mut memo.insert,
            || query::insert(&self.spec),
            |stmt| Ok(stmt.execute(bindable(&params).as_slice())?),
        )
    }

    /// All matching records, instantiated through [`Mapped::from_row`].
    /// Always selects the full schema; projections belong to
    /// [`Table::find_rows`] and [`Table::pluck`].
    pub fn find(&self, criteria: &Criteria) -> Result<Vec<T>> {
        let rows = self.select_rows(&criteria.unprojected())?;
        rows.iter().map(T::from_row).collect()
    }
    /// The first matching record, if any. Shares its compiled statement with
    /// [`Table::find`] for the same criteria shape; only one row is fetched.
    pub fn first(&self, criteria: &Criteria) -> Result<Option<T>> {
        match self.select_first(&criteria.unprojected())? {
            Some(row) => Ok(Some(T::from_row(&row)?)),
            None => Ok(None),
        }
    }
    /// All matching rows as plain [`Row`]s, honoring any projection.
    pub fn find_rows(&self, criteria: &Criteria) -> Result<Vec<Row>> {
        self.select_rows(criteria)
    }
    /// The first matching row, if any, honoring any projection.
    pub fn first_row(&self, criteria: &Criteria) -> Result<Option<Row>> {
        self.select_first(criteria)
    }
    /// The values of a single column across all matching rows.
    pub fn pluck(&self, column: &str, criteria: &Criteria) -> Result<Vec<Value>> {
        let projected = criteria.clone().cols([column]);
        let rows = self.select_rows(&projected)?;
        rows.into_iter().map(|row| row.take(column)).collect()
    }
    /// The value of a single column in the first matching row, if any.
    pub fn pluck_first(&self, column: &str, criteria: &Criteria) -> Result<Option<Value>> {
        let projected = criteria.clone().cols([column]);
        match self.select_first(&projected)? {
            Some(row) => Ok(Some(row.take(column)?)),
            None => Ok(None),
        }
    }

    /// Delete matching rows and return how many went away. Empty criteria
    /// deletes every row in the table.
    pub fn remove(&self, criteria: &Criteria) -> Result<usize> {
        let sql = query::delete(&self.spec, criteria);
        let params = criteria.filter_params("");
        self.with_shaped(sql, |stmt| Ok(stmt.execute(bindable(&params).as_slice())?))
    }
    /// UPDATE OR REPLACE matching rows with the given assignments, returning
    /// how many rows changed.
    pub fn update(&self, changes: &Changes, criteria: &Criteria) -> Result<usize> {
        if changes.is_empty() {
            return Err(TabulaError::Execution(format!(
                "update of `{}` requires at least one assignment",
                self.spec.name()
            )));
        }
        let sql = query::update(&self.spec, changes, criteria);
        let params = query::merge_update_params(changes, criteria);
        self.with_shaped(sql, |stmt| Ok(stmt.execute(bindable(&params).as_slice())?))
    }

    /// Run `work` atomically. Atomicity is entirely the engine's: commit on
    /// success, rollback when the transaction guard drops on error.
    pub fn transaction<R>(&self, work: impl FnOnce(&Self) -> Result<R>) -> Result<R> {
        let tx = self.db.unchecked_transaction()?;
        let out = work(self)?;
        tx.commit()?;
        Ok(out)
    }

    fn select_rows(&self, criteria: &Criteria) -> Result<Vec<Row>> {
        let sql = query::select(&self.spec, criteria);
        let params = select_params(criteria);
        self.with_shaped(sql, |stmt| query_rows(stmt, &params))
    }
    fn select_first(&self, criteria: &Criteria) -> Result<Option<Row>> {
        let sql = query::select(&self.spec, criteria);
        let params = select_params(criteria);
        self.with_shaped(sql, |stmt| query_first(stmt, &params))
    }

    /// Look up or compile the statement for `sql`, then run `work` on it.
    fn with_shaped<R>(
        &self,
        sql: String,
        work: impl FnOnce(&mut Statement<'db>) -> Result<R>,
    ) -> Result<R> {
        let mut memo = self.memo.borrow_mut();
        let stmt = match memo.shaped.entry(sql) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => {
                debug!(table = %self.spec.name(), sql = %slot.key(), "compiling statement");
                let compiled = self.db.prepare(slot.key())?;
                slot.insert(compiled)
            }
        };
        work(stmt)
    }
    /// Same discipline for the single-form statements living in fixed slots.
    fn with_canonical<R>(
        &self,
        slot_of: impl for<'m> FnOnce(&'m mut Memo<'db>) -> &'m mut Option<Statement<'db>>,
        sql_of: impl FnOnce() -> String,
        work: impl FnOnce(&mut Statement<'db>) -> Result<R>,
    ) -> Result<R> {
        let mut memo = self.memo.borrow_mut();
        let slot = slot_of(&mut memo);
        if slot.is_none() {
            let sql = sql_of();
            debug!(table = %self.spec.name(), sql = %sql, "compiling statement");
            *slot = Some(self.db.prepare(&sql)?);
        }
        // the slot was filled on the miss path above
        work(slot.as_mut().expect("compiled statement in slot"))
    }
}

fn select_params(criteria: &Criteria) -> Vec<(String, Value)> {
    let mut params = criteria.filter_params("");
    params.extend(criteria.paging_params());
    params
}

fn bindable(params: &[(String, Value)]) -> Vec<(&str, &dyn ToSql)> {
    params
        .iter()
        .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
        .collect()
}

fn query_rows(stmt: &mut Statement<'_>, params: &[(String, Value)]) -> Result<Vec<Row>> {
    let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_owned).collect();
    let mut rows = stmt.query(bindable(params).as_slice())?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(materialize(row, &columns)?);
    }
    Ok(out)
}

fn query_first(stmt: &mut Statement<'_>, params: &[(String, Value)]) -> Result<Option<Row>> {
    let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_owned).collect();
    let mut rows = stmt.query(bindable(params).as_slice())?;
    match rows.next()? {
        Some(row) => Ok(Some(materialize(row, &columns)?)),
        None => Ok(None),
    }
}

fn materialize(row: &rusqlite::Row<'_>, columns: &[String]) -> Result<Row> {
    let mut cells = Vec::with_capacity(columns.len());
    for (index, name) in columns.iter().enumerate() {
        cells.push((name.clone(), row.get::<_, Value>(index)?));
    }
    Ok(Row::from_pairs(cells))
}
