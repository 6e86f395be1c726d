//! Criteria and the pure SQL-fragment builders.
//!
//! Every builder is a pure function of a [`TableSpec`] and a [`Criteria`]
//! (or [`Changes`]) and returns SQL text with named `@` placeholders, or an
//! empty string when the fragment does not apply. Fragments are assembled
//! with single-space joins, skipping empties.
//!
//! The text must be a deterministic function of the criteria *shape*: the
//! memo cache in [`crate::table`] is keyed by the generated text, so two
//! criteria with the same columns, sort keys and paging directives must
//! produce byte-identical SQL no matter how they were built up. Filter and
//! sort entries therefore live in ordered maps, and projections are sorted
//! before emission.

use rusqlite::types::Value;

use std::collections::{BTreeMap, BTreeSet};

use crate::mapping::TableSpec;

// ------------- Criteria -------------
/// Sort direction for one criteria sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }
}

/// A structured filter/sort/paging/projection request.
///
/// Equality predicates (AND-combined) are kept apart from the directives
/// controlling sort order, paging and projection, so a column may be called
/// anything without clashing with a directive.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    filter: BTreeMap<String, Value>,
    sort: BTreeMap<String, Direction>,
    limit: Option<u64>,
    offset: Option<u64>,
    cols: BTreeSet<String>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }
    /// Require `column = value`. Predicates combine with logical AND.
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filter.insert(column.to_owned(), value.into());
        self
    }
    /// Sort by `column` in the given direction.
    pub fn sort(mut self, column: &str, direction: Direction) -> Self {
        self.sort.insert(column.to_owned(), direction);
        self
    }
    /// Sort by a `"field"` or `"field:direction"` token. Any direction token
    /// other than a case-insensitive `desc` means ascending.
    pub fn sort_by(self, spec: &str) -> Self {
        let (column, direction) = match spec.split_once(':') {
            Some((column, token)) if token.eq_ignore_ascii_case("desc") => {
                (column, Direction::Descending)
            }
            Some((column, _)) => (column, Direction::Ascending),
            None => (spec, Direction::Ascending),
        };
        self.sort(column, direction)
    }
    /// Return at most `n` rows.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }
    /// Skip the first `n` rows. Only takes effect combined with a limit.
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }
    /// Restrict the projection to the given columns, replacing any previous
    /// restriction. An empty projection means every schema column.
    pub fn cols<S, I>(mut self, columns: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        self.cols = columns.into_iter().map(Into::into).collect();
        self
    }

    /// The equality predicates, ordered by column.
    pub fn filter(&self) -> &BTreeMap<String, Value> {
        &self.filter
    }

    /// The same criteria without a projection. Typed reads always select the
    /// full schema, since a partial row cannot instantiate a record.
    pub(crate) fn unprojected(&self) -> Criteria {
        let mut plain = self.clone();
        plain.cols.clear();
        plain
    }

    /// Bind values for the equality predicates, names matching the
    /// placeholders [`where_clause`] emits for the same prefix.
    pub(crate) fn filter_params(&self, prefix: &str) -> Vec<(String, Value)> {
        self.filter
            .iter()
            .map(|(name, value)| (format!("@{prefix}{name}"), value.clone()))
            .collect()
    }
    /// Bind values for the paging placeholders. The offset is only bound
    /// when a limit exists, mirroring [`limit_clause`]; the engine rejects
    /// bind names absent from the statement.
    pub(crate) fn paging_params(&self) -> Vec<(String, Value)> {
        let mut params = Vec::new();
        if let Some(limit) = self.limit {
            params.push(("@_limit".to_owned(), Value::from(limit as i64)));
            if let Some(offset) = self.offset {
                params.push(("@_offset".to_owned(), Value::from(offset as i64)));
            }
        }
        params
    }
}

// ------------- Changes -------------
/// Column assignments for an UPDATE, ordered for deterministic SQL text.
#[derive(Debug, Clone, Default)]
pub struct Changes {
    set: BTreeMap<String, Value>,
}

impl Changes {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.set.insert(column.to_owned(), value.into());
        self
    }
    pub fn assignments(&self) -> &BTreeMap<String, Value> {
        &self.set
    }
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

// ------------- Fragment builders -------------
fn assemble<I: IntoIterator<Item = String>>(fragments: I) -> String {
    fragments
        .into_iter()
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `WHERE c1 = @<prefix>c1 AND c2 = @<prefix>c2 …`, or nothing for an empty
/// filter set (match all rows).
pub fn where_clause(criteria: &Criteria, prefix: &str) -> String {
    if criteria.filter.is_empty() {
        return String::new();
    }
    let predicates: Vec<String> = criteria
        .filter
        .keys()
        .map(|name| format!("{name} = @{prefix}{name}"))
        .collect();
    format!("WHERE {}", predicates.join(" AND "))
}

/// `ORDER BY \`f1\` ASC, \`f2\` DESC …` over the sort keys, alphabetically
/// by field, or nothing when no sort was requested.
pub fn order_clause(criteria: &Criteria) -> String {
    if criteria.sort.is_empty() {
        return String::new();
    }
    let terms: Vec<String> = criteria
        .sort
        .iter()
        .map(|(name, direction)| format!("`{name}` {}", direction.keyword()))
        .collect();
    format!("ORDER BY {}", terms.join(", "))
}

/// `LIMIT @_limit [OFFSET @_offset]`. The limit governs presence: an offset
/// on its own emits nothing.
pub fn limit_clause(criteria: &Criteria) -> String {
    match (criteria.limit, criteria.offset) {
        (Some(_), Some(_)) => "LIMIT @_limit OFFSET @_offset".to_owned(),
        (Some(_), None) => "LIMIT @_limit".to_owned(),
        _ => String::new(),
    }
}

/// Full SELECT over the requested projection (all schema columns when none
/// was requested), columns alphabetically sorted.
pub fn select(table: &TableSpec, criteria: &Criteria) -> String {
    let mut columns: Vec<&str> = if criteria.cols.is_empty() {
        table.schema().names()
    } else {
        criteria.cols.iter().map(String::as_str).collect()
    };
    columns.sort_unstable();
    assemble([
        format!(
            "SELECT {} FROM `{}`",
            columns.join(", "),
            table.name()
        ),
        where_clause(criteria, ""),
        order_clause(criteria),
        limit_clause(criteria),
    ])
}

/// `DELETE FROM \`t\` [WHERE …]`. No criteria deletes every row.
pub fn delete(table: &TableSpec, criteria: &Criteria) -> String {
    assemble([
        format!("DELETE FROM `{}`", table.name()),
        where_clause(criteria, ""),
    ])
}

/// The single canonical INSERT: every schema column, declared order.
pub fn insert(table: &TableSpec) -> String {
    let names = table.schema().names();
    let placeholders: Vec<String> = names.iter().map(|name| format!("@{name}")).collect();
    format!(
        "INSERT INTO `{}` ({}) VALUES ({})",
        table.name(),
        names.join(", "),
        placeholders.join(", ")
    )
}

/// Idempotent CREATE, type declarations verbatim from the schema.
pub fn create(table: &TableSpec) -> String {
    let columns: Vec<String> = table
        .schema()
        .columns()
        .map(|(name, declaration)| format!("`{name}` {declaration}"))
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS `{}` ({})",
        table.name(),
        columns.join(", ")
    )
}

/// Unconditional DROP. Dropping a nonexistent table is an engine error.
pub fn drop(table: &TableSpec) -> String {
    format!("DROP TABLE `{}`", table.name())
}

/// `UPDATE OR REPLACE \`t\` SET c = @value_c … [WHERE c = @clause_c …]`.
///
/// The `value_`/`clause_` prefixes keep a column that appears both in the
/// changes and in the criteria from colliding on one placeholder.
pub fn update(table: &TableSpec, changes: &Changes, criteria: &Criteria) -> String {
    let assignments: Vec<String> = changes
        .assignments()
        .keys()
        .map(|name| format!("{name} = @value_{name}"))
        .collect();
    assemble([
        format!(
            "UPDATE OR REPLACE `{}` SET {}",
            table.name(),
            assignments.join(", ")
        ),
        where_clause(criteria, "clause_"),
    ])
}

/// The flat bind list for a compiled UPDATE: changes re-keyed under
/// `@value_<c>`, criteria predicates under `@clause_<c>`.
pub fn merge_update_params(changes: &Changes, criteria: &Criteria) -> Vec<(String, Value)> {
    let mut params: Vec<(String, Value)> = changes
        .assignments()
        .iter()
        .map(|(name, value)| (format!("@value_{name}"), value.clone()))
        .collect();
    params.extend(criteria.filter_params("clause_"));
    params
}
