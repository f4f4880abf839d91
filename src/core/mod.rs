//! Core data structures and types for the webts edit-history pipeline

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod value;
pub use value::Value;

/// Kind of an RDF term as reported by a SPARQL endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermKind {
    #[serde(rename = "uri")]
    Uri,
    #[serde(rename = "literal", alias = "typed-literal")]
    Literal,
    #[serde(rename = "bnode")]
    BlankNode,
}

/// One bound value inside a query result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    #[serde(rename = "type")]
    pub kind: TermKind,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(default, rename = "xml:lang", skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl Term {
    pub fn uri(value: &str) -> Self {
        Self { kind: TermKind::Uri, value: value.to_string(), datatype: None, lang: None }
    }

    pub fn literal(value: &str) -> Self {
        Self { kind: TermKind::Literal, value: value.to_string(), datatype: None, lang: None }
    }

    pub fn blank_node(value: &str) -> Self {
        Self { kind: TermKind::BlankNode, value: value.to_string(), datatype: None, lang: None }
    }
}

/// One row of raw query output: role name (query variable) to bound term.
/// Roles vary per row; the secondary pair is absent when the OPTIONAL block did not match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryRecord {
    pub bindings: BTreeMap<String, Term>,
}

impl QueryRecord {
    pub fn new() -> Self {
        Self { bindings: BTreeMap::new() }
    }

    /// Builder-style insertion, mostly for tests and adapters.
    pub fn with(mut self, role: &str, term: Term) -> Self {
        self.bindings.insert(role.to_string(), term);
        self
    }

    pub fn get(&self, role: &str) -> Option<&Term> {
        self.bindings.get(role)
    }

    pub fn value_of(&self, role: &str) -> Option<&str> {
        self.bindings.get(role).map(|t| t.value.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.bindings.values().map(|t| t.value.as_str())
    }
}

/// Per blank-node accumulator built while scanning revision facts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeAggregate {
    pub revision_count: i64,
    pub month: Option<NaiveDate>,
    pub size_revision: f64,
}

/// Time index of a table row. `Unset` collects every node whose month never resolved
/// and orders before all months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BucketKey {
    Unset,
    Month(NaiveDate),
}

impl BucketKey {
    pub fn month(&self) -> Option<NaiveDate> {
        match self {
            BucketKey::Unset => None,
            BucketKey::Month(d) => Some(*d),
        }
    }
}

impl From<Option<NaiveDate>> for BucketKey {
    fn from(month: Option<NaiveDate>) -> Self {
        month.map_or(BucketKey::Unset, BucketKey::Month)
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Unset => write!(f, "unset"),
            BucketKey::Month(d) => write!(f, "{}", d.format("%Y-%m")),
        }
    }
}

/// Summed revision totals for one time bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeBucket {
    pub revision_count: i64,
    pub size_revision: f64,
}

impl TimeBucket {
    /// Adds a node's totals. Returns `None`, leaving the bucket untouched, when
    /// the revision count would overflow.
    pub fn add(&mut self, node: &NodeAggregate) -> Option<()> {
        self.revision_count = self.revision_count.checked_add(node.revision_count)?;
        self.size_revision += node.size_revision;
        Some(())
    }
}

/// Numeric columns of an [`EntityTimeSeriesTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    NumRev,
    SizeRev,
}

impl Column {
    pub const ALL: [Column; 2] = [Column::NumRev, Column::SizeRev];

    pub fn name(&self) -> &'static str {
        match self {
            Column::NumRev => "num_rev",
            Column::SizeRev => "size_rev",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub index: BucketKey,
    pub num_rev: i64,
    pub size_rev: f64,
}

/// Time-indexed table with columns `num_rev` and `size_rev`, rows sorted ascending by index.
/// Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityTimeSeriesTable {
    rows: Vec<TableRow>,
}

impl EntityTimeSeriesTable {
    pub fn from_buckets(buckets: BTreeMap<BucketKey, TimeBucket>) -> Self {
        let rows = buckets
            .into_iter()
            .map(|(index, b)| TableRow {
                index,
                num_rev: b.revision_count,
                size_rev: b.size_revision,
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, column: Column) -> Vec<f64> {
        self.rows
            .iter()
            .map(|r| match column {
                Column::NumRev => r.num_rev as f64,
                Column::SizeRev => r.size_rev,
            })
            .collect()
    }

    /// `None` when the sum does not fit in an `i64`.
    pub fn total_revisions(&self) -> Option<i64> {
        self.rows.iter().try_fold(0i64, |acc, r| acc.checked_add(r.num_rev))
    }

    /// Last resolved month of the index, ignoring the `Unset` bucket.
    pub fn last_month(&self) -> Option<NaiveDate> {
        self.rows.iter().rev().find_map(|r| r.index.month())
    }

    /// Index and value of the column maximum; the first occurrence wins on ties.
    pub fn peak(&self, column: Column) -> Option<(BucketKey, f64)> {
        let values = self.column(column);
        let mut best: Option<(BucketKey, f64)> = None;
        for (row, value) in self.rows.iter().zip(values) {
            match best {
                Some((_, v)) if v >= value => {}
                _ => best = Some((row.index, value)),
            }
        }
        best
    }
}

/// Scalar facts about an entity, filled in while scanning its records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityAttributes {
    pub birth_date: Option<Value>,
    pub death_date: Option<Value>,
    pub important_dates: Vec<Value>,
    pub unique_contributors: Option<i64>,
}

/// Attributes and table of one entity, stored once and read many times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub name: String,
    pub attributes: EntityAttributes,
    pub table: EntityTimeSeriesTable,
}

/// Repository-assigned opaque identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn test_unset_orders_first() {
        assert!(BucketKey::Unset < BucketKey::Month(month(1900, 1)));
    }

    #[test]
    fn test_table_accessors() {
        let mut buckets = BTreeMap::new();
        buckets.insert(BucketKey::Month(month(2010, 2)), TimeBucket { revision_count: 4, size_revision: 1.5 });
        buckets.insert(BucketKey::Unset, TimeBucket { revision_count: 1, size_revision: 0.0 });
        buckets.insert(BucketKey::Month(month(2010, 1)), TimeBucket { revision_count: 9, size_revision: 2.5 });
        let table = EntityTimeSeriesTable::from_buckets(buckets);

        assert_eq!(table.len(), 3);
        assert_eq!(table.column(Column::NumRev), vec![1.0, 9.0, 4.0]);
        assert_eq!(table.total_revisions(), Some(14));
        assert_eq!(table.last_month(), Some(month(2010, 2)));
        assert_eq!(table.peak(Column::NumRev), Some((BucketKey::Month(month(2010, 1)), 9.0)));
        assert_eq!(format!("{}", table.rows()[1].index), "2010-01");
    }
}
