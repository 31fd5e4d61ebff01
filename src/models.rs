//! Data models for the dashboard pipeline.
//!
//! Raw tables come straight out of a data source. The normalizer turns
//! them into typed [`Table`]s, which the selector and aggregator consume.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type of a normalized column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Real numbers, with `Missing` for anything that failed to parse.
    Numeric,
    /// Arbitrary strings; never missing.
    Text,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Numeric => write!(f, "Numeric"),
            ColumnType::Text => write!(f, "Text"),
        }
    }
}

/// A single cell as read from a data source, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Number(f64),
    Text(String),
}

impl RawCell {
    /// Returns true for empty cells and blank strings.
    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Number(_) => false,
            RawCell::Text(s) => s.trim().is_empty(),
        }
    }
}

/// A table exactly as loaded: headers plus untyped rows.
///
/// Loaders guarantee every row has one cell per header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<RawCell>>) -> Self {
        Self { headers, rows }
    }

    /// Iterate the cells of one column.
    pub fn column_cells(&self, index: usize) -> impl Iterator<Item = &RawCell> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }
}

/// A normalized cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{}", format_number(*v)),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Missing => Ok(()),
        }
    }
}

impl From<&Cell> for RawCell {
    fn from(cell: &Cell) -> Self {
        match cell {
            Cell::Number(v) => RawCell::Number(*v),
            Cell::Text(s) => RawCell::Text(s.clone()),
            Cell::Missing => RawCell::Empty,
        }
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

/// One row of a table; cells are positional and follow the table schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    cells: Vec<Cell>,
}

impl Record {
    pub(crate) fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }
}

/// An immutable, normalized table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
    records: Vec<Record>,
}

impl Table {
    /// Assemble a table; callers guarantee one cell per column in every record.
    pub(crate) fn from_parts(columns: Vec<Column>, records: Vec<Record>) -> Self {
        debug_assert!(records.iter().all(|r| r.cells.len() == columns.len()));
        Self { columns, records }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of a column in the schema.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a cell by column name.
    pub fn cell<'a>(&self, record: &'a Record, name: &str) -> Option<&'a Cell> {
        self.column_index(name).and_then(|i| record.get(i))
    }

    /// Number of missing cells in a column.
    pub fn missing_count(&self, index: usize) -> usize {
        self.records
            .iter()
            .filter(|r| r.get(index).map_or(false, Cell::is_missing))
            .count()
    }
}

impl From<&Table> for RawTable {
    fn from(table: &Table) -> Self {
        RawTable {
            headers: table.columns.iter().map(|c| c.name.clone()).collect(),
            rows: table
                .records
                .iter()
                .map(|r| r.cells.iter().map(RawCell::from).collect())
                .collect(),
        }
    }
}

/// Up to K records sorted descending by a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    /// The column the records were ranked by.
    pub column: String,
    /// Selected records, best first.
    pub records: Vec<Record>,
    #[serde(skip)]
    pub(crate) column_index: usize,
}

impl RankedResult {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The ranked column's value for each selected record.
    pub fn values(&self) -> Vec<Option<f64>> {
        self.records
            .iter()
            .map(|r| r.get(self.column_index).and_then(Cell::as_number))
            .collect()
    }
}

/// A single label/count pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub label: String,
    pub count: usize,
}

/// Ordered label → count mapping.
///
/// Iteration order is decided by whoever built it: descending count for
/// categories, ascending range for buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencySummary {
    entries: Vec<FrequencyEntry>,
}

impl FrequencySummary {
    pub(crate) fn from_entries(entries: Vec<FrequencyEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[FrequencyEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|e| (e.label.as_str(), e.count))
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.count)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Format a number for display, dropping the fraction when it is integral.
pub fn format_number(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    let v = if v == 0.0 { 0.0 } else { v }; // normalize `-0.0`

    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        let s = format!("{v:.2}");
        match s.trim_end_matches('0').trim_end_matches('.') {
            // Tiny negatives round to zero
            "-0" => "0".to_string(),
            trimmed => trimmed.to_string(),
        }
    }
}
