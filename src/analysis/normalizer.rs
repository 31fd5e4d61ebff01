//! Column normalization.
//!
//! Turns a [`RawTable`] into a typed [`Table`]. Every column ends up either
//! Numeric (unparseable values become `Missing`) or Text (every value is
//! coerced to a string). Normalization is total: it never fails and always
//! keeps the input's row and column counts.

use crate::models::{Cell, Column, ColumnType, RawCell, RawTable, Record, Table};
use std::collections::HashSet;
use tracing::debug;

/// Minimum share of non-blank values that must parse as numbers for an
/// undeclared column to be treated as numeric.
pub const NUMERIC_INFERENCE_THRESHOLD: f64 = 0.5;

/// Declared semantic types for known columns.
///
/// Columns named here skip inference entirely.
#[derive(Debug, Clone, Default)]
pub struct ColumnHints {
    numeric: HashSet<String>,
    text: HashSet<String>,
}

impl ColumnHints {
    pub fn new<I, J, S, T>(numeric: I, text: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            numeric: numeric.into_iter().map(Into::into).collect(),
            text: text.into_iter().map(Into::into).collect(),
        }
    }

    /// Hints that declare nothing; every column is inferred.
    pub fn none() -> Self {
        Self::default()
    }

    fn declared(&self, name: &str) -> Option<ColumnType> {
        if self.numeric.contains(name) {
            Some(ColumnType::Numeric)
        } else if self.text.contains(name) {
            Some(ColumnType::Text)
        } else {
            None
        }
    }
}

/// Normalize a raw table into a typed table.
pub fn normalize(raw: &RawTable, hints: &ColumnHints) -> Table {
    let column_types: Vec<ColumnType> = raw
        .headers
        .iter()
        .enumerate()
        .map(|(index, name)| classify(raw, index, name, hints))
        .collect();

    let records: Vec<Record> = raw
        .rows
        .iter()
        .map(|row| {
            let cells = column_types
                .iter()
                .enumerate()
                .map(|(index, column_type)| {
                    let cell = row.get(index).unwrap_or(&RawCell::Empty);
                    match column_type {
                        ColumnType::Numeric => to_numeric(cell),
                        ColumnType::Text => to_text(cell),
                    }
                })
                .collect();
            Record::new(cells)
        })
        .collect();

    let columns: Vec<Column> = raw
        .headers
        .iter()
        .zip(&column_types)
        .map(|(name, column_type)| Column {
            name: name.clone(),
            column_type: *column_type,
        })
        .collect();

    let table = Table::from_parts(columns, records);

    for (index, column) in table.columns().iter().enumerate() {
        debug!(
            "Column '{}' normalized as {} ({} missing)",
            column.name,
            column.column_type,
            table.missing_count(index)
        );
    }

    table
}

/// Decide the semantic type of one raw column.
fn classify(raw: &RawTable, index: usize, name: &str, hints: &ColumnHints) -> ColumnType {
    if let Some(declared) = hints.declared(name) {
        return declared;
    }

    let mut non_blank = 0usize;
    let mut native = 0usize;
    let mut parsed = 0usize;

    for cell in raw.column_cells(index) {
        if cell.is_blank() {
            continue;
        }
        non_blank += 1;
        if matches!(cell, RawCell::Number(_)) {
            native += 1;
        }
        if parse_number(cell).is_some() {
            parsed += 1;
        }
    }

    if non_blank == 0 {
        return ColumnType::Text;
    }

    // Already fully numeric at the source
    if native == non_blank {
        return ColumnType::Numeric;
    }

    if parsed as f64 / non_blank as f64 >= NUMERIC_INFERENCE_THRESHOLD {
        ColumnType::Numeric
    } else {
        ColumnType::Text
    }
}

/// Parse a raw cell as a finite real number.
pub fn parse_number(cell: &RawCell) -> Option<f64> {
    let value = match cell {
        RawCell::Empty => return None,
        RawCell::Number(v) => *v,
        RawCell::Text(s) => s.trim().parse::<f64>().ok()?,
    };

    value.is_finite().then_some(value)
}

fn to_numeric(cell: &RawCell) -> Cell {
    match parse_number(cell) {
        Some(v) => Cell::Number(v),
        None => Cell::Missing,
    }
}

fn to_text(cell: &RawCell) -> Cell {
    match cell {
        RawCell::Empty => Cell::Text(String::new()),
        RawCell::Number(v) => Cell::Text(number_to_text(*v)),
        RawCell::Text(s) => Cell::Text(s.clone()),
    }
}

/// String form of a number in a text column, without a trailing `.0`.
fn number_to_text(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        v.to_string()
    }
}
