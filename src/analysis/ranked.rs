//! Top-K ranked selection over a numeric column.

use crate::error::{DashboardError, Result};
use crate::models::{Cell, ColumnType, RankedResult, Table};

/// Select the `k` records with the largest values in `column`.
///
/// Records are ordered descending and stable with respect to table order.
/// Missing values rank below every present value, so they only appear when
/// fewer than `k` present values exist.
pub fn top_k(table: &Table, column: &str, k: usize) -> Result<RankedResult> {
    let index = numeric_column(table, column)?;

    let mut present: Vec<(usize, f64)> = Vec::new();
    let mut missing: Vec<usize> = Vec::new();

    for (row, record) in table.records().iter().enumerate() {
        match record.get(index).and_then(Cell::as_number) {
            Some(value) => present.push((row, value)),
            None => missing.push(row),
        }
    }

    // `sort_by` is stable, so equal values keep their table order
    present.sort_by(|a, b| b.1.total_cmp(&a.1));

    let records = present
        .into_iter()
        .map(|(row, _)| row)
        .chain(missing)
        .take(k)
        .map(|row| table.records()[row].clone())
        .collect();

    Ok(RankedResult {
        column: column.to_string(),
        records,
        column_index: index,
    })
}

/// Validate a truncation count coming from configuration or the CLI.
pub fn checked_count(name: &str, value: i64) -> Result<usize> {
    usize::try_from(value).map_err(|_| {
        DashboardError::InvalidArgument(format!(
            "{} must be zero or greater, got {}",
            name, value
        ))
    })
}

/// Resolve a column that must exist and be numeric.
pub(crate) fn numeric_column(table: &Table, column: &str) -> Result<usize> {
    let index = table
        .column_index(column)
        .ok_or_else(|| DashboardError::missing_column(column))?;

    match table.columns()[index].column_type {
        ColumnType::Numeric => Ok(index),
        ColumnType::Text => Err(DashboardError::wrong_type(column, "Numeric")),
    }
}
