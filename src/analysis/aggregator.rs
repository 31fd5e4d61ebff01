//! Categorical aggregation and numeric bucketing.
//!
//! Both operations produce a [`FrequencySummary`], but with different
//! ordering rules: category counts come out by descending count, bucket
//! counts come out in ascending range order.

use crate::analysis::ranked::numeric_column;
use crate::error::{DashboardError, Result};
use crate::models::{format_number, Cell, ColumnType, FrequencyEntry, FrequencySummary, Table};
use std::collections::HashMap;

/// Default issue-count boundaries.
pub const DEFAULT_BOUNDARIES: [f64; 5] = [0.0, 1.0, 100.0, 500.0, 1000.0];

/// Display labels matching [`DEFAULT_BOUNDARIES`].
pub const DEFAULT_BUCKET_LABELS: [&str; 4] = ["0", "1-100", "101-500", "501-1000"];

/// Count distinct values of a text column and keep the `n` most frequent.
///
/// Blank values are not counted. Ties keep first-seen order, and labels past
/// `n` are dropped without an "other" bucket.
pub fn top_categories(table: &Table, column: &str, n: usize) -> Result<FrequencySummary> {
    let index = text_column(table, column)?;

    let mut counts: Vec<FrequencyEntry> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for record in table.records() {
        let Some(label) = record.get(index).and_then(Cell::as_text) else {
            continue;
        };
        if label.trim().is_empty() {
            continue;
        }

        match positions.get(label) {
            Some(&pos) => counts[pos].count += 1,
            None => {
                positions.insert(label, counts.len());
                counts.push(FrequencyEntry {
                    label: label.to_string(),
                    count: 1,
                });
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts
    counts.sort_by_key(|e| std::cmp::Reverse(e.count));
    counts.truncate(n);

    Ok(FrequencySummary::from_entries(counts))
}

/// A validated set of bucket ranges.
///
/// Bucket `i` covers `[boundaries[i], boundaries[i + 1])`, except the last,
/// which also includes its upper bound.
#[derive(Debug, Clone, PartialEq)]
pub struct Buckets {
    boundaries: Vec<f64>,
    labels: Vec<String>,
}

impl Buckets {
    /// Build buckets with labels derived from the boundaries.
    ///
    /// [`DEFAULT_BOUNDARIES`] get [`DEFAULT_BUCKET_LABELS`]; any other set
    /// is labelled `low-high`.
    pub fn new(boundaries: &[f64]) -> Result<Self> {
        if boundaries == DEFAULT_BOUNDARIES.as_slice() {
            return Ok(Self::default());
        }

        validate_boundaries(boundaries)?;
        let labels = boundaries
            .windows(2)
            .map(|w| range_label(w[0], w[1]))
            .collect();
        Ok(Self {
            boundaries: boundaries.to_vec(),
            labels,
        })
    }

    /// Build buckets with explicit display labels, one per range.
    pub fn with_labels(boundaries: &[f64], labels: &[String]) -> Result<Self> {
        validate_boundaries(boundaries)?;

        if labels.len() != boundaries.len() - 1 {
            return Err(DashboardError::InvalidArgument(format!(
                "expected {} bucket labels for {} boundaries, got {}",
                boundaries.len() - 1,
                boundaries.len(),
                labels.len()
            )));
        }
        for (i, label) in labels.iter().enumerate() {
            if labels[..i].contains(label) {
                return Err(DashboardError::InvalidArgument(format!(
                    "duplicate bucket label '{}'",
                    label
                )));
            }
        }

        Ok(Self {
            boundaries: boundaries.to_vec(),
            labels: labels.to_vec(),
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Index of the bucket containing `value`, if any.
    pub fn bucket_of(&self, value: f64) -> Option<usize> {
        let last = self.boundaries.len() - 1;
        let (low, high) = (self.boundaries[0], self.boundaries[last]);

        if value < low || value > high {
            return None;
        }
        if value == high {
            return Some(last - 1);
        }

        // First boundary strictly greater than the value closes its bucket
        let upper = self.boundaries.partition_point(|b| *b <= value);
        Some(upper - 1)
    }
}

impl Default for Buckets {
    fn default() -> Self {
        Self {
            boundaries: DEFAULT_BOUNDARIES.to_vec(),
            labels: DEFAULT_BUCKET_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Count the values of a numeric column per bucket.
///
/// Every bucket is reported, in ascending order, even when empty. Missing
/// values and values outside all ranges are left out.
pub fn bucket_numeric(table: &Table, column: &str, boundaries: &[f64]) -> Result<FrequencySummary> {
    let buckets = Buckets::new(boundaries)?;
    bucket_with(table, column, &buckets)
}

/// Like [`bucket_numeric`], with pre-built (possibly relabelled) buckets.
pub fn bucket_with(table: &Table, column: &str, buckets: &Buckets) -> Result<FrequencySummary> {
    let index = numeric_column(table, column)?;

    let mut counts = vec![0usize; buckets.labels.len()];
    for record in table.records() {
        if let Some(bucket) = record
            .get(index)
            .and_then(Cell::as_number)
            .and_then(|v| buckets.bucket_of(v))
        {
            counts[bucket] += 1;
        }
    }

    let entries = buckets
        .labels
        .iter()
        .zip(counts)
        .map(|(label, count)| FrequencyEntry {
            label: label.clone(),
            count,
        })
        .collect();

    Ok(FrequencySummary::from_entries(entries))
}

fn validate_boundaries(boundaries: &[f64]) -> Result<()> {
    if boundaries.len() < 2 {
        return Err(DashboardError::InvalidArgument(format!(
            "bucket boundaries need at least 2 values, got {}",
            boundaries.len()
        )));
    }
    if boundaries.iter().any(|b| !b.is_finite()) {
        return Err(DashboardError::InvalidArgument(
            "bucket boundaries must be finite numbers".to_string(),
        ));
    }
    if boundaries.windows(2).any(|w| w[0] >= w[1]) {
        return Err(DashboardError::InvalidArgument(
            "bucket boundaries must be strictly increasing".to_string(),
        ));
    }
    Ok(())
}

fn text_column(table: &Table, column: &str) -> Result<usize> {
    let index = table
        .column_index(column)
        .ok_or_else(|| DashboardError::missing_column(column))?;

    match table.columns()[index].column_type {
        ColumnType::Text => Ok(index),
        ColumnType::Numeric => Err(DashboardError::wrong_type(column, "Text")),
    }
}

fn range_label(low: f64, high: f64) -> String {
    format!("{}-{}", format_number(low), format_number(high))
}
