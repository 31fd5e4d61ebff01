//! Dashboard assembly.
//!
//! Runs the selector and aggregator over the loaded tables and collects
//! their results into a [`Dashboard`]. Every view is computed on its own;
//! a failing view becomes a failed section instead of aborting the report.

use crate::analysis::{bucket_with, top_categories, top_k};
use crate::config::ReportSettings;
use crate::error::{DashboardError, Result};
use crate::models::{Cell, FrequencySummary, RankedResult, Table};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Which input a table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceRole {
    Primary,
    Secondary,
}

impl fmt::Display for SourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRole::Primary => write!(f, "Primary"),
            SourceRole::Secondary => write!(f, "Secondary"),
        }
    }
}

/// A normalized table together with where it was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub role: SourceRole,
    pub path: PathBuf,
    pub table: Table,
}

/// Metadata describing one loaded source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub role: SourceRole,
    pub path: String,
    pub rows: usize,
    pub columns: usize,
}

/// Metadata about the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetadata {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub sources: Vec<SourceInfo>,
}

/// Outcome of computing one view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionContent<T> {
    Ready(T),
    Failed(String),
}

/// A titled dashboard view.
#[derive(Debug, Clone, Serialize)]
pub struct Section<T> {
    pub title: String,
    pub content: SectionContent<T>,
}

impl<T> Section<T> {
    fn from_result(title: String, result: Result<T>) -> Self {
        let content = match result {
            Ok(value) => SectionContent::Ready(value),
            Err(e) => {
                warn!("Section '{}' failed: {}", title, e);
                SectionContent::Failed(e.to_string())
            }
        };
        Self { title, content }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.content, SectionContent::Failed(_))
    }
}

/// A labelled value in a ranked view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub label: String,
    pub value: Option<f64>,
}

/// A ranked view: used for highlight tiles and bar charts.
#[derive(Debug, Clone, Serialize)]
pub struct RankedView {
    pub metric: String,
    pub entries: Vec<RankedEntry>,
}

/// A frequency view: used for pie charts.
#[derive(Debug, Clone, Serialize)]
pub struct PieView {
    pub column: String,
    pub slices: FrequencySummary,
}

/// A normalized table shown as-is.
#[derive(Debug, Clone, Serialize)]
pub struct RawTableView<'a> {
    pub title: String,
    pub max_rows: usize,
    pub table: &'a Table,
}

/// The complete dashboard handed to a renderer.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard<'a> {
    pub metadata: DashboardMetadata,
    pub highlights: Vec<Section<RankedView>>,
    pub bar_charts: Vec<Section<RankedView>>,
    pub pie_charts: Vec<Section<PieView>>,
    pub raw_tables: Vec<RawTableView<'a>>,
}

impl Dashboard<'_> {
    /// Number of sections that could not be computed.
    pub fn failed_sections(&self) -> usize {
        self.highlights.iter().filter(|s| s.is_failed()).count()
            + self.bar_charts.iter().filter(|s| s.is_failed()).count()
            + self.pie_charts.iter().filter(|s| s.is_failed()).count()
    }
}

/// Build the dashboard for the loaded sources.
///
/// Sections for the secondary source are left out entirely when it wasn't
/// provided.
pub fn assemble<'a>(
    primary: &'a LoadedSource,
    secondary: Option<&'a LoadedSource>,
    settings: &ReportSettings,
) -> Dashboard<'a> {
    let mut sources = vec![source_info(primary)];
    sources.extend(secondary.map(source_info));

    let metadata = DashboardMetadata {
        title: settings.title.clone(),
        generated_at: Utc::now(),
        sources,
    };

    let mut highlights: Vec<Section<RankedView>> = settings
        .metrics
        .iter()
        .map(|metric| {
            let title = format!("Most {}", humanize(metric));
            Section::from_result(
                title,
                ranked_view(&primary.table, metric, &settings.label_column, settings.tile_top),
            )
        })
        .collect();

    if let Some(secondary) = secondary {
        let column = &settings.bucket_column;
        highlights.push(Section::from_result(
            format!("Most {}", humanize(column)),
            ranked_view(
                &secondary.table,
                column,
                &settings.secondary_label_column,
                settings.tile_top,
            ),
        ));
    }

    let bar_charts = settings
        .metrics
        .iter()
        .map(|metric| {
            let title = format!("{} by Repository", humanize(metric));
            Section::from_result(
                title,
                ranked_view(&primary.table, metric, &settings.label_column, settings.bar_top),
            )
        })
        .collect();

    let mut pie_charts = Vec::new();
    if let Some(secondary) = secondary {
        let column = &settings.category_column;
        pie_charts.push(Section::from_result(
            format!("{} Distribution (Top {})", humanize(column), settings.pie_top),
            top_categories(&secondary.table, column, settings.pie_top).map(|slices| PieView {
                column: column.clone(),
                slices,
            }),
        ));

        let column = &settings.bucket_column;
        pie_charts.push(Section::from_result(
            format!("{} Ranges", humanize(column)),
            bucket_with(&secondary.table, column, &settings.buckets).map(|slices| PieView {
                column: column.clone(),
                slices,
            }),
        ));
    }

    let mut raw_tables = vec![RawTableView {
        title: "Raw Data".to_string(),
        max_rows: settings.max_raw_rows,
        table: &primary.table,
    }];
    if let Some(secondary) = secondary {
        raw_tables.push(RawTableView {
            title: "Raw Data (Languages)".to_string(),
            max_rows: settings.max_raw_rows,
            table: &secondary.table,
        });
    }

    let dashboard = Dashboard {
        metadata,
        highlights,
        bar_charts,
        pie_charts,
        raw_tables,
    };

    debug!(
        "Assembled dashboard with {} failed sections",
        dashboard.failed_sections()
    );

    dashboard
}

/// Rank `metric` and attach the label column to each selected record.
fn ranked_view(table: &Table, metric: &str, label_column: &str, k: usize) -> Result<RankedView> {
    let ranked: RankedResult = top_k(table, metric, k)?;
    let label_index = table
        .column_index(label_column)
        .ok_or_else(|| DashboardError::missing_column(label_column))?;

    let entries = ranked
        .records
        .iter()
        .zip(ranked.values())
        .map(|(record, value)| RankedEntry {
            label: record.get(label_index).map(Cell::to_string).unwrap_or_default(),
            value,
        })
        .collect();

    Ok(RankedView {
        metric: metric.to_string(),
        entries,
    })
}

fn source_info(source: &LoadedSource) -> SourceInfo {
    SourceInfo {
        role: source.role,
        path: source.path.display().to_string(),
        rows: source.table.row_count(),
        columns: source.table.column_count(),
    }
}

/// Turn a column name like `pull_requests` into `Pull Requests`.
pub fn humanize(column: &str) -> String {
    column
        .split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
