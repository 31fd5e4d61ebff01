//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.repodash.toml` files.

use crate::analysis::{checked_count, Buckets, ColumnHints, DEFAULT_BOUNDARIES};
use crate::error::DashboardError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".repodash.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input data sources.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Declared column types.
    #[serde(default)]
    pub columns: ColumnsConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "dashboard.md".to_string()
}

/// Input data sources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Primary repository table (name, stars, forks, watchers, pull requests).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<PathBuf>,

    /// Secondary table with languages and issue counts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<PathBuf>,

    /// Worksheet name for spreadsheet sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
}

/// Columns with a declared semantic type.
///
/// Anything not listed here is inferred from its values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default = "default_numeric_columns")]
    pub numeric: Vec<String>,

    #[serde(default = "default_text_columns")]
    pub text: Vec<String>,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            numeric: default_numeric_columns(),
            text: default_text_columns(),
        }
    }
}

impl ColumnsConfig {
    pub fn hints(&self) -> ColumnHints {
        ColumnHints::new(self.numeric.iter().cloned(), self.text.iter().cloned())
    }
}

fn default_numeric_columns() -> Vec<String> {
    vec![
        "stars_count",
        "forks_count",
        "watchers",
        "pull_requests",
        "issues_count",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_text_columns() -> Vec<String> {
    vec!["name", "repositories", "language"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Report layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Dashboard title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Column naming each repository in the primary table.
    #[serde(default = "default_label_column")]
    pub label_column: String,

    /// Numeric columns of the primary table to rank.
    #[serde(default = "default_metrics")]
    pub metrics: Vec<String>,

    /// Column naming each repository in the secondary table.
    #[serde(default = "default_secondary_label_column")]
    pub secondary_label_column: String,

    /// Categorical column of the secondary table.
    #[serde(default = "default_category_column")]
    pub category_column: String,

    /// Numeric column of the secondary table split into ranges.
    #[serde(default = "default_bucket_column")]
    pub bucket_column: String,

    /// Records per highlight tile.
    #[serde(default = "default_tile_top")]
    pub tile_top: i64,

    /// Records per bar chart.
    #[serde(default = "default_chart_top")]
    pub bar_top: i64,

    /// Categories per pie chart.
    #[serde(default = "default_chart_top")]
    pub pie_top: i64,

    /// Range boundaries for the bucketed pie chart.
    #[serde(default = "default_bucket_boundaries")]
    pub bucket_boundaries: Vec<f64>,

    /// Labels for each range; derived from the boundaries when unset,
    /// except for the default boundaries, which keep their display labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_labels: Option<Vec<String>>,

    /// Maximum rows shown in raw data tables.
    #[serde(default = "default_max_raw_rows")]
    pub max_raw_rows: i64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            label_column: default_label_column(),
            metrics: default_metrics(),
            secondary_label_column: default_secondary_label_column(),
            category_column: default_category_column(),
            bucket_column: default_bucket_column(),
            tile_top: default_tile_top(),
            bar_top: default_chart_top(),
            pie_top: default_chart_top(),
            bucket_boundaries: default_bucket_boundaries(),
            bucket_labels: None,
            max_raw_rows: default_max_raw_rows(),
        }
    }
}

fn default_title() -> String {
    "GitHub Repositories Dashboard".to_string()
}

fn default_label_column() -> String {
    "name".to_string()
}

fn default_metrics() -> Vec<String> {
    vec!["stars_count", "forks_count", "watchers", "pull_requests"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_secondary_label_column() -> String {
    "repositories".to_string()
}

fn default_category_column() -> String {
    "language".to_string()
}

fn default_bucket_column() -> String {
    "issues_count".to_string()
}

fn default_tile_top() -> i64 {
    1
}

fn default_chart_top() -> i64 {
    10
}

fn default_bucket_boundaries() -> Vec<f64> {
    DEFAULT_BOUNDARIES.to_vec()
}

fn default_max_raw_rows() -> i64 {
    50
}

/// Report settings after validation.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub title: String,
    pub label_column: String,
    pub metrics: Vec<String>,
    pub secondary_label_column: String,
    pub category_column: String,
    pub bucket_column: String,
    pub tile_top: usize,
    pub bar_top: usize,
    pub pie_top: usize,
    pub buckets: Buckets,
    pub max_raw_rows: usize,
}

impl TryFrom<&ReportConfig> for ReportSettings {
    type Error = DashboardError;

    fn try_from(config: &ReportConfig) -> Result<Self, Self::Error> {
        let buckets = match &config.bucket_labels {
            Some(labels) => Buckets::with_labels(&config.bucket_boundaries, labels)?,
            None => Buckets::new(&config.bucket_boundaries)?,
        };

        Ok(Self {
            title: config.title.clone(),
            label_column: config.label_column.clone(),
            metrics: config.metrics.clone(),
            secondary_label_column: config.secondary_label_column.clone(),
            category_column: config.category_column.clone(),
            bucket_column: config.bucket_column.clone(),
            tile_top: checked_count("tile_top", config.tile_top)?,
            bar_top: checked_count("bar_top", config.bar_top)?,
            pie_top: checked_count("pie_top", config.pie_top)?,
            buckets,
            max_raw_rows: checked_count("max_raw_rows", config.max_raw_rows)?,
        })
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.sources.primary = Some(data.clone());
        }
        if let Some(ref secondary) = args.secondary {
            self.sources.secondary = Some(secondary.clone());
        }
        if let Some(ref sheet) = args.sheet {
            self.sources.sheet = Some(sheet.clone());
        }

        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if let Some(tile_top) = args.tile_top {
            self.report.tile_top = tile_top;
        }
        if let Some(bar_top) = args.bar_top {
            self.report.bar_top = bar_top;
        }
        if let Some(pie_top) = args.pie_top {
            self.report.pie_top = pie_top;
        }
        if let Some(max_raw_rows) = args.max_raw_rows {
            self.report.max_raw_rows = max_raw_rows;
        }

        // New boundaries invalidate labels written for the old ones
        if let Some(ref buckets) = args.buckets {
            self.report.bucket_boundaries = buckets.clone();
            self.report.bucket_labels = None;
        }
        if let Some(ref labels) = args.bucket_labels {
            self.report.bucket_labels = Some(labels.clone());
        }
    }

    /// Validated report settings.
    pub fn report_settings(&self) -> Result<ReportSettings, DashboardError> {
        ReportSettings::try_from(&self.report)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
