//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// RepoDash - summary dashboards for GitHub repository datasets
///
/// Loads repository tables from CSV or spreadsheet files, cleans up their
/// columns, and renders top-N highlights, bar charts, pie charts and raw
/// tables as Markdown or JSON.
///
/// Examples:
///   repodash --data archive/repo_data.xlsx
///   repodash --data repos.csv --secondary languages.csv --format json -o dashboard.json
///   repodash --data repos.csv --bar-top 5 --buckets 0,10,100,1000
///   repodash --data repos.csv --dry-run
///   repodash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Primary data source (name, stars, forks, watchers, pull requests)
    ///
    /// CSV, TSV, XLSX, XLS and ODS files are supported.
    /// Can also be set in the [sources] section of .repodash.toml.
    #[arg(short, long, value_name = "FILE", env = "REPODASH_DATA")]
    pub data: Option<PathBuf>,

    /// Secondary data source (repositories, language, issue counts)
    #[arg(short, long, value_name = "FILE")]
    pub secondary: Option<PathBuf>,

    /// Worksheet to read from spreadsheet sources
    ///
    /// Defaults to the first sheet in the workbook
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,

    /// Output file path for the dashboard
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .repodash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Records shown per highlight tile
    #[arg(long, value_name = "COUNT", allow_negative_numbers = true)]
    pub tile_top: Option<i64>,

    /// Records shown per bar chart
    #[arg(long, value_name = "COUNT", allow_negative_numbers = true)]
    pub bar_top: Option<i64>,

    /// Categories shown per pie chart
    #[arg(long, value_name = "COUNT", allow_negative_numbers = true)]
    pub pie_top: Option<i64>,

    /// Bucket boundaries for the issue ranges chart (comma-separated)
    ///
    /// Example: --buckets 0,1,100,500,1000
    #[arg(long, value_name = "BOUNDS", value_delimiter = ',', allow_negative_numbers = true)]
    pub buckets: Option<Vec<f64>>,

    /// Labels for each bucket (comma-separated, one fewer than boundaries)
    #[arg(long, value_name = "LABELS", value_delimiter = ',')]
    pub bucket_labels: Option<Vec<String>>,

    /// Maximum rows shown in raw data tables
    #[arg(long, value_name = "COUNT", allow_negative_numbers = true)]
    pub max_raw_rows: Option<i64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: load and normalize sources without writing a report
    ///
    /// Shows the detected type and missing-value count of every column.
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .repodash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    ///
    /// Counts and bucket boundaries are validated later, together with the
    /// values coming from the config file.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref config) = self.config {
            if !config.is_file() {
                return Err(format!("Config file does not exist: {}", config.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args::parse_from(["repodash", "--data", "repos.csv"])
    }

    #[test]
    fn test_defaults() {
        let args = make_args();
        assert_eq!(args.data, Some(PathBuf::from("repos.csv")));
        assert_eq!(args.format, OutputFormat::Markdown);
        assert_eq!(args.output, None);
        assert_eq!(args.bar_top, None);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_parse_lists_and_counts() {
        let args = Args::parse_from([
            "repodash",
            "--data",
            "repos.xlsx",
            "--buckets",
            "0,1,100",
            "--bucket-labels",
            "none,some",
            "--pie-top",
            "-2",
            "--format",
            "json",
        ]);
        assert_eq!(args.buckets, Some(vec![0.0, 1.0, 100.0]));
        assert_eq!(
            args.bucket_labels,
            Some(vec!["none".to_string(), "some".to_string()])
        );
        assert_eq!(args.pie_top, Some(-2));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_config() {
        let mut args = make_args();
        args.config = Some(PathBuf::from("no/such/.repodash.toml"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
