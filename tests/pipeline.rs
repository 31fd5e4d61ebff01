// tests/pipeline.rs
//
// Runs the fixture datasets through load → normalize → summarize → render.
//
use std::path::PathBuf;

use repodash::analysis::{bucket_numeric, normalize, top_categories, top_k, DEFAULT_BOUNDARIES};
use repodash::config::Config;
use repodash::models::{Cell, ColumnType, Table};
use repodash::report::{self, LoadedSource, SourceRole};
use repodash::source::{load_table, SourceSpec};
use repodash::DashboardError;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

fn load(name: &str) -> Table {
    let raw = load_table(&SourceSpec::new(fixture(name))).unwrap();
    normalize(&raw, &Config::default().columns.hints())
}

#[test]
fn primary_fixture_normalizes_known_columns() {
    let table = load("repo_data.csv");
    assert_eq!(table.row_count(), 10);
    assert_eq!(table.column_count(), 5);

    assert_eq!(table.column("name").map(|c| c.column_type), Some(ColumnType::Text));
    for metric in ["stars_count", "forks_count", "watchers", "pull_requests"] {
        assert_eq!(
            table.column(metric).map(|c| c.column_type),
            Some(ColumnType::Numeric),
            "{metric}"
        );
    }

    // blank and "n/a" cells
    let pulls = table.column_index("pull_requests").unwrap();
    assert_eq!(table.missing_count(pulls), 2);
}

#[test]
fn top_stars_puts_missing_last() {
    let table = load("repo_data.csv");

    let top = top_k(&table, "stars_count", 2).unwrap();
    let names: Vec<String> = top
        .records
        .iter()
        .map(|r| table.cell(r, "name").unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["freeCodeCamp", "free-programming-books"]);

    let all = top_k(&table, "stars_count", 100).unwrap();
    assert_eq!(all.len(), 10);
    assert_eq!(all.values().last(), Some(&None));
    assert_eq!(
        table.cell(&all.records[9], "name"),
        Some(&Cell::Text("tooling-notes".to_string()))
    );
}

#[test]
fn language_and_issue_summaries() {
    let table = load("repo_languages.csv");

    let languages = top_categories(&table, "language", 3).unwrap();
    assert_eq!(languages.labels(), vec!["Rust", "TypeScript", "JavaScript"]);
    assert_eq!(languages.get("Rust"), Some(3));

    let everything = top_categories(&table, "language", 100).unwrap();
    assert_eq!(everything.total(), 11);

    let issues = bucket_numeric(&table, "issues_count", &DEFAULT_BOUNDARIES).unwrap();
    let counts: Vec<(&str, usize)> = issues.iter().collect();
    assert_eq!(
        counts,
        vec![("0", 1), ("1-100", 1), ("101-500", 1), ("501-1000", 2)]
    );
}

#[test]
fn wrong_column_types_are_rejected() {
    let table = load("repo_languages.csv");

    assert!(matches!(
        top_k(&table, "language", 3),
        Err(DashboardError::InvalidColumn { .. })
    ));
    assert!(matches!(
        top_categories(&table, "issues_count", 3),
        Err(DashboardError::InvalidColumn { .. })
    ));
    assert!(matches!(
        bucket_numeric(&table, "issues_count", &[5.0, 5.0]),
        Err(DashboardError::InvalidArgument(_))
    ));
}

#[test]
fn missing_source_is_unavailable() {
    let err = load_table(&SourceSpec::new(fixture("nope.csv"))).unwrap_err();
    assert!(matches!(err, DashboardError::DataSourceUnavailable { .. }));
}

#[test]
fn dashboard_renders_every_section() {
    let primary = LoadedSource {
        role: SourceRole::Primary,
        path: fixture("repo_data.csv"),
        table: load("repo_data.csv"),
    };
    let secondary = LoadedSource {
        role: SourceRole::Secondary,
        path: fixture("repo_languages.csv"),
        table: load("repo_languages.csv"),
    };
    let settings = Config::default().report_settings().unwrap();

    let dashboard = report::assemble(&primary, Some(&secondary), &settings);
    assert_eq!(dashboard.failed_sections(), 0);
    assert_eq!(dashboard.highlights.len(), 5);
    assert_eq!(dashboard.bar_charts.len(), 4);
    assert_eq!(dashboard.pie_charts.len(), 2);
    assert_eq!(dashboard.raw_tables.len(), 2);

    let markdown = report::generate_markdown_dashboard(&dashboard);
    assert!(markdown.contains("# GitHub Repositories Dashboard"));
    assert!(markdown.contains("Most Stars Count"));
    assert!(markdown.contains("| Most Issues Count | rust-lang/rust | **9800** |"));
    assert!(markdown.contains("| 501-1000 | 2 |"));
    assert!(!markdown.contains("unavailable"));

    let json = report::generate_json_dashboard(&dashboard).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["pie_charts"].as_array().map(Vec::len), Some(2));
}

#[test]
fn dashboard_without_secondary_omits_its_sections() {
    let primary = LoadedSource {
        role: SourceRole::Primary,
        path: fixture("repo_data.csv"),
        table: load("repo_data.csv"),
    };
    let settings = Config::default().report_settings().unwrap();

    let dashboard = report::assemble(&primary, None, &settings);
    assert!(dashboard.pie_charts.is_empty());
    assert_eq!(dashboard.raw_tables.len(), 1);
    assert_eq!(dashboard.metadata.sources.len(), 1);
}
