//! Dashboard rendering.
//!
//! Renders an assembled [`Dashboard`] as a Markdown document or as JSON.
//! Failed sections are rendered as an explicit error notice, never as a
//! partial chart.

use crate::models::format_number;
use crate::report::assembler::{
    Dashboard, DashboardMetadata, PieView, RankedView, RawTableView, Section, SectionContent,
};
use anyhow::Result;

/// Width of the longest bar in a bar chart, in characters.
const BAR_WIDTH: usize = 30;

/// Generate a complete Markdown dashboard.
pub fn generate_markdown_dashboard(dashboard: &Dashboard) -> String {
    let mut output = String::new();

    // Title
    output.push_str(&format!("# {}\n\n", dashboard.metadata.title));

    output.push_str(&generate_metadata_section(&dashboard.metadata));
    output.push_str(&generate_table_of_contents(dashboard));
    output.push_str(&generate_highlights_section(&dashboard.highlights));
    output.push_str(&generate_bar_charts_section(&dashboard.bar_charts));
    output.push_str(&generate_pie_charts_section(&dashboard.pie_charts));
    output.push_str(&generate_raw_tables_section(&dashboard.raw_tables));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &DashboardMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    for source in &metadata.sources {
        section.push_str(&format!(
            "- **{} Source:** `{}` ({} rows, {} columns)\n",
            source.role, source.path, source.rows, source.columns
        ));
    }
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(dashboard: &Dashboard) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    if !dashboard.highlights.is_empty() {
        toc.push_str("- [Highlights](#highlights)\n");
    }
    if !dashboard.bar_charts.is_empty() {
        toc.push_str("- [Bar Charts](#bar-charts)\n");
        for chart in &dashboard.bar_charts {
            toc.push_str(&format!("  - [{}](#{})\n", chart.title, anchor(&chart.title)));
        }
    }
    if !dashboard.pie_charts.is_empty() {
        toc.push_str("- [Pie Charts](#pie-charts)\n");
        for chart in &dashboard.pie_charts {
            toc.push_str(&format!("  - [{}](#{})\n", chart.title, anchor(&chart.title)));
        }
    }
    for table in &dashboard.raw_tables {
        toc.push_str(&format!("- [{}](#{})\n", table.title, anchor(&table.title)));
    }
    toc.push('\n');

    toc
}

/// Generate the highlight tiles as a single table.
fn generate_highlights_section(highlights: &[Section<RankedView>]) -> String {
    if highlights.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Highlights\n\n");

    let mut failures = String::new();
    let mut rows = String::new();

    for tile in highlights {
        match &tile.content {
            SectionContent::Ready(view) if view.entries.is_empty() => {
                rows.push_str(&format!("| {} | *no data* | |\n", tile.title));
            }
            SectionContent::Ready(view) => {
                for entry in &view.entries {
                    rows.push_str(&format!(
                        "| {} | {} | **{}** |\n",
                        tile.title,
                        escape_cell(&entry.label),
                        display_value(entry.value)
                    ));
                }
            }
            SectionContent::Failed(message) => {
                failures.push_str(&failed_notice(&tile.title, message));
            }
        }
    }

    if !rows.is_empty() {
        section.push_str("| Highlight | Repository | Value |\n");
        section.push_str("|:---|:---|---:|\n");
        section.push_str(&rows);
        section.push('\n');
    }
    section.push_str(&failures);

    section
}

/// Generate the bar charts section.
fn generate_bar_charts_section(charts: &[Section<RankedView>]) -> String {
    if charts.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Bar Charts\n\n");

    for chart in charts {
        section.push_str(&format!("### {}\n\n", chart.title));
        match &chart.content {
            SectionContent::Ready(view) => section.push_str(&generate_bar_chart(view)),
            SectionContent::Failed(message) => {
                section.push_str(&failed_notice(&chart.title, message))
            }
        }
    }

    section
}

/// Render one ranked view as a text bar chart.
fn generate_bar_chart(view: &RankedView) -> String {
    if view.entries.is_empty() {
        return "*No data.*\n\n".to_string();
    }

    let max = view
        .entries
        .iter()
        .filter_map(|e| e.value)
        .fold(0.0_f64, f64::max);

    let mut chart = String::new();
    chart.push_str("| Repository | Value | |\n");
    chart.push_str("|:---|---:|:---|\n");

    for entry in &view.entries {
        chart.push_str(&format!(
            "| {} | {} | {} |\n",
            escape_cell(&entry.label),
            display_value(entry.value),
            bar(entry.value, max)
        ));
    }
    chart.push('\n');

    chart
}

/// Generate the pie charts section.
fn generate_pie_charts_section(charts: &[Section<PieView>]) -> String {
    if charts.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Pie Charts\n\n");

    for chart in charts {
        section.push_str(&format!("### {}\n\n", chart.title));
        match &chart.content {
            SectionContent::Ready(view) => section.push_str(&generate_pie_chart(view)),
            SectionContent::Failed(message) => {
                section.push_str(&failed_notice(&chart.title, message))
            }
        }
    }

    section
}

/// Render one frequency view as a count/share table.
fn generate_pie_chart(view: &PieView) -> String {
    let total = view.slices.total();
    if total == 0 {
        return "*No data.*\n\n".to_string();
    }

    let mut chart = String::new();
    chart.push_str("| Category | Count | Share |\n");
    chart.push_str("|:---|---:|---:|\n");

    for (label, count) in view.slices.iter() {
        let share = count as f64 / total as f64 * 100.0;
        chart.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            escape_cell(label),
            count,
            share
        ));
    }
    chart.push('\n');

    chart
}

/// Generate the raw data tables.
fn generate_raw_tables_section(tables: &[RawTableView]) -> String {
    let mut section = String::new();

    for view in tables {
        section.push_str(&format!("## {}\n\n", view.title));
        section.push_str(&generate_raw_table(view));
    }

    section
}

fn generate_raw_table(view: &RawTableView) -> String {
    let table = view.table;
    if table.column_count() == 0 {
        return "*No columns.*\n\n".to_string();
    }

    let mut output = String::new();

    let header: Vec<String> = table
        .columns()
        .iter()
        .map(|c| escape_cell(&c.name))
        .collect();
    output.push_str(&format!("| {} |\n", header.join(" | ")));
    output.push_str(&format!("|{}\n", ":---|".repeat(header.len())));

    for record in table.records().iter().take(view.max_rows) {
        let cells: Vec<String> = record
            .cells()
            .iter()
            .map(|c| escape_cell(&c.to_string()))
            .collect();
        output.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    output.push('\n');

    if table.row_count() > view.max_rows {
        output.push_str(&format!(
            "*Showing {} of {} rows.*\n\n",
            view.max_rows,
            table.row_count()
        ));
    }

    output
}

/// Generate the dashboard footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Dashboard generated by RepoDash v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Generate a JSON dashboard.
pub fn generate_json_dashboard(dashboard: &Dashboard) -> Result<String> {
    serde_json::to_string_pretty(dashboard).map_err(Into::into)
}

fn failed_notice(title: &str, message: &str) -> String {
    format!("> ⚠️ **{} unavailable:** {}\n\n", title, message)
}

fn display_value(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| "—".to_string())
}

fn bar(value: Option<f64>, max: f64) -> String {
    match value {
        Some(v) if max > 0.0 && v > 0.0 => {
            let len = ((v / max) * BAR_WIDTH as f64).round() as usize;
            "█".repeat(len.max(1))
        }
        _ => String::new(),
    }
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

fn anchor(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-')
        .map(|c| if c == ' ' { '-' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalize;
    use crate::config::Config;
    use crate::models::{RawCell, RawTable};
    use crate::report::assembler::{assemble, LoadedSource, SourceRole};
    use std::path::PathBuf;

    fn source(role: SourceRole, headers: &[&str], rows: &[&[&str]]) -> LoadedSource {
        let raw = RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| RawCell::Text(v.to_string())).collect())
                .collect(),
        );
        LoadedSource {
            role,
            path: PathBuf::from(format!("{}.csv", role).to_lowercase()),
            table: normalize(&raw, &Config::default().columns.hints()),
        }
    }

    fn primary() -> LoadedSource {
        source(
            SourceRole::Primary,
            &["name", "stars_count", "forks_count", "watchers", "pull_requests"],
            &[
                &["alpha", "50", "5", "9", "1"],
                &["beta|fork", "200", "2", "3", "bad"],
                &["gamma", "bad", "8", "1", "4"],
            ],
        )
    }

    fn secondary() -> LoadedSource {
        source(
            SourceRole::Secondary,
            &["repositories", "language", "issues_count"],
            &[
                &["a/a", "Rust", "0"],
                &["b/b", "Go", "150"],
                &["c/c", "Rust", "40"],
            ],
        )
    }

    #[test]
    fn test_generate_markdown_dashboard() {
        let primary = primary();
        let secondary = secondary();
        let settings = Config::default().report_settings().unwrap();
        let dashboard = assemble(&primary, Some(&secondary), &settings);

        let markdown = generate_markdown_dashboard(&dashboard);

        assert!(markdown.starts_with("# GitHub Repositories Dashboard"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Highlights"));
        assert!(markdown.contains("| Most Stars Count | beta\\|fork | **200** |"));
        assert!(markdown.contains("### Stars Count by Repository"));
        assert!(markdown.contains("## Pie Charts"));
        assert!(markdown.contains("| Rust | 2 | 66.7% |"));
        assert!(markdown.contains("| 1-100 | 1 | 33.3% |"));
        assert!(markdown.contains("## Raw Data (Languages)"));
        assert!(!markdown.contains("unavailable"));
    }

    #[test]
    fn test_failed_section_rendered_as_notice() {
        let primary = primary();
        let mut settings = Config::default().report_settings().unwrap();
        settings.metrics = vec!["commits".to_string()];

        let dashboard = assemble(&primary, None, &settings);
        let markdown = generate_markdown_dashboard(&dashboard);

        assert!(markdown.contains("> ⚠️ **Commits by Repository unavailable:**"));
        assert!(markdown.contains("invalid column `commits`"));
        assert!(!markdown.contains("| Repository | Value | |"));
    }

    #[test]
    fn test_generate_bar_chart() {
        let primary = primary();
        let settings = Config::default().report_settings().unwrap();
        let dashboard = assemble(&primary, None, &settings);

        let stars = match &dashboard.bar_charts[0].content {
            SectionContent::Ready(view) => view.clone(),
            SectionContent::Failed(msg) => panic!("{}", msg),
        };
        let chart = generate_bar_chart(&stars);
        let lines: Vec<&str> = chart.lines().collect();

        assert_eq!(lines[2], format!("| beta\\|fork | 200 | {} |", "█".repeat(BAR_WIDTH)));
        assert!(lines[3].starts_with("| alpha | 50 | ████████ |"));
        assert_eq!(lines[4], "| gamma | — |  |");
    }

    #[test]
    fn test_raw_table_truncation() {
        let primary = primary();
        let view = RawTableView {
            title: "Raw Data".to_string(),
            max_rows: 2,
            table: &primary.table,
        };
        let output = generate_raw_table(&view);

        assert!(output.starts_with("| name | stars_count | forks_count | watchers | pull_requests |"));
        assert!(output.contains("| alpha | 50 | 5 | 9 | 1 |"));
        assert!(!output.contains("gamma"));
        assert!(output.contains("*Showing 2 of 3 rows.*"));
    }

    #[test]
    fn test_generate_json_dashboard() {
        let primary = primary();
        let settings = Config::default().report_settings().unwrap();
        let dashboard = assemble(&primary, None, &settings);

        let json = generate_json_dashboard(&dashboard).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["metadata"]["title"], "GitHub Repositories Dashboard");
        assert_eq!(
            value["highlights"][0]["content"]["ready"]["entries"][0]["label"],
            "beta|fork"
        );
        assert!(value["raw_tables"][0]["table"]["records"][2][1].is_null());
    }

    #[test]
    fn test_anchor() {
        assert_eq!(anchor("Stars Count by Repository"), "stars-count-by-repository");
        assert_eq!(anchor("Raw Data (Languages)"), "raw-data-languages");
    }
}
