//! Tabular data source loading.
//!
//! Reads delimited text and spreadsheet files into a [`RawTable`]. Loading
//! is the only step that touches the filesystem; everything downstream works
//! on the owned table it returns.

use crate::error::{DashboardError, Result};
use crate::models::{RawCell, RawTable};
use calamine::{open_workbook_auto, Data, Reader};
use std::borrow::Cow;
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File formats understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Tsv,
    Spreadsheet,
}

impl SourceFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" | "txt" => Some(SourceFormat::Csv),
            "tsv" | "tab" => Some(SourceFormat::Tsv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SourceFormat::Spreadsheet),
            _ => None,
        }
    }
}

/// Where to load a table from.
#[derive(Debug, Clone)]
pub struct SourceSpec {
    /// Path to the file.
    pub path: PathBuf,
    /// Worksheet to read; the first sheet when unset.
    pub sheet: Option<String>,
}

impl SourceSpec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheet: None,
        }
    }

    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        self.sheet = sheet;
        self
    }
}

/// Load a raw table from a file.
pub fn load_table(spec: &SourceSpec) -> Result<RawTable> {
    let path = spec.path.as_path();

    if !path.is_file() {
        return Err(DashboardError::unavailable(path, "file not found"));
    }

    let format = SourceFormat::from_path(path)
        .ok_or_else(|| DashboardError::unavailable(path, "unsupported file format"))?;

    let table = match format {
        SourceFormat::Csv | SourceFormat::Tsv => {
            let file =
                std::fs::File::open(path).map_err(|e| DashboardError::unavailable(path, e))?;
            let delimiter = if format == SourceFormat::Tsv { b'\t' } else { b',' };
            parse_delimited(file, delimiter).map_err(|e| DashboardError::unavailable(path, e))?
        }
        SourceFormat::Spreadsheet => load_spreadsheet(path, spec.sheet.as_deref())?,
    };

    info!(
        "Loaded {} ({:?}): {} rows x {} columns",
        path.display(),
        format,
        table.rows.len(),
        table.headers.len()
    );

    Ok(table)
}

/// Parse delimited text with a header row.
///
/// Short rows are padded with empty cells and long rows are truncated, so
/// every row matches the header width. Bytes that aren't valid UTF-8 are
/// replaced rather than dropping the row.
pub fn parse_delimited<R: Read>(reader: R, delimiter: u8) -> std::result::Result<RawTable, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header_record = reader.byte_headers()?.clone();
    let headers = unique_headers(
        header_record
            .iter()
            .map(|field| decode_field(field, 1).into_owned()),
    );
    let width = headers.len();

    let mut rows = Vec::new();
    for (index, result) in reader.byte_records().enumerate() {
        let record = result?;
        let line = index + 2;
        let cells = record.iter().map(|field| text_cell(&decode_field(field, line)));
        rows.push(fit_row(cells, width, line));
    }

    Ok(RawTable::new(headers, rows))
}

/// Decode one delimited field, replacing invalid UTF-8.
fn decode_field(field: &[u8], line: usize) -> Cow<'_, str> {
    let value = String::from_utf8_lossy(field);
    if let Cow::Owned(_) = value {
        warn!("Row {} has invalid UTF-8; replaced as '{}'", line, value);
    }
    value
}

fn load_spreadsheet(path: &Path, sheet: Option<&str>) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path).map_err(|e| DashboardError::unavailable(path, e))?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| DashboardError::unavailable(path, "workbook has no sheets"))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| DashboardError::unavailable(path, format!("sheet `{}`: {}", sheet_name, e)))?;

    debug!("Reading sheet '{}' from {}", sheet_name, path.display());

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(RawTable::default());
    };

    let headers = unique_headers(header_row.iter().map(|cell| match convert_cell(cell) {
        RawCell::Empty => String::new(),
        RawCell::Number(v) => crate::models::format_number(v),
        RawCell::Text(s) => s.trim().to_string(),
    }));
    let width = headers.len();

    let rows = rows
        .enumerate()
        .map(|(line, row)| fit_row(row.iter().map(convert_cell), width, line + 2))
        .collect();

    Ok(RawTable::new(headers, rows))
}

fn convert_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::Int(v) => RawCell::Number(*v as f64),
        Data::Float(v) => RawCell::Number(*v),
        Data::String(s) => text_cell(s),
        Data::Bool(b) => RawCell::Text(b.to_string()),
        other => RawCell::Text(other.to_string()),
    }
}

fn text_cell(value: &str) -> RawCell {
    if value.is_empty() {
        RawCell::Empty
    } else {
        RawCell::Text(value.to_string())
    }
}

/// Pad or truncate a row to the header width.
fn fit_row(cells: impl Iterator<Item = RawCell>, width: usize, line: usize) -> Vec<RawCell> {
    let mut row: Vec<RawCell> = cells.collect();

    if row.len() != width {
        debug!("Row {} has {} cells, expected {}", line, row.len(), width);
    }

    row.resize(width, RawCell::Empty);
    row
}

/// Make header names unique.
///
/// Blank headers become `Unnamed: <index>`; repeats get a `.1`, `.2`, …
/// suffix in order of appearance.
fn unique_headers(raw: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::new();

    for (index, name) in raw.enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {}", index)
        } else {
            name
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        if candidate != base {
            warn!("Duplicate column '{}' renamed to '{}'", base, candidate);
        }

        seen.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            SourceFormat::from_path(Path::new("repo_data.xlsx")),
            Some(SourceFormat::Spreadsheet)
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("data/REPOS.CSV")),
            Some(SourceFormat::Csv)
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("repos.tsv")),
            Some(SourceFormat::Tsv)
        );
        assert_eq!(SourceFormat::from_path(Path::new("repos.json")), None);
        assert_eq!(SourceFormat::from_path(Path::new("repos")), None);
    }

    #[test]
    fn test_parse_delimited_invalid_utf8_keeps_row() {
        let content: &[u8] = b"name,stars_count\nA,50\nB\xff\xfe,200\nC,b\xffd\n";
        let table = parse_delimited(content, b',').unwrap();

        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1][0], RawCell::Text("B\u{FFFD}\u{FFFD}".to_string()));
        assert_eq!(table.rows[1][1], RawCell::Text("200".to_string()));

        let hints = crate::analysis::ColumnHints::new(["stars_count"], ["name"]);
        let normalized = crate::analysis::normalize(&table, &hints);
        assert_eq!(normalized.row_count(), 3);
        assert_eq!(normalized.records()[1].cells()[1], crate::models::Cell::Number(200.0));
        assert_eq!(normalized.records()[2].cells()[1], crate::models::Cell::Missing);
    }

    #[test]
    fn test_parse_delimited_pads_and_truncates() {
        let content = "name,stars_count,forks_count\nalpha,10,2\nbeta,5\ngamma,1,2,3\n";
        let table = parse_delimited(content.as_bytes(), b',').unwrap();

        assert_eq!(table.headers, vec!["name", "stars_count", "forks_count"]);
        assert_eq!(table.rows.len(), 3);
        assert!(table.rows.iter().all(|r| r.len() == 3));
        assert_eq!(table.rows[1][2], RawCell::Empty);
        assert_eq!(table.rows[2][2], RawCell::Text("2".to_string()));
    }

    #[test]
    fn test_parse_delimited_tabs_and_blanks() {
        let content = "name\twatchers\n  spaced  \t\n";
        let table = parse_delimited(content.as_bytes(), b'\t').unwrap();

        assert_eq!(table.rows[0][0], RawCell::Text("spaced".to_string()));
        assert_eq!(table.rows[0][1], RawCell::Empty);
    }

    #[test]
    fn test_unique_headers() {
        let headers = unique_headers(
            ["name", "", "name", "name", "stars_count"]
                .into_iter()
                .map(String::from),
        );
        assert_eq!(
            headers,
            vec!["name", "Unnamed: 1", "name.1", "name.2", "stars_count"]
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_table(&SourceSpec::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, DashboardError::DataSourceUnavailable { .. }));
    }

    #[test]
    fn test_load_unsupported_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repos.json");
        std::fs::write(&path, "{}").unwrap();

        let err = load_table(&SourceSpec::new(&path)).unwrap_err();
        assert!(err.to_string().contains("unsupported file format"));
    }

    #[test]
    fn test_load_csv_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repos.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "name,stars_count").unwrap();
        writeln!(file, "A,50").unwrap();
        writeln!(file, "B,200").unwrap();
        writeln!(file, "C,bad").unwrap();
        drop(file);

        let table = load_table(&SourceSpec::new(&path)).unwrap();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[2][1], RawCell::Text("bad".to_string()));
    }

    #[test]
    fn test_load_fixtures() {
        let primary = load_table(&SourceSpec::new(fixture("repo_data.csv"))).unwrap();
        for column in ["name", "stars_count", "forks_count", "watchers", "pull_requests"] {
            assert!(primary.headers.iter().any(|h| h == column), "missing {}", column);
        }
        assert!(!primary.rows.is_empty());

        let secondary = load_table(&SourceSpec::new(fixture("repo_languages.csv"))).unwrap();
        for column in ["repositories", "language", "issues_count", "stars_count", "forks_count"] {
            assert!(secondary.headers.iter().any(|h| h == column), "missing {}", column);
        }
    }

    #[test]
    fn test_load_corrupt_spreadsheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repo_data.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();

        let err = load_table(&SourceSpec::new(&path)).unwrap_err();
        assert!(matches!(err, DashboardError::DataSourceUnavailable { .. }));
    }
}
