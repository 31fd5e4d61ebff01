//! Error types for the summarization pipeline.
//!
//! Normalization is total and never produces one of these. Selection and
//! aggregation fail fast, and loading fails when a source can't be read.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by loading, selection and aggregation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    /// A referenced column is absent or has the wrong semantic type.
    #[error("invalid column `{column}`: {reason}")]
    InvalidColumn { column: String, reason: String },

    /// A truncation count or bucket boundary list is malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An input source could not be opened or parsed.
    #[error("data source unavailable: {}: {reason}", path.display())]
    DataSourceUnavailable { path: PathBuf, reason: String },
}

impl DashboardError {
    pub fn missing_column(column: &str) -> Self {
        DashboardError::InvalidColumn {
            column: column.to_string(),
            reason: "column not present in table".to_string(),
        }
    }

    pub fn wrong_type(column: &str, expected: &str) -> Self {
        DashboardError::InvalidColumn {
            column: column.to_string(),
            reason: format!("expected a {} column", expected),
        }
    }

    pub fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DashboardError::DataSourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DashboardError::missing_column("stars_count");
        assert_eq!(
            err.to_string(),
            "invalid column `stars_count`: column not present in table"
        );

        let err = DashboardError::wrong_type("name", "Numeric");
        assert!(err.to_string().contains("expected a Numeric column"));

        let err = DashboardError::unavailable("data/repo_data.xlsx", "No such file");
        assert_eq!(
            err.to_string(),
            "data source unavailable: data/repo_data.xlsx: No such file"
        );
    }
}
