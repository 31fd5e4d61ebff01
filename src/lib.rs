//! RepoDash - summary dashboards for GitHub repository datasets.
//!
//! The pipeline is load → normalize → {rank, aggregate} → render:
//!
//! - [`source`] reads CSV/TSV and spreadsheet files into raw tables.
//! - [`analysis`] normalizes columns, selects top-K records and builds
//!   frequency summaries.
//! - [`report`] assembles the results into a dashboard and renders it.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod source;

pub use error::{DashboardError, Result};
