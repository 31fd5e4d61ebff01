//! Summarization pipeline.
//!
//! Normalization, ranked selection and categorical aggregation over
//! in-memory tables.

pub mod aggregator;
pub mod normalizer;
pub mod ranked;

pub use aggregator::*;
pub use normalizer::*;
pub use ranked::*;
