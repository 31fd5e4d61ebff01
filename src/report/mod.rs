//! Dashboard assembly and rendering.

pub mod assembler;
pub mod generator;

pub use assembler::{assemble, Dashboard, LoadedSource, SourceRole};
pub use generator::{generate_json_dashboard, generate_markdown_dashboard};
