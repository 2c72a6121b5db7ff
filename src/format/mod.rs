//! Annotation export and import system.
//!
//! This module provides a trait-based system for serializing annotations in
//! various formats. The system is designed to be extensible, allowing new
//! formats to be added by implementing the `ExportFormat` trait.
//!
//! ## Supported Formats
//!
//! - **Annotation JSON**: Native web-annotation format with full fidelity
//! - **CSV**: Flat spreadsheet rows with one annotation per line
//! - **Training JSON**: Simplified records for machine-learning pipelines
//!
//! ## Usage
//!
//! ```rust,ignore
//! use anno::format::FormatRegistry;
//!
//! // Get the format registry
//! let registry = FormatRegistry::new();
//!
//! // Export as CSV
//! let csv = registry.export(&annotations, "csv")?;
//! ```
//!
//! Import is JSON-only: [`import_collection`] parses a JSON array into raw
//! annotations that the store validates individually.

mod auto_save;
mod csv;
mod error;
mod json;
mod registry;
mod training;
mod traits;

#[cfg(test)]
mod tests;

pub use auto_save::AutoSave;
pub use csv::CsvFormat;
pub use error::FormatError;
pub use json::{JsonFormat, import_collection};
pub use registry::FormatRegistry;
pub use training::TrainingFormat;
pub use traits::ExportFormat;
