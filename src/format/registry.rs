//! Format registry for discovering and accessing export formats.

use std::collections::HashMap;

use crate::format::csv::CsvFormat;
use crate::format::error::FormatError;
use crate::format::json::JsonFormat;
use crate::format::training::TrainingFormat;
use crate::format::traits::ExportFormat;
use crate::model::Annotation;

/// Registry of available export formats.
///
/// This provides a central location to discover and access format implementations.
/// All built-in formats are registered automatically on creation.
pub struct FormatRegistry {
    formats: HashMap<&'static str, Box<dyn ExportFormat>>,
}

impl FormatRegistry {
    /// Create a new registry with all built-in formats registered.
    pub fn new() -> Self {
        let mut registry = Self {
            formats: HashMap::new(),
        };

        registry.register(Box::new(JsonFormat));
        registry.register(Box::new(CsvFormat));
        registry.register(Box::new(TrainingFormat));

        registry
    }

    /// Register a format implementation.
    pub fn register(&mut self, format: Box<dyn ExportFormat>) {
        self.formats.insert(format.id(), format);
    }

    /// Get a format by its ID.
    pub fn get(&self, id: &str) -> Option<&dyn ExportFormat> {
        self.formats.get(id).map(|f| f.as_ref())
    }

    /// Get all registered formats.
    pub fn all(&self) -> Vec<&dyn ExportFormat> {
        self.formats.values().map(|f| f.as_ref()).collect()
    }

    /// Get all format IDs.
    pub fn ids(&self) -> Vec<&'static str> {
        self.formats.keys().copied().collect()
    }

    /// Serialize annotations with the format registered under `format_id`.
    pub fn export(
        &self,
        annotations: &[Annotation],
        format_id: &str,
    ) -> Result<String, FormatError> {
        let format = self
            .get(format_id)
            .ok_or_else(|| FormatError::unsupported(format_id))?;
        log::info!(
            "Exporting {} annotations as {}",
            annotations.len(),
            format.display_name()
        );
        format.export(annotations)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}
