//! Trait definition for annotation export formats.

use crate::format::error::FormatError;
use crate::model::Annotation;

/// Trait for annotation collection serializers.
///
/// Each format ("json", "csv", "training") implements this trait to turn
/// the in-memory collection into a string payload. Implementations are
/// stateless; the actual file or network transport is the caller's job.
pub trait ExportFormat: Send + Sync {
    /// Unique identifier used to request this format (e.g., "csv").
    fn id(&self) -> &'static str;

    /// Human-readable name for UI display.
    fn display_name(&self) -> &'static str;

    /// File extension without the leading dot.
    fn extension(&self) -> &'static str;

    /// Serialize the collection in collection order.
    fn export(&self, annotations: &[Annotation]) -> Result<String, FormatError>;

    /// Suggested output filename, carrying the current local date.
    fn default_filename(&self) -> String {
        format!(
            "annotations-{}.{}",
            chrono::Local::now().format("%Y-%m-%d"),
            self.extension()
        )
    }
}
