//! Training-data JSON export for model pipelines.
//!
//! Flattens each annotation to the fields a training job consumes: text,
//! bounding box, label, confidence. Label and confidence fall back to
//! defaults when the annotation does not carry them.

use serde::Serialize;

use crate::format::error::FormatError;
use crate::format::traits::ExportFormat;
use crate::model::{Annotation, Rect};

/// Label recorded when the annotation has none.
const DEFAULT_LABEL: &str = "text";

/// Confidence recorded when the annotation has none.
const DEFAULT_CONFIDENCE: f64 = 1.0;

#[derive(Debug, Serialize)]
struct TrainingRecord {
    id: String,
    text: String,
    bbox: Rect,
    label: String,
    confidence: f64,
    created: String,
    modified: String,
}

impl From<&Annotation> for TrainingRecord {
    fn from(annotation: &Annotation) -> Self {
        Self {
            id: annotation.id.clone(),
            text: annotation.text.clone(),
            bbox: annotation.geometry,
            label: annotation
                .label
                .clone()
                .unwrap_or_else(|| DEFAULT_LABEL.to_string()),
            confidence: annotation.confidence.unwrap_or(DEFAULT_CONFIDENCE),
            created: annotation
                .created
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            modified: annotation
                .modified
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}

/// The "training" export format.
#[derive(Debug, Default)]
pub struct TrainingFormat;

impl ExportFormat for TrainingFormat {
    fn id(&self) -> &'static str {
        "training"
    }

    fn display_name(&self) -> &'static str {
        "Training Data"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn export(&self, annotations: &[Annotation]) -> Result<String, FormatError> {
        let records: Vec<TrainingRecord> = annotations.iter().map(TrainingRecord::from).collect();
        Ok(serde_json::to_string_pretty(&records)?)
    }
}
