//! W3C-style JSON collection format: export and lenient import.
//!
//! Export writes the full collection as a top-level array of annotation
//! objects with `body`/`target` structure. Import accepts the same shape
//! back, but leniently: the payload must be a JSON array, while each
//! element is parsed on its own so one malformed entry cannot sink the
//! rest. Elements that do not even deserialize surface as empty candidates
//! and fail validation downstream with a per-element report.

use serde::Serialize;
use serde_json::Value;

use crate::format::error::FormatError;
use crate::format::traits::ExportFormat;
use crate::model::{
    Annotation, BODY_TYPE_TEXTUAL, FRAGMENT_SELECTOR_TYPE, MEDIA_FRAGMENTS_SPEC, RawAnnotation,
    Rect,
};

/// Wire `type` marker on every exported annotation object.
const ANNOTATION_TYPE: &str = "Annotation";

#[derive(Debug, Serialize)]
struct WireAnnotation {
    id: String,
    #[serde(rename = "type")]
    kind: &'static str,
    body: Vec<WireBody>,
    target: WireTarget,
    created: String,
    modified: String,
    creator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
}

#[derive(Debug, Serialize)]
struct WireBody {
    #[serde(rename = "type")]
    kind: &'static str,
    value: String,
    purpose: &'static str,
}

#[derive(Debug, Serialize)]
struct WireTarget {
    source: String,
    selector: WireSelector,
}

#[derive(Debug, Serialize)]
struct WireSelector {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "conformsTo")]
    conforms_to: &'static str,
    value: Rect,
}

impl From<&Annotation> for WireAnnotation {
    fn from(annotation: &Annotation) -> Self {
        let body = annotation
            .body_entries()
            .iter()
            .map(|entry| WireBody {
                kind: BODY_TYPE_TEXTUAL,
                value: entry.value().to_string(),
                purpose: entry.purpose(),
            })
            .collect();
        Self {
            id: annotation.id.clone(),
            kind: ANNOTATION_TYPE,
            body,
            target: WireTarget {
                source: annotation.source.clone(),
                selector: WireSelector {
                    kind: FRAGMENT_SELECTOR_TYPE,
                    conforms_to: MEDIA_FRAGMENTS_SPEC,
                    value: annotation.geometry,
                },
            },
            created: annotation
                .created
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            modified: annotation
                .modified
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            creator: annotation.creator.clone(),
            label: annotation.label.clone(),
            confidence: annotation.confidence,
        }
    }
}

/// The "json" export format.
#[derive(Debug, Default)]
pub struct JsonFormat;

impl ExportFormat for JsonFormat {
    fn id(&self) -> &'static str {
        "json"
    }

    fn display_name(&self) -> &'static str {
        "Annotation JSON"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn export(&self, annotations: &[Annotation]) -> Result<String, FormatError> {
        let wire: Vec<WireAnnotation> = annotations.iter().map(WireAnnotation::from).collect();
        Ok(serde_json::to_string_pretty(&wire)?)
    }
}

/// Parse a JSON payload into loose annotation candidates.
///
/// Fails only when the payload is not valid JSON or not a top-level array.
/// Elements that do not match the expected object shape become empty
/// candidates (logged here), so validation downstream reports them as
/// skipped instead of aborting the import.
pub fn import_collection(payload: &str) -> Result<Vec<RawAnnotation>, FormatError> {
    let parsed: Value = serde_json::from_str(payload)?;
    let Value::Array(items) = parsed else {
        return Err(FormatError::NotAnArray);
    };
    let candidates = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match serde_json::from_value(item) {
            Ok(raw) => raw,
            Err(error) => {
                log::debug!("Payload element {} does not parse: {}", index, error);
                RawAnnotation::default()
            }
        })
        .collect();
    Ok(candidates)
}
