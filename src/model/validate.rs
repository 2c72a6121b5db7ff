//! Lenient wire mirror and field validation.
//!
//! Import paths parse payload elements into [`RawAnnotation`], where every
//! field is optional, so malformed items can be inspected and reported
//! instead of failing the whole payload. Validation collects every
//! violation it finds; it never stops at the first error and never panics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::annotation::{
    Annotation, BODY_TYPE_TEXTUAL, DEFAULT_CREATOR, FRAGMENT_SELECTOR_TYPE, MEDIA_FRAGMENTS_SPEC,
    PURPOSE_COMMENTING, PURPOSE_TAGGING,
};
use crate::model::geometry::Rect;

/// Loosely-typed annotation as found in external payloads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAnnotation {
    pub id: Option<String>,
    pub body: Option<Vec<RawBody>>,
    pub target: Option<RawTarget>,
    pub created: Option<String>,
    pub modified: Option<String>,
    pub creator: Option<String>,
    pub label: Option<String>,
    pub confidence: Option<f64>,
}

/// One loosely-typed body entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawBody {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub value: Option<String>,
    pub purpose: Option<String>,
}

/// Loosely-typed annotation target.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTarget {
    pub source: Option<String>,
    pub selector: Option<RawSelector>,
}

/// Loosely-typed target selector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSelector {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(rename = "conformsTo")]
    pub conforms_to: Option<String>,
    pub value: Option<RawRect>,
}

/// Bounding box with unchecked coordinate values.
///
/// Coordinates stay as raw JSON values so a string where a number belongs
/// turns into a validation message, not a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRect {
    pub x: Option<Value>,
    pub y: Option<Value>,
    pub width: Option<Value>,
    pub height: Option<Value>,
}

impl RawRect {
    fn coord(value: &Option<Value>) -> Option<f64> {
        value.as_ref().and_then(Value::as_f64).filter(|v| v.is_finite())
    }
}

/// Result of validating a single annotation candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    /// Every violation found, in field order.
    pub errors: Vec<String>,
}

/// Check an annotation candidate, collecting all violations.
pub fn validate(raw: &RawAnnotation) -> Validation {
    let mut errors = Vec::new();

    if raw.id.as_deref().is_none_or(str::is_empty) {
        errors.push("Annotation must have an ID".to_string());
    }

    let has_text = raw
        .body
        .as_deref()
        .is_some_and(|body| body.iter().any(|entry| entry.value.is_some()));
    if !has_text {
        errors.push("Annotation must have text content".to_string());
    }

    match raw.bbox() {
        None => errors.push("Annotation must have bounding box coordinates".to_string()),
        Some(bbox) => {
            let x = RawRect::coord(&bbox.x);
            let y = RawRect::coord(&bbox.y);
            if x.is_none() || y.is_none() {
                errors.push("Bounding box must have valid x,y coordinates".to_string());
            }
            let width = RawRect::coord(&bbox.width);
            let height = RawRect::coord(&bbox.height);
            match (width, height) {
                (Some(w), Some(h)) => {
                    if w <= 0.0 || h <= 0.0 {
                        errors.push(
                            "Bounding box must have positive width and height".to_string(),
                        );
                    }
                }
                _ => errors.push("Bounding box must have valid width,height".to_string()),
            }
        }
    }

    Validation {
        valid: errors.is_empty(),
        errors,
    }
}

impl RawAnnotation {
    fn bbox(&self) -> Option<&RawRect> {
        self.target.as_ref()?.selector.as_ref()?.value.as_ref()
    }

    /// Convert to a typed [`Annotation`].
    ///
    /// Returns None when the id or the bounding box is unusable; callers
    /// run [`validate`] first to get the full error list. Body entries with
    /// an unknown purpose are dropped; only the first comment is kept.
    pub fn to_annotation(&self) -> Option<Annotation> {
        let id = self.id.clone().filter(|id| !id.is_empty())?;
        let geometry = self.geometry()?;

        let mut text: Option<String> = None;
        let mut tags = Vec::new();
        for entry in self.body.as_deref().unwrap_or_default() {
            match entry.purpose.as_deref() {
                Some(PURPOSE_TAGGING) => {
                    if let Some(value) = &entry.value {
                        tags.push(value.clone());
                    }
                }
                Some(PURPOSE_COMMENTING) | None => {
                    if text.is_none() {
                        text = entry.value.clone();
                    } else if entry.value.is_some() {
                        log::debug!("Ignoring extra comment body entry on {}", id);
                    }
                }
                Some(other) => {
                    log::debug!("Ignoring body entry with purpose '{}' on {}", other, id);
                }
            }
        }

        let created = parse_timestamp(self.created.as_deref(), &id);
        let modified = match self.modified.as_deref() {
            Some(_) => parse_timestamp(self.modified.as_deref(), &id),
            None => created,
        };

        Some(Annotation {
            id,
            text: text.unwrap_or_default(),
            tags,
            geometry,
            source: self
                .target
                .as_ref()
                .and_then(|t| t.source.clone())
                .unwrap_or_default(),
            created,
            modified,
            creator: self
                .creator
                .clone()
                .unwrap_or_else(|| DEFAULT_CREATOR.to_string()),
            label: self.label.clone(),
            confidence: self.confidence,
        })
    }

    fn geometry(&self) -> Option<Rect> {
        let bbox = self.bbox()?;
        let x = RawRect::coord(&bbox.x)?;
        let y = RawRect::coord(&bbox.y)?;
        let width = RawRect::coord(&bbox.width)?;
        let height = RawRect::coord(&bbox.height)?;
        Some(Rect::new(x, y, width, height))
    }
}

fn parse_timestamp(value: Option<&str>, id: &str) -> DateTime<Utc> {
    match value {
        Some(text) => match DateTime::parse_from_rfc3339(text) {
            Ok(parsed) => parsed.with_timezone(&Utc),
            Err(_) => {
                log::warn!("Unparseable timestamp '{}' on {}, using now", text, id);
                Utc::now()
            }
        },
        None => Utc::now(),
    }
}

impl From<&Annotation> for RawAnnotation {
    fn from(annotation: &Annotation) -> Self {
        let body = annotation
            .body_entries()
            .iter()
            .map(|entry| RawBody {
                kind: Some(BODY_TYPE_TEXTUAL.to_string()),
                value: Some(entry.value().to_string()),
                purpose: Some(entry.purpose().to_string()),
            })
            .collect();
        Self {
            id: Some(annotation.id.clone()),
            body: Some(body),
            target: Some(RawTarget {
                source: Some(annotation.source.clone()),
                selector: Some(RawSelector {
                    kind: Some(FRAGMENT_SELECTOR_TYPE.to_string()),
                    conforms_to: Some(MEDIA_FRAGMENTS_SPEC.to_string()),
                    value: Some(RawRect {
                        x: Some(annotation.geometry.x.into()),
                        y: Some(annotation.geometry.y.into()),
                        width: Some(annotation.geometry.width.into()),
                        height: Some(annotation.geometry.height.into()),
                    }),
                }),
            }),
            created: Some(annotation.created.to_rfc3339()),
            modified: Some(annotation.modified.to_rfc3339()),
            creator: Some(annotation.creator.clone()),
            label: annotation.label.clone(),
            confidence: annotation.confidence,
        }
    }
}
