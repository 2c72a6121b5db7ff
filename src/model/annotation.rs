//! The annotation record and its wire body entries.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::geometry::Rect;

/// Creator recorded when the caller does not supply one.
pub const DEFAULT_CREATOR: &str = "anonymous";

/// Body entry type marker in the wire format.
pub const BODY_TYPE_TEXTUAL: &str = "TextualBody";

/// Body purpose of the primary comment.
pub const PURPOSE_COMMENTING: &str = "commenting";

/// Body purpose of a tag.
pub const PURPOSE_TAGGING: &str = "tagging";

/// Selector type marker for rectangle targets in the wire format.
pub const FRAGMENT_SELECTOR_TYPE: &str = "FragmentSelector";

/// Spec URL recorded in the selector's `conformsTo` field.
pub const MEDIA_FRAGMENTS_SPEC: &str = "http://www.w3.org/TR/media-frags/";

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a collection-unique annotation id.
///
/// Shape: `annotation_<unix millis>_<base36 counter>`. The counter keeps ids
/// distinct even when several are generated within the same millisecond.
pub fn generate_annotation_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let count = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("annotation_{}_{}", millis, to_base36(count))
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut out = String::new();
    while value > 0 {
        let digit = (value % 36) as u32;
        out.insert(0, char::from_digit(digit, 36).unwrap_or('0'));
        value /= 36;
    }
    out
}

/// One entry of the wire-format `body` array, tagged by purpose.
///
/// An annotation carries exactly one comment and any number of tags; the
/// comment always serializes first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyEntry {
    /// The primary comment text.
    Comment(String),
    /// A single tag value.
    Tag(String),
}

impl BodyEntry {
    /// The wire `purpose` string for this entry.
    pub fn purpose(&self) -> &'static str {
        match self {
            BodyEntry::Comment(_) => PURPOSE_COMMENTING,
            BodyEntry::Tag(_) => PURPOSE_TAGGING,
        }
    }

    /// The text carried by this entry.
    pub fn value(&self) -> &str {
        match self {
            BodyEntry::Comment(value) => value,
            BodyEntry::Tag(value) => value,
        }
    }
}

/// Optional fields accepted when creating an annotation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationMeta {
    /// Source identifier of the annotated image; defaults to the loaded image.
    pub source: Option<String>,
    /// Creator name; defaults to [`DEFAULT_CREATOR`].
    pub creator: Option<String>,
    /// Training label.
    pub label: Option<String>,
    /// Training confidence.
    pub confidence: Option<f64>,
    /// Initial tag values.
    pub tags: Vec<String>,
}

/// A single rectangular text annotation on an image.
///
/// Values are treated as immutable: updates build a new `Annotation` with a
/// refreshed `modified` stamp instead of mutating in place, so history
/// snapshots never alias live data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Unique identifier, stable for the annotation's lifetime.
    pub id: String,
    /// Primary comment text. May be empty.
    pub text: String,
    /// Tag values, order preserved.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Rectangle on the target image, in image-pixel space.
    pub geometry: Rect,
    /// Source identifier of the annotated image.
    #[serde(default)]
    pub source: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub creator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Annotation {
    /// Build a new annotation with a fresh id and current timestamps.
    pub fn new(text: impl Into<String>, geometry: Rect, meta: AnnotationMeta) -> Self {
        let now = Utc::now();
        Self {
            id: generate_annotation_id(),
            text: text.into(),
            tags: meta.tags,
            geometry,
            source: meta.source.unwrap_or_default(),
            created: now,
            modified: now,
            creator: meta.creator.unwrap_or_else(|| DEFAULT_CREATOR.to_string()),
            label: meta.label,
            confidence: meta.confidence,
        }
    }

    /// Copy with replacement text and a refreshed `modified` stamp.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            modified: Utc::now(),
            ..self.clone()
        }
    }

    /// Copy with replacement geometry and a refreshed `modified` stamp.
    pub fn with_geometry(&self, geometry: Rect) -> Self {
        Self {
            geometry,
            modified: Utc::now(),
            ..self.clone()
        }
    }

    /// Copy with replacement tags and a refreshed `modified` stamp.
    pub fn with_tags(&self, tags: Vec<String>) -> Self {
        Self {
            tags,
            modified: Utc::now(),
            ..self.clone()
        }
    }

    /// True when the comment text is non-blank.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Body entries in wire order: the comment first, then tags.
    pub fn body_entries(&self) -> Vec<BodyEntry> {
        let mut entries = Vec::with_capacity(1 + self.tags.len());
        entries.push(BodyEntry::Comment(self.text.clone()));
        entries.extend(self.tags.iter().cloned().map(BodyEntry::Tag));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique_and_well_formed() {
        let a = generate_annotation_id();
        let b = generate_annotation_id();
        assert_ne!(a, b);
        assert!(a.starts_with("annotation_"));
        assert_eq!(a.split('_').count(), 3);
    }

    #[test]
    fn test_base36_rendering() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(36 * 36 + 1), "101");
    }

    #[test]
    fn test_new_applies_defaults() {
        let a = Annotation::new(
            "a sign",
            Rect::new(0.0, 0.0, 10.0, 10.0),
            AnnotationMeta::default(),
        );
        assert_eq!(a.creator, DEFAULT_CREATOR);
        assert_eq!(a.source, "");
        assert_eq!(a.created, a.modified);
        assert!(a.tags.is_empty());
        assert!(a.label.is_none());
    }

    #[test]
    fn test_with_text_refreshes_modified_only() {
        let a = Annotation::new(
            "before",
            Rect::new(0.0, 0.0, 10.0, 10.0),
            AnnotationMeta::default(),
        );
        let b = a.with_text("after");
        assert_eq!(b.text, "after");
        assert_eq!(b.id, a.id);
        assert_eq!(b.created, a.created);
        assert!(b.modified >= a.modified);
    }

    #[test]
    fn test_body_entries_start_with_the_comment() {
        let meta = AnnotationMeta {
            tags: vec!["street".to_string(), "sign".to_string()],
            ..AnnotationMeta::default()
        };
        let a = Annotation::new("stop", Rect::new(0.0, 0.0, 10.0, 10.0), meta);
        let entries = a.body_entries();
        assert_eq!(entries[0], BodyEntry::Comment("stop".to_string()));
        assert_eq!(entries[1], BodyEntry::Tag("street".to_string()));
        assert_eq!(entries[2], BodyEntry::Tag("sign".to_string()));
        assert_eq!(entries[0].purpose(), PURPOSE_COMMENTING);
        assert_eq!(entries[1].purpose(), PURPOSE_TAGGING);
    }

    #[test]
    fn test_has_text_treats_whitespace_as_blank() {
        let mut a = Annotation::new(
            "x",
            Rect::new(0.0, 0.0, 10.0, 10.0),
            AnnotationMeta::default(),
        );
        assert!(a.has_text());
        a.text = "   ".to_string();
        assert!(!a.has_text());
    }
}
