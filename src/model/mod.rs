//! Core data model: geometry, the annotation record, and validation.

mod annotation;
mod geometry;
mod validate;

pub use annotation::{
    Annotation, AnnotationMeta, BODY_TYPE_TEXTUAL, BodyEntry, DEFAULT_CREATOR,
    FRAGMENT_SELECTOR_TYPE, MEDIA_FRAGMENTS_SPEC, PURPOSE_COMMENTING, PURPOSE_TAGGING,
    generate_annotation_id,
};
pub use geometry::{Point, Rect};
pub use validate::{
    RawAnnotation, RawBody, RawRect, RawSelector, RawTarget, Validation, validate,
};
