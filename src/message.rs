//! Engine message types.
//!
//! All edits, view changes, and pointer events are represented as messages
//! in the Elm architecture style; the engine consumes them through its
//! `apply_*` dispatchers so every entry point funnels through the same
//! validation, history, and error handling.

use crate::model::{AnnotationMeta, Rect};

/// Messages that mutate the annotation collection.
#[derive(Debug, Clone, PartialEq)]
pub enum EditMessage {
    /// Create a new annotation from text and geometry
    Create {
        text: String,
        geometry: Rect,
        meta: AnnotationMeta,
    },
    /// Replace the text of an existing annotation
    UpdateText { id: String, text: String },
    /// Replace the geometry of an existing annotation
    UpdateGeometry { id: String, geometry: Rect },
    /// Replace the tags of an existing annotation
    UpdateTags { id: String, tags: Vec<String> },
    /// Delete an annotation by id
    Delete { id: String },
    /// Delete several annotations in one step
    DeleteMany { ids: Vec<String> },
    /// Change the selection; `None` clears it
    Select { id: Option<String> },
    /// Undo the last collection change
    Undo,
    /// Redo a previously undone change
    Redo,
}

/// Messages that change the viewport without touching annotations.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewMessage {
    /// Zoom in one step about the surface center
    ZoomIn,
    /// Zoom out one step about the surface center
    ZoomOut,
    /// Zoom to an absolute scale about a device-space cursor
    ZoomAt {
        scale: f64,
        cursor_x: f64,
        cursor_y: f64,
    },
    /// Translate the view by a device-space delta
    Pan { dx: f64, dy: f64 },
    /// Reset pan and zoom to the identity transform
    Reset,
    /// Center and zoom onto an annotation
    Focus { id: String },
}

/// Raw pointer events in device coordinates, driving the drawing machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerMessage {
    /// Primary button pressed
    Down { x: f64, y: f64 },
    /// Pointer moved
    Move { x: f64, y: f64 },
    /// Primary button released
    Up,
    /// Pointer left the drawing surface
    Leave,
}
