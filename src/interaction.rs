//! Pointer-driven rectangle drawing.
//!
//! A linear state machine: Idle until pointer-down, Drawing while the
//! pointer is held, back to Idle on release. All points are image-space;
//! the caller maps device input through the viewport first. A finished
//! drag is only offered for annotation when it clears the minimum size.

use crate::model::{Point, Rect};

/// Minimum width and height, in image pixels, a drag must exceed to
/// produce a rectangle.
pub const MIN_DRAG_SIZE: f64 = 5.0;

/// Drawing progress across pointer events.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawingState {
    /// Not drawing.
    Idle,
    /// Pointer held down; `anchor` is the down point, `cursor` the latest
    /// position. The anchor never moves during a drag.
    Drawing { anchor: Point, cursor: Point },
}

impl Default for DrawingState {
    fn default() -> Self {
        DrawingState::Idle
    }
}

/// Result of finishing a drag.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// No drag was in progress.
    NotDrawing,
    /// The drag stayed below the minimum size; nothing to create.
    TooSmall,
    /// The drag produced a usable rectangle; the caller should now ask the
    /// user for label text.
    AwaitingLabel(Rect),
}

impl DrawingState {
    pub fn is_drawing(&self) -> bool {
        !matches!(self, DrawingState::Idle)
    }

    /// Begin a drag at an image-space point.
    pub fn pointer_down(&mut self, point: Point) {
        log::debug!("Drawing started at ({:.1}, {:.1})", point.x, point.y);
        *self = DrawingState::Drawing {
            anchor: point,
            cursor: point,
        };
    }

    /// Track pointer motion. No-op when idle.
    pub fn pointer_move(&mut self, point: Point) {
        if let DrawingState::Drawing { cursor, .. } = self {
            *cursor = point;
        }
    }

    /// Rectangle between anchor and cursor.
    ///
    /// Well-formed for any drag direction: the corners are normalized to a
    /// min origin with non-negative size.
    pub fn preview(&self) -> Option<Rect> {
        match self {
            DrawingState::Idle => None,
            DrawingState::Drawing { anchor, cursor } => {
                Some(Rect::from_corners(anchor.x, anchor.y, cursor.x, cursor.y))
            }
        }
    }

    /// Finish the drag and return to Idle.
    ///
    /// The pointer leaving the surface is reported through the same path;
    /// both end the drag identically.
    pub fn pointer_up(&mut self) -> DragOutcome {
        let outcome = match self.preview() {
            None => DragOutcome::NotDrawing,
            Some(rect) if rect.width > MIN_DRAG_SIZE && rect.height > MIN_DRAG_SIZE => {
                log::debug!(
                    "Drawing finished: {:.1}x{:.1} at ({:.1}, {:.1})",
                    rect.width,
                    rect.height,
                    rect.x,
                    rect.y
                );
                DragOutcome::AwaitingLabel(rect)
            }
            Some(_) => {
                log::debug!("Drag below minimum size, discarded");
                DragOutcome::TooSmall
            }
        };
        *self = DrawingState::Idle;
        outcome
    }
}
