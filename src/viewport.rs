//! Viewport mathematics: pan/zoom state and coordinate mapping.
//!
//! The transform maps image space to surface space
//! (`surface = image * scale + pan`); raw device input is converted to
//! surface units by the pixel ratio first. Methods return new values, so
//! the owner decides when a transform actually becomes current.

use serde::{Deserialize, Serialize};

use crate::model::{Point, Rect};

/// Default padding around a focused rectangle, in surface pixels.
pub const FOCUS_PADDING: f64 = 100.0;

/// Upper scale bound applied when focusing an annotation.
pub const FOCUS_MAX_ZOOM: f64 = 4.0;

/// Smallest allowed zoom scale.
pub const MIN_SCALE: f64 = 0.1;

/// Largest allowed zoom scale.
pub const MAX_SCALE: f64 = 10.0;

/// Multiplicative step for [`Viewport::zoom_in`] / [`Viewport::zoom_out`].
pub const SCALE_STEP: f64 = 1.2;

/// Pan/zoom transform over the displayed image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scale: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    /// Backing image resolution over displayed surface size.
    pub pixel_ratio: f64,
}

impl Viewport {
    /// Identity transform: scale 1, no pan, pixel ratio 1.
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            pixel_ratio: 1.0,
        }
    }

    /// Identity transform with the given pixel ratio.
    pub fn with_pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        self
    }

    /// Map a raw device point to image coordinates.
    ///
    /// Exact identity at scale 1 with no pan and pixel ratio 1.
    pub fn to_image_space(&self, device_x: f64, device_y: f64) -> Point {
        let surface_x = device_x * self.pixel_ratio;
        let surface_y = device_y * self.pixel_ratio;
        Point::new(
            (surface_x - self.pan_x) / self.scale,
            (surface_y - self.pan_y) / self.scale,
        )
    }

    /// Map an image point back to raw device coordinates.
    pub fn to_device_space(&self, image_x: f64, image_y: f64) -> Point {
        Point::new(
            (image_x * self.scale + self.pan_x) / self.pixel_ratio,
            (image_y * self.scale + self.pan_y) / self.pixel_ratio,
        )
    }

    /// Back to identity scale and pan, keeping the pixel ratio.
    pub fn reset(&self) -> Viewport {
        Viewport {
            scale: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            pixel_ratio: self.pixel_ratio,
        }
    }

    /// Center a rectangle in the surface, zoomed to fit it plus padding.
    ///
    /// The scale is the tightest axis fit of `rect` plus `padding` on every
    /// side, capped at `max_zoom`; the pan centers the rectangle.
    pub fn focus(
        &self,
        rect: &Rect,
        surface_width: f64,
        surface_height: f64,
        padding: f64,
        max_zoom: f64,
    ) -> Viewport {
        let fit_x = surface_width / (rect.width + 2.0 * padding);
        let fit_y = surface_height / (rect.height + 2.0 * padding);
        let mut scale = fit_x.min(fit_y).min(max_zoom);
        if !scale.is_finite() || scale <= 0.0 {
            scale = max_zoom;
        }
        let center = rect.center();
        Viewport {
            scale,
            pan_x: surface_width / 2.0 - center.x * scale,
            pan_y: surface_height / 2.0 - center.y * scale,
            pixel_ratio: self.pixel_ratio,
        }
    }

    /// Rescale about a device-space cursor position.
    ///
    /// The image point under the cursor stays under the cursor: find it with
    /// the old transform, then choose the pan that maps it back to the same
    /// surface position at the new scale.
    pub fn zoom_at(&self, new_scale: f64, cursor_x: f64, cursor_y: f64) -> Viewport {
        let clamped = new_scale.clamp(MIN_SCALE, MAX_SCALE);
        let surface_x = cursor_x * self.pixel_ratio;
        let surface_y = cursor_y * self.pixel_ratio;
        let image_x = (surface_x - self.pan_x) / self.scale;
        let image_y = (surface_y - self.pan_y) / self.scale;
        Viewport {
            scale: clamped,
            pan_x: surface_x - image_x * clamped,
            pan_y: surface_y - image_y * clamped,
            pixel_ratio: self.pixel_ratio,
        }
    }

    /// Zoom in one step about the cursor.
    pub fn zoom_in(&self, cursor_x: f64, cursor_y: f64) -> Viewport {
        self.zoom_at(self.scale * SCALE_STEP, cursor_x, cursor_y)
    }

    /// Zoom out one step about the cursor.
    pub fn zoom_out(&self, cursor_x: f64, cursor_y: f64) -> Viewport {
        self.zoom_at(self.scale / SCALE_STEP, cursor_x, cursor_y)
    }

    /// Translate the view by a device-space delta.
    pub fn pan_by(&self, dx: f64, dy: f64) -> Viewport {
        Viewport {
            pan_x: self.pan_x + dx * self.pixel_ratio,
            pan_y: self.pan_y + dy * self.pixel_ratio,
            ..*self
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::identity()
    }
}
