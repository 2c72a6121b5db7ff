//! The headless annotation engine.
//!
//! Owns the collection, history, search index, viewport, and drawing
//! machine, and keeps them consistent: every committed mutation records a
//! history snapshot, rebuilds the search index, schedules an auto-save,
//! and drops a selection that no longer resolves. Single-threaded and
//! synchronous; callers feed it messages and poll auto-save.

use crate::config::EngineConfig;
use crate::format::{AutoSave, FormatError, FormatRegistry, import_collection};
use crate::history::History;
use crate::interaction::{DragOutcome, DrawingState};
use crate::message::{EditMessage, PointerMessage, ViewMessage};
use crate::model::{Annotation, AnnotationMeta, DEFAULT_CREATOR, Rect};
use crate::search::{self, SearchCriteria, SearchHit, SearchIndex};
use crate::stats::CollectionStats;
use crate::store::{AnnotationStore, ReplaceReport, StoreError};
use crate::viewport::{FOCUS_MAX_ZOOM, FOCUS_PADDING, Viewport};

/// The image annotations are drawn over.
///
/// The engine never touches pixel data; it only needs the source
/// identifier for new annotations and the resolution for coordinate
/// mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageHandle {
    /// Source identifier recorded on annotations of this image.
    pub source: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

pub struct Engine {
    // === Collection ===
    store: AnnotationStore,
    history: History,
    index: SearchIndex,

    // === View ===
    viewport: Viewport,
    /// Displayed surface size in device units, once the host reports it.
    surface_size: Option<(f64, f64)>,
    image: Option<ImageHandle>,

    // === Interaction ===
    drawing: DrawingState,
    /// Finished drag waiting for label text.
    pending_rect: Option<Rect>,
    selected_id: Option<String>,

    // === Persistence ===
    registry: FormatRegistry,
    auto_save: AutoSave,

    // === Session ===
    default_creator: String,
    /// Message of the most recent failed operation, until the next one.
    last_error: Option<String>,
}

impl Engine {
    /// Create an empty engine with default settings.
    pub fn new() -> Self {
        Self {
            store: AnnotationStore::new(),
            history: History::new(Vec::new()),
            index: SearchIndex::default(),
            viewport: Viewport::identity(),
            surface_size: None,
            image: None,
            drawing: DrawingState::default(),
            pending_rect: None,
            selected_id: None,
            registry: FormatRegistry::new(),
            auto_save: AutoSave::new(),
            default_creator: DEFAULT_CREATOR.to_string(),
            last_error: None,
        }
    }

    /// Create an engine configured from user settings.
    pub fn with_config(config: &EngineConfig) -> Self {
        let mut engine = Self::new();
        engine.default_creator = config.creator.clone();
        engine.auto_save = config.preferences.to_auto_save();
        engine
    }

    // =========================================================================
    // Image and surface context
    // =========================================================================

    /// Set the image annotations refer to. Resets the viewport.
    pub fn load_image(&mut self, source: impl Into<String>, width: u32, height: u32) {
        let source = source.into();
        log::info!("Image loaded: {} ({}x{})", source, width, height);
        self.image = Some(ImageHandle {
            source,
            width,
            height,
        });
        self.viewport = Viewport::identity();
        self.update_pixel_ratio();
    }

    /// Report the displayed surface size in device units.
    pub fn set_surface_size(&mut self, width: f64, height: f64) {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            log::warn!("Ignoring degenerate surface size {}x{}", width, height);
            return;
        }
        self.surface_size = Some((width, height));
        self.update_pixel_ratio();
    }

    /// Derive the pixel ratio from image resolution over surface width.
    fn update_pixel_ratio(&mut self) {
        if let (Some(image), Some((surface_width, _))) = (&self.image, self.surface_size) {
            let ratio = f64::from(image.width) / surface_width;
            self.viewport = self.viewport.with_pixel_ratio(ratio);
        }
    }

    pub fn image(&self) -> Option<&ImageHandle> {
        self.image.as_ref()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    // =========================================================================
    // Collection operations
    // =========================================================================

    /// All annotations in insertion order.
    pub fn annotations(&self) -> &[Annotation] {
        self.store.annotations()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Annotation> {
        self.store.get(id)
    }

    /// Create an annotation, filling source and creator from the session
    /// when the caller leaves them out.
    pub fn create(
        &mut self,
        text: &str,
        geometry: Rect,
        mut meta: AnnotationMeta,
    ) -> Result<Annotation, StoreError> {
        self.last_error = None;
        if meta.source.is_none() {
            meta.source = self.image.as_ref().map(|image| image.source.clone());
        }
        if meta.creator.is_none() {
            meta.creator = Some(self.default_creator.clone());
        }
        match self.store.create(text, geometry, meta) {
            Ok(annotation) => {
                self.commit();
                Ok(annotation)
            }
            Err(error) => {
                self.fail(&error);
                Err(error)
            }
        }
    }

    pub fn update_text(&mut self, id: &str, text: &str) -> Result<Annotation, StoreError> {
        self.last_error = None;
        match self.store.update_text(id, text) {
            Ok(annotation) => {
                self.commit();
                Ok(annotation)
            }
            Err(error) => {
                self.fail(&error);
                Err(error)
            }
        }
    }

    pub fn update_geometry(&mut self, id: &str, geometry: Rect) -> Result<Annotation, StoreError> {
        self.last_error = None;
        match self.store.update_geometry(id, geometry) {
            Ok(annotation) => {
                self.commit();
                Ok(annotation)
            }
            Err(error) => {
                self.fail(&error);
                Err(error)
            }
        }
    }

    pub fn update_tags(&mut self, id: &str, tags: Vec<String>) -> Result<Annotation, StoreError> {
        self.last_error = None;
        match self.store.update_tags(id, tags) {
            Ok(annotation) => {
                self.commit();
                Ok(annotation)
            }
            Err(error) => {
                self.fail(&error);
                Err(error)
            }
        }
    }

    /// Delete by id; absent ids are ignored. True when something was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        self.last_error = None;
        let removed = self.store.delete(id);
        if removed {
            self.commit();
        }
        removed
    }

    /// Delete several annotations in one history step.
    pub fn delete_many(&mut self, ids: &[String]) -> usize {
        self.last_error = None;
        let removed = self.store.delete_many(ids);
        if removed > 0 {
            self.commit();
        }
        removed
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Step the collection back one snapshot. False when at the oldest.
    pub fn undo(&mut self) -> bool {
        self.last_error = None;
        match self.history.undo() {
            Some(snapshot) => {
                self.store.restore(snapshot);
                self.refresh();
                true
            }
            None => {
                log::debug!("Nothing to undo");
                false
            }
        }
    }

    /// Step the collection forward one snapshot. False when at the newest.
    pub fn redo(&mut self) -> bool {
        self.last_error = None;
        match self.history.redo() {
            Some(snapshot) => {
                self.store.restore(snapshot);
                self.refresh();
                true
            }
            None => {
                log::debug!("Nothing to redo");
                false
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Change the selection. Unknown ids leave it unchanged and return false.
    pub fn select(&mut self, id: Option<&str>) -> bool {
        match id {
            None => {
                self.selected_id = None;
                true
            }
            Some(id) if self.store.contains(id) => {
                self.selected_id = Some(id.to_string());
                true
            }
            Some(id) => {
                log::warn!("Cannot select unknown annotation {}", id);
                false
            }
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn selected(&self) -> Option<&Annotation> {
        self.selected_id.as_ref().and_then(|id| self.store.get(id))
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Fuzzy search, results ranked best first. Empty query returns the
    /// whole collection in order.
    pub fn search(&self, query: &str) -> Vec<Annotation> {
        let annotations = self.store.annotations();
        self.index
            .search(query)
            .into_iter()
            .map(|hit| annotations[hit.index].clone())
            .collect()
    }

    /// Fuzzy search returning scored hits into [`Engine::annotations`].
    pub fn search_hits(&self, query: &str) -> Vec<SearchHit> {
        self.index.search(query)
    }

    /// Filtered search; all given criteria must hold.
    pub fn advanced_search(&self, criteria: &SearchCriteria) -> Vec<Annotation> {
        search::advanced_search(self.store.annotations(), criteria)
    }

    /// Type-ahead word suggestions from the comment texts.
    pub fn suggestions(&self, query: &str, limit: usize) -> Vec<String> {
        search::suggestions(self.store.annotations(), query, limit)
    }

    pub fn stats(&self) -> CollectionStats {
        CollectionStats::compute(self.store.annotations())
    }

    // =========================================================================
    // Pointer-driven drawing
    // =========================================================================

    /// Feed a raw pointer event through the drawing machine.
    ///
    /// Returns the finished rectangle when a drag completes above the
    /// minimum size; it is then held until [`Engine::submit_label`] or
    /// [`Engine::cancel_pending`] resolves it.
    pub fn apply_pointer(&mut self, message: PointerMessage) -> Option<Rect> {
        match message {
            PointerMessage::Down { x, y } => {
                if self.image.is_none() {
                    log::debug!("Pointer ignored: no image loaded");
                    return None;
                }
                let point = self.viewport.to_image_space(x, y);
                self.drawing.pointer_down(point);
                None
            }
            PointerMessage::Move { x, y } => {
                let point = self.viewport.to_image_space(x, y);
                self.drawing.pointer_move(point);
                None
            }
            PointerMessage::Up | PointerMessage::Leave => match self.drawing.pointer_up() {
                DragOutcome::AwaitingLabel(rect) => {
                    self.pending_rect = Some(rect);
                    Some(rect)
                }
                DragOutcome::TooSmall | DragOutcome::NotDrawing => None,
            },
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing.is_drawing()
    }

    /// In-progress drag rectangle for rendering.
    pub fn preview(&self) -> Option<Rect> {
        self.drawing.preview()
    }

    /// Finished drag rectangle waiting for label text.
    pub fn pending_rect(&self) -> Option<Rect> {
        self.pending_rect
    }

    /// Turn the pending rectangle into an annotation with the given text.
    ///
    /// A blank label discards the rectangle. The pending rectangle survives
    /// a failed create so the caller can retry.
    pub fn submit_label(&mut self, text: &str) -> Result<Option<Annotation>, StoreError> {
        let Some(rect) = self.pending_rect else {
            log::debug!("No pending rectangle to label");
            return Ok(None);
        };
        if text.trim().is_empty() {
            log::debug!("Empty label, pending rectangle discarded");
            self.pending_rect = None;
            return Ok(None);
        }
        let annotation = self.create(text, rect, AnnotationMeta::default())?;
        self.pending_rect = None;
        Ok(Some(annotation))
    }

    /// Discard the pending rectangle without creating anything.
    pub fn cancel_pending(&mut self) {
        if self.pending_rect.take().is_some() {
            log::debug!("Pending rectangle discarded");
        }
    }

    // =========================================================================
    // Import and export
    // =========================================================================

    /// Serialize the collection with a registered format.
    pub fn export(&mut self, format_id: &str) -> Result<String, FormatError> {
        self.last_error = None;
        match self.registry.export(self.store.annotations(), format_id) {
            Ok(payload) => Ok(payload),
            Err(error) => {
                self.fail(&error);
                Err(error)
            }
        }
    }

    /// Suggested filename for a format, None for unknown ids.
    pub fn export_filename(&self, format_id: &str) -> Option<String> {
        self.registry
            .get(format_id)
            .map(|format| format.default_filename())
    }

    /// Registered export format ids.
    pub fn format_ids(&self) -> Vec<&'static str> {
        self.registry.ids()
    }

    /// Replace the collection with the annotations in a JSON payload.
    ///
    /// Partial acceptance: invalid elements are skipped and reported, and
    /// the skip count lands in [`Engine::last_error`] so hosts can surface
    /// it. Fails outright only when the payload is not a JSON array.
    pub fn import_json(&mut self, payload: &str) -> Result<ReplaceReport, FormatError> {
        self.last_error = None;
        let candidates = match import_collection(payload) {
            Ok(candidates) => candidates,
            Err(error) => {
                self.fail(&error);
                return Err(error);
            }
        };
        let report = self.store.replace_all(&candidates);
        self.commit();
        if report.skipped > 0 {
            self.last_error = Some(report.summary());
        }
        Ok(report)
    }

    // =========================================================================
    // Auto-save
    // =========================================================================

    /// True when a scheduled save should run now.
    pub fn autosave_due(&self) -> bool {
        self.auto_save.due()
    }

    /// True when an edit has scheduled a save that has not run yet.
    pub fn autosave_pending(&self) -> bool {
        self.auto_save.is_pending()
    }

    /// Record a completed save.
    pub fn mark_saved(&mut self) {
        self.auto_save.mark_saved();
    }

    /// Record a failed save; the retry is deferred, not dropped.
    pub fn mark_save_failed(&mut self) {
        self.auto_save.mark_save_failed();
    }

    /// Drop the scheduled save, if any.
    pub fn cancel_pending_save(&mut self) {
        self.auto_save.cancel();
    }

    pub fn set_autosave_enabled(&mut self, enabled: bool) {
        self.auto_save.set_enabled(enabled);
    }

    // =========================================================================
    // Message dispatch
    // =========================================================================

    /// Apply a collection edit; failures land in [`Engine::last_error`].
    pub fn apply_edit(&mut self, message: EditMessage) {
        match message {
            EditMessage::Create {
                text,
                geometry,
                meta,
            } => {
                let _ = self.create(&text, geometry, meta);
            }
            EditMessage::UpdateText { id, text } => {
                let _ = self.update_text(&id, &text);
            }
            EditMessage::UpdateGeometry { id, geometry } => {
                let _ = self.update_geometry(&id, geometry);
            }
            EditMessage::UpdateTags { id, tags } => {
                let _ = self.update_tags(&id, tags);
            }
            EditMessage::Delete { id } => {
                self.delete(&id);
            }
            EditMessage::DeleteMany { ids } => {
                self.delete_many(&ids);
            }
            EditMessage::Select { id } => {
                self.select(id.as_deref());
            }
            EditMessage::Undo => {
                self.undo();
            }
            EditMessage::Redo => {
                self.redo();
            }
        }
    }

    /// Apply a view change. View messages never touch the collection.
    pub fn apply_view(&mut self, message: ViewMessage) {
        match message {
            ViewMessage::ZoomIn => {
                let (cx, cy) = self.surface_center();
                self.viewport = self.viewport.zoom_in(cx, cy);
            }
            ViewMessage::ZoomOut => {
                let (cx, cy) = self.surface_center();
                self.viewport = self.viewport.zoom_out(cx, cy);
            }
            ViewMessage::ZoomAt {
                scale,
                cursor_x,
                cursor_y,
            } => {
                self.viewport = self.viewport.zoom_at(scale, cursor_x, cursor_y);
            }
            ViewMessage::Pan { dx, dy } => {
                self.viewport = self.viewport.pan_by(dx, dy);
            }
            ViewMessage::Reset => {
                self.viewport = self.viewport.reset();
            }
            ViewMessage::Focus { id } => {
                self.focus(&id);
            }
        }
    }

    /// Center and zoom the view onto an annotation.
    ///
    /// Requires a reported surface size; unknown ids are a logged no-op.
    pub fn focus(&mut self, id: &str) {
        let Some((surface_width, surface_height)) = self.surface_size else {
            log::warn!("Cannot focus without a surface size");
            return;
        };
        let Some(annotation) = self.store.get(id) else {
            log::warn!("Cannot focus unknown annotation {}", id);
            return;
        };
        let rect = annotation.geometry;
        let ratio = self.viewport.pixel_ratio;
        self.viewport = self.viewport.focus(
            &rect,
            surface_width * ratio,
            surface_height * ratio,
            FOCUS_PADDING,
            FOCUS_MAX_ZOOM,
        );
    }

    fn surface_center(&self) -> (f64, f64) {
        self.surface_size
            .map_or((0.0, 0.0), |(width, height)| (width / 2.0, height / 2.0))
    }

    // =========================================================================
    // Errors
    // =========================================================================

    /// Message of the most recent failed operation, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    fn fail(&mut self, error: &dyn std::fmt::Display) {
        let message = error.to_string();
        log::warn!("{}", message);
        self.last_error = Some(message);
    }

    /// Record a snapshot of the mutated collection and refresh derived state.
    fn commit(&mut self) {
        self.history.record(self.store.annotations());
        self.refresh();
    }

    /// Rebuild derived state after the collection changed.
    fn refresh(&mut self) {
        self.index = SearchIndex::build(self.store.annotations());
        self.auto_save.schedule();
        let stale = self
            .selected_id
            .as_ref()
            .is_some_and(|id| !self.store.contains(id));
        if stale {
            log::debug!("Selection no longer exists, cleared");
            self.selected_id = None;
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
