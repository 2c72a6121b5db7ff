//! Ordered annotation collection with immutable-update mutations.
//!
//! The store keeps annotations in insertion order and validates every
//! candidate before committing it. Failed mutations leave the collection
//! untouched. The store itself is history-agnostic; the engine records a
//! snapshot after each successful mutation.

use std::collections::HashSet;

use thiserror::Error;

use crate::model::{Annotation, AnnotationMeta, RawAnnotation, Rect, validate};

/// Errors from collection mutations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// One or more validation failures; every collected message is kept.
    #[error("invalid annotation: {}", errors.join("; "))]
    Validation { errors: Vec<String> },

    /// The referenced annotation does not exist.
    #[error("annotation not found: {id}")]
    NotFound { id: String },
}

impl StoreError {
    pub fn validation(errors: Vec<String>) -> Self {
        StoreError::Validation { errors }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        StoreError::NotFound { id: id.into() }
    }
}

/// Outcome of a bulk load. Partial acceptance by design: valid elements are
/// installed, invalid ones are dropped and counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceReport {
    /// Annotations installed into the collection.
    pub loaded: usize,
    /// Elements dropped as invalid or duplicate.
    pub skipped: usize,
    /// Payload index of each rejected element with its validation errors.
    pub rejected: Vec<(usize, Vec<String>)>,
}

impl ReplaceReport {
    /// Human-readable summary of the skipped elements.
    pub fn summary(&self) -> String {
        format!("{} annotations were invalid and skipped", self.skipped)
    }
}

/// The canonical in-memory annotation collection.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All annotations in insertion order.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.annotations.iter().position(|a| a.id == id)
    }

    /// Create and append a new annotation.
    ///
    /// The id is freshly generated; the candidate is validated before it is
    /// committed, so an invalid geometry never enters the collection.
    pub fn create(
        &mut self,
        text: &str,
        geometry: Rect,
        meta: AnnotationMeta,
    ) -> Result<Annotation, StoreError> {
        let annotation = Annotation::new(text, geometry, meta);
        self.check(&annotation)?;
        self.annotations.push(annotation.clone());
        log::debug!("Created annotation {}", annotation.id);
        Ok(annotation)
    }

    /// Replace the comment text of an existing annotation.
    pub fn update_text(&mut self, id: &str, text: &str) -> Result<Annotation, StoreError> {
        let index = self.position(id).ok_or_else(|| StoreError::not_found(id))?;
        let updated = self.annotations[index].with_text(text);
        self.check(&updated)?;
        self.annotations[index] = updated.clone();
        log::debug!("Updated text of {}", id);
        Ok(updated)
    }

    /// Replace the geometry of an existing annotation.
    pub fn update_geometry(&mut self, id: &str, geometry: Rect) -> Result<Annotation, StoreError> {
        let index = self.position(id).ok_or_else(|| StoreError::not_found(id))?;
        let updated = self.annotations[index].with_geometry(geometry);
        self.check(&updated)?;
        self.annotations[index] = updated.clone();
        log::debug!("Updated geometry of {}", id);
        Ok(updated)
    }

    /// Replace the tags of an existing annotation.
    pub fn update_tags(&mut self, id: &str, tags: Vec<String>) -> Result<Annotation, StoreError> {
        let index = self.position(id).ok_or_else(|| StoreError::not_found(id))?;
        let updated = self.annotations[index].with_tags(tags);
        self.check(&updated)?;
        self.annotations[index] = updated.clone();
        log::debug!("Updated tags of {}", id);
        Ok(updated)
    }

    /// Remove an annotation by id. Absent ids are ignored.
    ///
    /// Returns true when something was removed, so calling twice with the
    /// same id removes once and then does nothing.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.id != id);
        let removed = self.annotations.len() < before;
        if removed {
            log::debug!("Deleted annotation {}", id);
        }
        removed
    }

    /// Remove several annotations at once. Absent ids are ignored.
    pub fn delete_many(&mut self, ids: &[String]) -> usize {
        let targets: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let before = self.annotations.len();
        self.annotations.retain(|a| !targets.contains(a.id.as_str()));
        let removed = before - self.annotations.len();
        if removed > 0 {
            log::debug!("Deleted {} annotations", removed);
        }
        removed
    }

    /// Replace the whole collection with the valid candidates.
    ///
    /// Every candidate is validated independently; invalid elements and
    /// elements reusing an already-seen id are dropped and reported, the
    /// rest are installed in payload order.
    pub fn replace_all(&mut self, candidates: &[RawAnnotation]) -> ReplaceReport {
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        let mut seen_ids = HashSet::new();

        for (index, raw) in candidates.iter().enumerate() {
            let report = validate(raw);
            if !report.valid {
                rejected.push((index, report.errors));
                continue;
            }
            let Some(annotation) = raw.to_annotation() else {
                rejected.push((index, vec!["Annotation entry is malformed".to_string()]));
                continue;
            };
            if !seen_ids.insert(annotation.id.clone()) {
                rejected.push((
                    index,
                    vec![format!("Duplicate annotation ID: {}", annotation.id)],
                ));
                continue;
            }
            accepted.push(annotation);
        }

        let report = ReplaceReport {
            loaded: accepted.len(),
            skipped: rejected.len(),
            rejected,
        };
        self.annotations = accepted;
        if report.skipped > 0 {
            log::warn!(
                "Loaded {} annotations, {} invalid elements skipped",
                report.loaded,
                report.skipped
            );
        } else {
            log::info!("Loaded {} annotations", report.loaded);
        }
        report
    }

    /// Install a history snapshot as the current collection.
    pub fn restore(&mut self, snapshot: Vec<Annotation>) {
        self.annotations = snapshot;
    }

    /// Copy of the collection sorted by creation time.
    pub fn sorted_by_created(&self, ascending: bool) -> Vec<Annotation> {
        let mut sorted = self.annotations.clone();
        sorted.sort_by(|a, b| {
            if ascending {
                a.created.cmp(&b.created)
            } else {
                b.created.cmp(&a.created)
            }
        });
        sorted
    }

    fn check(&self, annotation: &Annotation) -> Result<(), StoreError> {
        let report = validate(&RawAnnotation::from(annotation));
        if report.valid {
            Ok(())
        } else {
            Err(StoreError::validation(report.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Rect {
        Rect::new(10.0, 10.0, 40.0, 30.0)
    }

    fn create_store_with(texts: &[&str]) -> AnnotationStore {
        let mut store = AnnotationStore::new();
        for text in texts {
            store
                .create(text, rect(), AnnotationMeta::default())
                .expect("annotation should be valid");
        }
        store
    }

    #[test]
    fn test_create_appends_in_order() {
        let store = create_store_with(&["first", "second", "third"]);
        let texts: Vec<&str> = store.annotations().iter().map(|a| a.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_create_rejects_zero_width_and_leaves_collection_unchanged() {
        let mut store = create_store_with(&["kept"]);
        let result = store.create("bad", Rect::new(0.0, 0.0, 0.0, 10.0), AnnotationMeta::default());
        match result {
            Err(StoreError::Validation { errors }) => {
                assert!(errors.iter().any(|e| e.contains("width and height")));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(store.len(), 1);
        assert_eq!(store.annotations()[0].text, "kept");
    }

    #[test]
    fn test_update_text_keeps_position_and_refreshes_modified() {
        let mut store = create_store_with(&["one", "two", "three"]);
        let id = store.annotations()[1].id.clone();
        let before = store.annotations()[1].modified;
        let updated = store.update_text(&id, "TWO").expect("update should work");
        assert_eq!(updated.text, "TWO");
        assert!(updated.modified >= before);
        assert_eq!(store.annotations()[1].id, id);
        assert_eq!(store.annotations()[1].text, "TWO");
    }

    #[test]
    fn test_update_unknown_id_fails_not_found() {
        let mut store = create_store_with(&["only"]);
        let result = store.update_text("annotation_0_missing", "text");
        assert_eq!(
            result,
            Err(StoreError::not_found("annotation_0_missing"))
        );
    }

    #[test]
    fn test_update_geometry_validates_candidate() {
        let mut store = create_store_with(&["one"]);
        let id = store.annotations()[0].id.clone();
        let result = store.update_geometry(&id, Rect::new(0.0, 0.0, -5.0, 5.0));
        assert!(result.is_err());
        assert_eq!(store.annotations()[0].geometry, rect());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut store = create_store_with(&["one", "two"]);
        let id = store.annotations()[0].id.clone();
        assert!(store.delete(&id));
        let after_first: Vec<String> =
            store.annotations().iter().map(|a| a.id.clone()).collect();
        assert!(!store.delete(&id));
        let after_second: Vec<String> =
            store.annotations().iter().map(|a| a.id.clone()).collect();
        assert_eq!(after_first, after_second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_many_ignores_absent_ids() {
        let mut store = create_store_with(&["one", "two", "three"]);
        let ids = vec![
            store.annotations()[0].id.clone(),
            "annotation_0_missing".to_string(),
            store.annotations()[2].id.clone(),
        ];
        let removed = store.delete_many(&ids);
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.annotations()[0].text, "two");
    }

    #[test]
    fn test_replace_all_keeps_valid_drops_invalid() {
        let mut store = create_store_with(&["replaced away"]);
        let mut candidates: Vec<RawAnnotation> = Vec::new();
        for (id, text) in [("a", "one"), ("b", "two"), ("c", "three")] {
            let annotation = Annotation::new(text, rect(), AnnotationMeta::default());
            let mut raw = RawAnnotation::from(&annotation);
            raw.id = Some(id.to_string());
            candidates.push(raw);
        }
        // Invalid: no body at all.
        let mut broken = candidates[0].clone();
        broken.id = Some("d".to_string());
        broken.body = None;
        candidates.push(broken);
        // Invalid: empty id.
        let mut anonymous = candidates[1].clone();
        anonymous.id = None;
        candidates.push(anonymous);

        let report = store.replace_all(&candidates);
        assert_eq!(report.loaded, 3);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.summary(), "2 annotations were invalid and skipped");
        assert_eq!(store.len(), 3);
        let ids: Vec<&str> = store.annotations().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_replace_all_drops_duplicate_ids() {
        let mut store = AnnotationStore::new();
        let annotation = Annotation::new("text", rect(), AnnotationMeta::default());
        let mut first = RawAnnotation::from(&annotation);
        first.id = Some("same".to_string());
        let second = first.clone();
        let report = store.replace_all(&[first, second]);
        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped, 1);
        assert!(report.rejected[0].1[0].contains("Duplicate"));
    }

    #[test]
    fn test_validation_error_display_joins_messages() {
        let error = StoreError::validation(vec![
            "Annotation must have an ID".to_string(),
            "Annotation must have text content".to_string(),
        ]);
        let message = error.to_string();
        assert!(message.contains("ID"));
        assert!(message.contains("text content"));
    }

    #[test]
    fn test_sorted_by_created() {
        use chrono::TimeZone;
        let mut store = create_store_with(&["newer", "older"]);
        let newer_id = store.annotations()[0].id.clone();
        let older_id = store.annotations()[1].id.clone();
        let base = chrono::Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        store.annotations[0].created = base + chrono::Duration::hours(1);
        store.annotations[1].created = base;
        let ascending = store.sorted_by_created(true);
        let descending = store.sorted_by_created(false);
        assert_eq!(ascending[0].id, older_id);
        assert_eq!(descending[0].id, newer_id);
        // Original order untouched.
        assert_eq!(store.annotations()[0].id, newer_id);
    }
}
