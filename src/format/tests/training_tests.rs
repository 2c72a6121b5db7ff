//! Tests for the training-data export format.

use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::format::TrainingFormat;
use crate::format::traits::ExportFormat;
use crate::model::{Annotation, Rect};

fn create_annotation(id: &str, text: &str) -> Annotation {
    let created = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
    Annotation {
        id: id.to_string(),
        text: text.to_string(),
        tags: Vec::new(),
        geometry: Rect::new(10.0, 20.0, 30.0, 40.0),
        source: String::new(),
        created,
        modified: created,
        creator: "alice".to_string(),
        label: None,
        confidence: None,
    }
}

fn export_to_value(annotations: &[Annotation]) -> Value {
    let payload = TrainingFormat.export(annotations).unwrap();
    serde_json::from_str(&payload).unwrap()
}

#[test]
fn test_defaults_fill_missing_label_and_confidence() {
    let value = export_to_value(&[create_annotation("a", "one")]);

    assert_eq!(value[0]["label"], "text");
    assert_eq!(value[0]["confidence"], 1.0);
}

#[test]
fn test_explicit_label_and_confidence_survive() {
    let mut annotation = create_annotation("a", "one");
    annotation.label = Some("sign".to_string());
    annotation.confidence = Some(0.42);
    let value = export_to_value(&[annotation]);

    assert_eq!(value[0]["label"], "sign");
    assert_eq!(value[0]["confidence"], 0.42);
}

#[test]
fn test_record_shape() {
    let value = export_to_value(&[create_annotation("note-1", "stop sign")]);
    let record = &value[0];

    assert_eq!(record["id"], "note-1");
    assert_eq!(record["text"], "stop sign");
    assert_eq!(record["bbox"]["x"], 10.0);
    assert_eq!(record["bbox"]["y"], 20.0);
    assert_eq!(record["bbox"]["width"], 30.0);
    assert_eq!(record["bbox"]["height"], 40.0);
    assert_eq!(record["created"], "2026-03-14T09:26:53.000Z");
    assert_eq!(record["modified"], "2026-03-14T09:26:53.000Z");
}

#[test]
fn test_empty_collection_is_empty_array() {
    let value = export_to_value(&[]);
    assert_eq!(value.as_array().unwrap().len(), 0);
}
