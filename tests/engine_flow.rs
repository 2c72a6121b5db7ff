//! End-to-end engine scenarios.
//!
//! Each test walks a realistic session through the public message
//! interface and checks the collection, history, search index, and
//! viewport stay consistent with each other.

use anno::config::EngineConfig;
use anno::engine::Engine;
use anno::message::{EditMessage, PointerMessage, ViewMessage};
use anno::model::{AnnotationMeta, Rect};

fn create_message(text: &str, geometry: Rect) -> EditMessage {
    EditMessage::Create {
        text: text.to_string(),
        geometry,
        meta: AnnotationMeta::default(),
    }
}

#[test]
fn create_edit_undo_redo_flow() {
    let mut engine = Engine::new();

    // 1. Create two annotations through the message interface
    engine.apply_edit(create_message("stop sign", Rect::new(10.0, 10.0, 40.0, 30.0)));
    engine.apply_edit(create_message("red car", Rect::new(60.0, 10.0, 40.0, 30.0)));
    assert_eq!(engine.len(), 2);
    let first_id = engine.annotations()[0].id.clone();

    // 2. Rename the first annotation
    engine.apply_edit(EditMessage::UpdateText {
        id: first_id.clone(),
        text: "stop".to_string(),
    });
    assert_eq!(engine.get(&first_id).unwrap().text, "stop");

    // 3. Undo the rename, then the second create
    engine.apply_edit(EditMessage::Undo);
    assert_eq!(engine.get(&first_id).unwrap().text, "stop sign");
    engine.apply_edit(EditMessage::Undo);
    assert_eq!(engine.len(), 1);

    // 4. Redo both steps forward again
    engine.apply_edit(EditMessage::Redo);
    assert_eq!(engine.len(), 2);
    engine.apply_edit(EditMessage::Redo);
    assert_eq!(engine.get(&first_id).unwrap().text, "stop");
    assert!(!engine.can_redo());
}

#[test]
fn search_follows_collection_changes() {
    let mut engine = Engine::new();
    engine.apply_edit(create_message("stop sign", Rect::new(10.0, 10.0, 40.0, 30.0)));
    engine.apply_edit(create_message("street lamp", Rect::new(60.0, 10.0, 40.0, 30.0)));

    // Only the first annotation mentions "stop"
    let results = engine.search("stop");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text, "stop sign");

    // After renaming the second, both match
    let second_id = engine.annotations()[1].id.clone();
    engine.apply_edit(EditMessage::UpdateText {
        id: second_id,
        text: "stop light".to_string(),
    });
    assert_eq!(engine.search("stop").len(), 2);

    // Undo restores the old index contents too
    engine.apply_edit(EditMessage::Undo);
    assert_eq!(engine.search("stop").len(), 1);
}

#[test]
fn drag_to_annotation_through_transformed_viewport() {
    let mut engine = Engine::new();

    // 1. A 1600x1200 image shown on an 800x600 surface: pixel ratio 2
    engine.load_image("site-photo.png", 1600, 1200);
    engine.set_surface_size(800.0, 600.0);
    assert_eq!(engine.viewport().pixel_ratio, 2.0);

    // 2. Zoom to 2x about the origin, then pan
    engine.apply_view(ViewMessage::ZoomAt {
        scale: 2.0,
        cursor_x: 0.0,
        cursor_y: 0.0,
    });
    engine.apply_view(ViewMessage::Pan { dx: -50.0, dy: -25.0 });

    // 3. Drag in device coordinates
    engine.apply_pointer(PointerMessage::Down { x: 100.0, y: 100.0 });
    engine.apply_pointer(PointerMessage::Move { x: 150.0, y: 140.0 });
    let finished = engine.apply_pointer(PointerMessage::Up);

    // Down maps to image (150, 125), up to (200, 165)
    assert_eq!(finished, Some(Rect::new(150.0, 125.0, 50.0, 40.0)));

    // 4. Label it; the stored geometry is in image space
    let created = engine.submit_label("loading dock").unwrap().unwrap();
    assert_eq!(created.geometry, Rect::new(150.0, 125.0, 50.0, 40.0));
    assert_eq!(created.source, "site-photo.png");

    // 5. An empty label would have discarded the rectangle instead
    engine.apply_pointer(PointerMessage::Down { x: 0.0, y: 0.0 });
    engine.apply_pointer(PointerMessage::Move { x: 50.0, y: 50.0 });
    engine.apply_pointer(PointerMessage::Up);
    assert_eq!(engine.submit_label(""), Ok(None));
    assert_eq!(engine.len(), 1);
}

#[test]
fn export_then_import_preserves_the_collection() {
    let mut engine = Engine::new();
    engine.load_image("scan.png", 800, 600);
    engine
        .create("stop sign", Rect::new(10.0, 10.0, 40.0, 30.0), AnnotationMeta::default())
        .unwrap();
    let meta = AnnotationMeta {
        tags: vec!["street".to_string()],
        label: Some("sign".to_string()),
        confidence: Some(0.9),
        ..AnnotationMeta::default()
    };
    engine
        .create("red car", Rect::new(60.0, 10.0, 40.0, 30.0), meta)
        .unwrap();

    let payload = engine.export("json").unwrap();

    let mut restored = Engine::new();
    let report = restored.import_json(&payload).unwrap();
    assert_eq!(report.loaded, 2);
    assert_eq!(report.skipped, 0);

    for (before, after) in engine.annotations().iter().zip(restored.annotations()) {
        assert_eq!(before.id, after.id);
        assert_eq!(before.text, after.text);
        assert_eq!(before.tags, after.tags);
        assert_eq!(before.geometry, after.geometry);
        assert_eq!(before.source, after.source);
        assert_eq!(before.creator, after.creator);
    }

    // The same collection renders to CSV with one row per annotation
    let csv = restored.export("csv").unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "id,text,x,y,width,height,created");
}

#[test]
fn lenient_import_reports_the_damage() {
    let mut engine = Engine::new();
    let payload = r#"[
        {
            "id": "good",
            "body": [{"type": "TextualBody", "value": "door", "purpose": "commenting"}],
            "target": {"selector": {"value": {"x": 1.0, "y": 1.0, "width": 10.0, "height": 10.0}}}
        },
        {"id": "no-box", "body": [{"type": "TextualBody", "value": "window", "purpose": "commenting"}]},
        "not an object"
    ]"#;

    let report = engine.import_json(payload).unwrap();
    assert_eq!(report.loaded, 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(engine.len(), 1);
    assert_eq!(engine.annotations()[0].id, "good");
    assert_eq!(
        engine.last_error(),
        Some("2 annotations were invalid and skipped")
    );

    // The per-element report names what was wrong
    let (index, errors) = &report.rejected[0];
    assert_eq!(*index, 1);
    assert!(errors.iter().any(|e| e.contains("bounding box")));
}

#[test]
fn config_drives_session_creator_and_auto_save() {
    let mut config = EngineConfig::new();
    config.creator = "inspector".to_string();
    config.preferences.autosave_debounce_secs = 0;
    config.preferences.autosave_interval_secs = 0;

    let mut engine = Engine::with_config(&config);
    assert!(!engine.autosave_due());

    let annotation = engine
        .create("door", Rect::new(1.0, 1.0, 10.0, 10.0), AnnotationMeta::default())
        .unwrap();
    assert_eq!(annotation.creator, "inspector");

    // Zero debounce and interval: the save is due immediately after the edit
    assert!(engine.autosave_due());
    engine.mark_saved();
    assert!(!engine.autosave_due());
}
