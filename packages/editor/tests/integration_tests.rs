//! End-to-end editing scenarios: gestures in, documents and HTML out

use mailcraft_document::{to_json, BlockRegistry, Document, IdGenerator};
use mailcraft_editor::{
    move_item, Action, ActionKind, DragError, DragSource, DropResolver, DropTarget, EditorConfig,
    EditorError, EditorStore, Mutation, Pipeline, SettingsPanel, SettingsUpdate,
};
use serde_json::{json, Map, Value};
use std::cell::RefCell;
use std::rc::Rc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn editor() -> (EditorStore, DropResolver) {
    init_tracing();
    (
        EditorStore::default(),
        DropResolver::new(BlockRegistry::new(IdGenerator::from_seed("it"))),
    )
}

fn drop_on(
    store: &mut EditorStore,
    resolver: &mut DropResolver,
    source: DragSource,
    target: DropTarget,
) {
    resolver.begin(store, source).expect("begin gesture");
    resolver.hover(Some(target.clone()));
    assert!(resolver.end(store, Some(target)).expect("end gesture"));
}

fn palette(tag: &str) -> DragSource {
    DragSource::Palette(tag.to_string())
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected an object"),
    }
}

/// Count document replacements observed by a subscriber
fn count_documents(store: &mut EditorStore) -> Rc<RefCell<usize>> {
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    store.subscribe(move |_, kind| {
        if kind == ActionKind::SetDocument {
            *sink.borrow_mut() += 1;
        }
    });
    count
}

#[test]
fn test_heading_dropped_on_empty_canvas() {
    let (mut store, mut resolver) = editor();
    drop_on(&mut store, &mut resolver, palette("heading"), DropTarget::Canvas);

    let doc = store.document();
    assert_eq!(doc.row_count(), 1);
    assert_eq!(doc.rows[0].columns.len(), 1);
    assert_eq!(doc.rows[0].columns[0].width, 100);

    let block = &doc.rows[0].columns[0].blocks[0];
    assert_eq!(block.block_type, "heading");
    assert_eq!(block.text("text"), Some("Your heading"));

    let block_id = block.id.clone();
    let moved = move_item(doc, &block_id, &block_id);
    assert_eq!(&moved, doc);
}

#[test]
fn test_two_column_layout_on_empty_canvas() {
    let (mut store, mut resolver) = editor();
    drop_on(&mut store, &mut resolver, palette("2-column"), DropTarget::Canvas);

    let doc = store.document();
    assert_eq!(doc.row_count(), 1);
    let widths: Vec<u8> = doc.rows[0].columns.iter().map(|c| c.width).collect();
    assert_eq!(widths, vec![50, 50]);
    assert!(doc.rows[0].columns.iter().all(|c| c.blocks.is_empty()));
}

#[test]
fn test_move_second_row_onto_first() {
    let (mut store, mut resolver) = editor();
    drop_on(&mut store, &mut resolver, palette("1-column"), DropTarget::Canvas);
    drop_on(&mut store, &mut resolver, palette("2-column"), DropTarget::Canvas);

    let r1 = store.document().rows[0].id.clone();
    let r2 = store.document().rows[1].id.clone();

    drop_on(
        &mut store,
        &mut resolver,
        DragSource::Existing(r2.clone()),
        DropTarget::Node(r1.clone()),
    );

    let order: Vec<&str> = store.document().rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(order, vec![r2.as_str(), r1.as_str()]);
}

#[test]
fn test_block_moves_into_empty_column() {
    let (mut store, mut resolver) = editor();
    drop_on(&mut store, &mut resolver, palette("2-column"), DropTarget::Canvas);

    let column_a = store.document().rows[0].columns[0].id.clone();
    let column_b = store.document().rows[0].columns[1].id.clone();

    drop_on(&mut store, &mut resolver, palette("heading"), DropTarget::Node(column_a.clone()));
    drop_on(&mut store, &mut resolver, palette("button"), DropTarget::Node(column_a.clone()));

    let x = store.document().rows[0].columns[0].blocks[0].id.clone();
    let y = store.document().rows[0].columns[0].blocks[1].id.clone();

    drop_on(
        &mut store,
        &mut resolver,
        DragSource::Existing(x.clone()),
        DropTarget::Node(column_b.clone()),
    );

    let doc = store.document();
    let a: Vec<&str> = doc.rows[0].columns[0].blocks.iter().map(|b| b.id.as_str()).collect();
    let b: Vec<&str> = doc.rows[0].columns[1].blocks.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(a, vec![y.as_str()]);
    assert_eq!(b, vec![x.as_str()]);
}

#[test]
fn test_block_dropped_on_block_goes_before_it() {
    let (mut store, mut resolver) = editor();
    drop_on(&mut store, &mut resolver, palette("paragraph"), DropTarget::Canvas);
    let paragraph = store.document().rows[0].columns[0].blocks[0].id.clone();

    drop_on(&mut store, &mut resolver, palette("image"), DropTarget::Node(paragraph.clone()));

    let blocks = &store.document().rows[0].columns[0].blocks;
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].block_type, "image");
    assert_eq!(blocks[1].id, paragraph);
    assert_eq!(store.document().row_count(), 1);
}

#[test]
fn test_deleting_only_block_keeps_column_droppable() {
    let mut pipeline = Pipeline::from_config(&EditorConfig {
        id_seed: Some("del".to_string()),
        ..Default::default()
    });

    pipeline.begin_drag(palette("spacer")).unwrap();
    pipeline.end_drag(Some(DropTarget::Canvas)).unwrap();

    let column = pipeline.store().document().rows[0].columns[0].id.clone();
    let spacer = pipeline.store().document().rows[0].columns[0].blocks[0].id.clone();

    pipeline
        .apply_mutation(Mutation::DeleteNode { node_id: spacer })
        .unwrap();

    let doc = pipeline.store().document();
    assert_eq!(doc.row_count(), 1);
    assert!(doc.rows[0].columns[0].blocks.is_empty());

    pipeline.begin_drag(palette("divider")).unwrap();
    pipeline.end_drag(Some(DropTarget::Node(column))).unwrap();

    let doc = pipeline.store().document();
    assert_eq!(doc.row_count(), 1);
    assert_eq!(doc.rows[0].columns[0].blocks[0].block_type, "divider");
}

#[test]
fn test_exactly_one_document_per_gesture() {
    let (mut store, mut resolver) = editor();
    let documents = count_documents(&mut store);

    resolver.begin(&mut store, palette("heading")).unwrap();
    for _ in 0..5 {
        resolver.hover(Some(DropTarget::Canvas));
        resolver.hover(None);
    }
    assert_eq!(*documents.borrow(), 0);

    resolver.end(&mut store, Some(DropTarget::Canvas)).unwrap();
    assert_eq!(*documents.borrow(), 1);
    assert!(store.dragged_id().is_none());
}

#[test]
fn test_cancelled_gesture_leaves_document_alone() {
    let (mut store, mut resolver) = editor();
    drop_on(&mut store, &mut resolver, palette("3-column"), DropTarget::Canvas);
    let before = store.document().clone();
    let documents = count_documents(&mut store);

    let row = before.rows[0].id.clone();
    resolver.begin(&mut store, DragSource::Existing(row)).unwrap();
    assert!(!resolver.end(&mut store, None).unwrap());

    assert_eq!(store.document(), &before);
    assert_eq!(*documents.borrow(), 0);
    assert!(store.dragged_id().is_none());
}

#[test]
fn test_concurrent_gesture_rejected() {
    let mut pipeline = Pipeline::from_config(&EditorConfig::default());

    pipeline.begin_drag(palette("button")).unwrap();
    let err = pipeline.begin_drag(palette("image")).unwrap_err();
    assert!(matches!(err, EditorError::Drag(DragError::GestureInProgress)));

    pipeline.end_drag(Some(DropTarget::Canvas)).unwrap();
    let doc = pipeline.store().document();
    assert_eq!(doc.rows[0].columns[0].blocks[0].block_type, "button");
}

#[test]
fn test_settings_follow_selection() {
    let (mut store, mut resolver) = editor();
    drop_on(&mut store, &mut resolver, palette("button"), DropTarget::Canvas);
    let button = store.document().rows[0].columns[0].blocks[0].id.clone();

    store.dispatch(Action::SelectElement(Some(button.clone())));
    assert_eq!(
        SettingsPanel::for_selection(store.document(), store.selected_id()),
        SettingsPanel::Block {
            id: button.clone(),
            block_type: "button".to_string()
        }
    );

    store
        .update_selected(SettingsUpdate::Content(object(json!({ "text": "Buy now" }))))
        .unwrap();
    let block = store.document().block(&button).unwrap();
    assert_eq!(block.text("text"), Some("Buy now"));
    assert_eq!(block.text("url"), Some("#"));

    let row = store.document().rows[0].id.clone();
    let without_row = mailcraft_editor::delete_node(store.document(), &row);
    store.dispatch(Action::SetDocument(without_row));
    assert_eq!(
        SettingsPanel::for_selection(store.document(), store.selected_id()),
        SettingsPanel::Global
    );

    store
        .update_selected(SettingsUpdate::Global(object(json!({ "maxWidth": 720 }))))
        .unwrap();
    assert_eq!(store.document().settings.max_width, 720);
}

#[test]
fn test_preview_tracks_edits() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(mailcraft_editor::DEFAULT_CONFIG_NAME),
        r##"{ "idSeed": "pv", "brand": { "primary": "#123456" }, "render": { "title": "Launch" } }"##,
    )
    .unwrap();

    let config = EditorConfig::load(dir.path()).unwrap();
    let mut pipeline = Pipeline::from_config(&config);
    assert!(pipeline.html().contains("<title>Launch</title>"));

    pipeline.begin_drag(palette("button")).unwrap();
    pipeline.end_drag(Some(DropTarget::Canvas)).unwrap();

    let html = pipeline.html().to_string();
    assert!(html.contains("background-color: #123456;"));
    assert_eq!(pipeline.cached_version(), Some(pipeline.store().version()));
}

#[test]
fn test_document_survives_serialization() {
    let (mut store, mut resolver) = editor();
    drop_on(&mut store, &mut resolver, palette("2-column"), DropTarget::Canvas);
    let column = store.document().rows[0].columns[1].id.clone();
    drop_on(&mut store, &mut resolver, palette("social"), DropTarget::Node(column));

    let json = to_json(store.document()).unwrap();
    let restored: Document = mailcraft_document::from_json(&json).unwrap();
    assert_eq!(&restored, store.document());
}
