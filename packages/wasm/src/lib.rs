use mailcraft_compiler_html::{render_with_options, CompileOptions};
use mailcraft_document::{from_json, to_json, BlockRegistry, BrandColors, Document, IdGenerator};
use mailcraft_editor::{
    delete_node, move_item, Action, DragSource, DropTarget, EditorConfig, Mutation, Pipeline,
    SettingsPanel, SettingsUpdate,
};
use serde_json::Value;
use std::fmt::Display;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(context: &str, error: impl Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, error))
}

fn registry(brand_json: Option<String>) -> Result<BlockRegistry, String> {
    let brand = match brand_json {
        Some(json) => serde_json::from_str::<BrandColors>(&json).map_err(|e| e.to_string())?,
        None => BrandColors::default(),
    };
    Ok(BlockRegistry::new(IdGenerator::random()).with_brand(brand))
}

fn parse_document(document_json: &str) -> Result<Document, JsValue> {
    from_json(document_json).map_err(|e| js_error("Parse error", e))
}

fn create_block_json(block_type: &str, brand_json: Option<String>) -> Result<String, String> {
    let block = registry(brand_json)?
        .create_block(block_type)
        .map_err(|e| e.to_string())?;
    serde_json::to_string(&block).map_err(|e| e.to_string())
}

fn create_row_json(columns: usize) -> Result<String, String> {
    let row = registry(None)?.create_row(columns).map_err(|e| e.to_string())?;
    serde_json::to_string(&row).map_err(|e| e.to_string())
}

/// Create a block of `blockType` with default content, as JSON
#[wasm_bindgen(js_name = createBlock)]
pub fn create_block_js(block_type: &str, brand_json: Option<String>) -> Result<String, JsValue> {
    create_block_json(block_type, brand_json).map_err(|e| js_error("Create error", e))
}

/// Create a row of equal-width empty columns, as JSON
#[wasm_bindgen(js_name = createRow)]
pub fn create_row_js(columns: usize) -> Result<String, JsValue> {
    create_row_json(columns).map_err(|e| js_error("Create error", e))
}

/// Move a row or block and return the new document JSON
#[wasm_bindgen(js_name = moveItem)]
pub fn move_item_js(document_json: &str, source_id: &str, target_id: &str) -> Result<String, JsValue> {
    let doc = parse_document(document_json)?;
    to_json(&move_item(&doc, source_id, target_id)).map_err(|e| js_error("Serialization error", e))
}

/// Delete a row or block and return the new document JSON
#[wasm_bindgen(js_name = deleteNode)]
pub fn delete_node_js(document_json: &str, node_id: &str) -> Result<String, JsValue> {
    let doc = parse_document(document_json)?;
    to_json(&delete_node(&doc, node_id)).map_err(|e| js_error("Serialization error", e))
}

/// Render document JSON to email HTML
#[wasm_bindgen(js_name = render)]
pub fn render_js(document_json: &str, pretty: bool) -> Result<String, JsValue> {
    let doc = parse_document(document_json)?;
    let options = CompileOptions {
        pretty,
        ..Default::default()
    };
    Ok(render_with_options(&doc, &options))
}

/// Stateful editor session for the builder UI
#[wasm_bindgen(js_name = Editor)]
pub struct WasmEditor {
    pipeline: Pipeline,
}

#[wasm_bindgen(js_class = Editor)]
impl WasmEditor {
    /// Start an empty document, optionally from `mailcraft.config.json` content
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WasmEditor, JsValue> {
        let config = match config_json {
            Some(json) => EditorConfig::from_json(&json).map_err(|e| js_error("Config error", e))?,
            None => EditorConfig::default(),
        };
        Ok(Self::from_config(&config))
    }

    /// Replace the document being edited
    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&mut self, document_json: &str) -> Result<(), JsValue> {
        let doc = parse_document(document_json)?;
        self.pipeline.dispatch(Action::SetDocument(doc));
        Ok(())
    }

    #[wasm_bindgen(js_name = documentJson)]
    pub fn document_json(&self) -> Result<String, JsValue> {
        to_json(self.pipeline.store().document()).map_err(|e| js_error("Serialization error", e))
    }

    pub fn version(&self) -> u64 {
        self.pipeline.store().version()
    }

    pub fn select(&mut self, node_id: Option<String>) {
        self.pipeline.dispatch(Action::SelectElement(node_id));
    }

    /// Panel for the current selection: "global", "row", "column" or the
    /// block type
    #[wasm_bindgen(js_name = selectedPanel)]
    pub fn selected_panel(&self) -> String {
        let store = self.pipeline.store();
        match SettingsPanel::for_selection(store.document(), store.selected_id()) {
            SettingsPanel::Global => "global".to_string(),
            SettingsPanel::Row { .. } => "row".to_string(),
            SettingsPanel::Column { .. } => "column".to_string(),
            SettingsPanel::Block { block_type, .. } => block_type,
        }
    }

    /// Merge `partialJson` into the selection. `kind` is one of "content",
    /// "styles", "width" or "global".
    #[wasm_bindgen(js_name = updateSelected)]
    pub fn update_selected(&mut self, kind: &str, partial_json: &str) -> Result<(), JsValue> {
        let update = settings_update(kind, partial_json).map_err(|e| js_error("Settings error", e))?;
        self.pipeline
            .store_mut()
            .update_selected(update)
            .map_err(|e| js_error("Settings error", e))
    }

    /// Start dragging a palette entry
    #[wasm_bindgen(js_name = beginPaletteDrag)]
    pub fn begin_palette_drag(&mut self, tag: &str) -> Result<(), JsValue> {
        self.pipeline
            .begin_drag(DragSource::Palette(tag.to_string()))
            .map_err(|e| js_error("Drag error", e))
    }

    /// Start dragging an existing row or block
    #[wasm_bindgen(js_name = beginMoveDrag)]
    pub fn begin_move_drag(&mut self, node_id: &str) -> Result<(), JsValue> {
        self.pipeline
            .begin_drag(DragSource::Existing(node_id.to_string()))
            .map_err(|e| js_error("Drag error", e))
    }

    /// Highlight the node under the pointer; `None` means the canvas
    pub fn hover(&mut self, target_id: Option<String>) {
        self.pipeline.hover(Some(drop_target(target_id)));
    }

    /// Drop over `targetId`, or the canvas when absent. Returns whether the
    /// document changed hands.
    #[wasm_bindgen(js_name = endDrag)]
    pub fn end_drag(&mut self, target_id: Option<String>) -> Result<bool, JsValue> {
        self.pipeline
            .end_drag(Some(drop_target(target_id)))
            .map_err(|e| js_error("Drag error", e))
    }

    #[wasm_bindgen(js_name = cancelDrag)]
    pub fn cancel_drag(&mut self) {
        self.pipeline.cancel_drag();
    }

    /// Apply a JSON mutation such as `{"kind":"duplicateNode","nodeId":"..."}`
    #[wasm_bindgen(js_name = applyMutation)]
    pub fn apply_mutation(&mut self, mutation_json: &str) -> Result<u64, JsValue> {
        let mutation: Mutation =
            serde_json::from_str(mutation_json).map_err(|e| js_error("Parse error", e))?;
        self.pipeline
            .apply_mutation(mutation)
            .map_err(|e| js_error("Mutation error", e))
    }

    /// Rendered preview, cached until the document changes
    pub fn html(&mut self) -> String {
        self.pipeline.html().to_string()
    }
}

impl WasmEditor {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            pipeline: Pipeline::from_config(config),
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

fn drop_target(target_id: Option<String>) -> DropTarget {
    match target_id {
        Some(id) => DropTarget::Node(id),
        None => DropTarget::Canvas,
    }
}

fn settings_update(kind: &str, partial_json: &str) -> Result<SettingsUpdate, String> {
    let value: Value = serde_json::from_str(partial_json).map_err(|e| e.to_string())?;

    if kind == "width" {
        return value
            .as_u64()
            .and_then(|width| u8::try_from(width).ok())
            .map(SettingsUpdate::Width)
            .ok_or_else(|| format!("Invalid width: {}", value));
    }

    let Value::Object(partial) = value else {
        return Err(format!("Expected an object for {} settings", kind));
    };

    match kind {
        "content" => Ok(SettingsUpdate::Content(partial)),
        "styles" => Ok(SettingsUpdate::Styles(partial)),
        "global" => Ok(SettingsUpdate::Global(partial)),
        other => Err(format!("Unknown settings kind: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_editor() -> WasmEditor {
        WasmEditor::from_config(&EditorConfig {
            id_seed: Some("wasm".to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_create_block() {
        let json = create_block_json("heading", None).unwrap();
        let block: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(block["type"], "heading");
        assert_eq!(block["content"]["text"], "Your heading");
        assert!(create_block_json("carousel", None).is_err());
    }

    #[test]
    fn test_create_block_with_brand() {
        let json = create_block_json("button", Some(r##"{ "primary": "#00ff00" }"##.to_string())).unwrap();
        assert!(json.contains("#00ff00"));
    }

    #[test]
    fn test_create_row() {
        let row: Value = serde_json::from_str(&create_row_json(4).unwrap()).unwrap();
        let widths: Vec<u64> = row["columns"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["width"].as_u64().unwrap())
            .collect();
        assert_eq!(widths, vec![25, 25, 25, 25]);
        assert!(create_row_json(5).is_err());
    }

    #[test]
    fn test_move_and_delete_over_json() {
        let source = r#"{ "rows": [
            { "id": "r1", "columns": [] },
            { "id": "r2", "columns": [] }
        ] }"#;

        let moved = move_item_js(source, "r2", "r1").unwrap();
        let doc = from_json(&moved).unwrap();
        assert_eq!(doc.rows[0].id, "r2");

        let deleted = delete_node_js(&moved, "r1").unwrap();
        assert_eq!(from_json(&deleted).unwrap().row_count(), 1);

        let html = render_js(&deleted, false).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_fractional_widths_and_null_content_load() {
        let source = r#"{ "rows": [{ "id": "r1", "columns": [
            { "id": "c1", "width": 33.33, "blocks": [{ "id": "b1", "type": "button", "content": null }] }
        ] }] }"#;

        let moved = move_item_js(source, "b1", "c1").unwrap();
        let doc = from_json(&moved).unwrap();
        assert_eq!(doc.rows[0].columns[0].width, 33);
        assert!(render_js(source, true).unwrap().contains(">Button</a>"));
    }

    #[test]
    fn test_editor_session() {
        let mut editor = seeded_editor();
        assert_eq!(editor.selected_panel(), "global");

        editor.begin_palette_drag("2-column").unwrap();
        editor.hover(None);
        assert!(editor.end_drag(None).unwrap());

        let column = editor.pipeline().store().document().rows[0].columns[1].id.clone();
        editor.begin_palette_drag("button").unwrap();
        editor.end_drag(Some(column.clone())).unwrap();

        let button = editor.pipeline().store().document().rows[0].columns[1].blocks[0].id.clone();
        editor.select(Some(button));
        assert_eq!(editor.selected_panel(), "button");

        editor.update_selected("content", r#"{ "text": "Order now" }"#).unwrap();
        assert!(editor.html().contains(">Order now</a>"));

        editor.select(Some(column));
        editor.update_selected("width", "60").unwrap();
        assert_eq!(editor.pipeline().store().document().rows[0].columns[1].width, 60);
        assert_eq!(editor.version(), 4);
    }

    #[test]
    fn test_editor_mutation_json() {
        let mut editor = seeded_editor();
        editor.begin_palette_drag("1-column").unwrap();
        editor.end_drag(None).unwrap();

        let row = editor.pipeline().store().document().rows[0].id.clone();
        let mutation = format!(r#"{{ "kind": "duplicateNode", "nodeId": "{}" }}"#, row);
        assert_eq!(editor.apply_mutation(&mutation).unwrap(), 2);
        assert_eq!(editor.pipeline().store().document().row_count(), 2);
    }

    #[test]
    fn test_settings_update_parsing() {
        assert_eq!(settings_update("width", "50").unwrap(), SettingsUpdate::Width(50));
        assert!(settings_update("width", "500").is_err());
        assert!(settings_update("styles", "[]").is_err());
        assert!(settings_update("layout", "{}").is_err());
        assert!(matches!(
            settings_update("global", r#"{ "maxWidth": 640 }"#),
            Ok(SettingsUpdate::Global(_))
        ));
    }
}
