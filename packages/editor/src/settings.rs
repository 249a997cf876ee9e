//! # Settings Panels
//!
//! The selected ID decides which settings panel is shown. Classification
//! scans rows, then columns, then blocks; an ID that no longer exists
//! (the node was deleted or moved out by another edit) falls back to the
//! global document settings instead of failing.
//!
//! An update copies the document, finds the same node in the copy and
//! shallow-merges the partial into its `content` or `styles`. Keys mapped
//! to `null` are removed.

use mailcraft_document::{
    style_value, Content, Document, DocumentSettings, NodePath, Styles, MAX_COLUMN_WIDTH,
    MIN_COLUMN_WIDTH,
};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, instrument};

/// Which editor the UI shows for the current selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsPanel {
    Global,
    Row { id: String },
    Column { id: String },
    Block { id: String, block_type: String },
}

/// Partial edit proposed by a settings panel
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsUpdate {
    /// Merge into a block's content
    Content(Map<String, Value>),
    /// Merge into a row, column or block's styles
    Styles(Map<String, Value>),
    /// Set a column's width percentage
    Width(u8),
    /// Merge into the document settings
    Global(Map<String, Value>),
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("{update} settings do not apply to the {panel} panel")]
    NotApplicable {
        update: &'static str,
        panel: &'static str,
    },

    #[error("Column width {0} is outside 10-100")]
    WidthOutOfRange(u8),

    #[error("Style {0} must be a string, number or boolean")]
    InvalidStyleValue(String),

    #[error("Invalid document settings: {0}")]
    InvalidSettings(#[from] serde_json::Error),
}

impl SettingsPanel {
    pub fn for_selection(doc: &Document, selected_id: Option<&str>) -> Self {
        let Some(id) = selected_id else {
            return SettingsPanel::Global;
        };

        match doc.locate(id) {
            Some(NodePath::Row { .. }) => SettingsPanel::Row { id: id.to_string() },
            Some(NodePath::Column { .. }) => SettingsPanel::Column { id: id.to_string() },
            Some(NodePath::Block { row, column, block }) => SettingsPanel::Block {
                id: id.to_string(),
                block_type: doc.rows[row].columns[column].blocks[block].block_type.clone(),
            },
            None => {
                debug!(selected_id = id, "Selection no longer exists; showing global settings");
                SettingsPanel::Global
            }
        }
    }

    pub fn node_id(&self) -> Option<&str> {
        match self {
            SettingsPanel::Global => None,
            SettingsPanel::Row { id } | SettingsPanel::Column { id } | SettingsPanel::Block { id, .. } => {
                Some(id)
            }
        }
    }

    fn name(&self) -> &'static str {
        match self {
            SettingsPanel::Global => "global",
            SettingsPanel::Row { .. } => "row",
            SettingsPanel::Column { .. } => "column",
            SettingsPanel::Block { .. } => "block",
        }
    }
}

impl SettingsUpdate {
    fn name(&self) -> &'static str {
        match self {
            SettingsUpdate::Content(_) => "content",
            SettingsUpdate::Styles(_) => "style",
            SettingsUpdate::Width(_) => "width",
            SettingsUpdate::Global(_) => "global",
        }
    }
}

/// Compute the document that results from applying `update` to the panel
/// selected by `selected_id`. The input document is never modified.
#[instrument(skip(doc, update), fields(update = update.name()))]
pub fn apply_settings(
    doc: &Document,
    selected_id: Option<&str>,
    update: SettingsUpdate,
) -> Result<Document, SettingsError> {
    let panel = SettingsPanel::for_selection(doc, selected_id);
    let path = panel.node_id().and_then(|id| doc.locate(id));
    let mut next = doc.clone();

    match (path, update) {
        (None, SettingsUpdate::Global(partial)) => {
            next.settings = merge_settings(&doc.settings, partial)?;
        }
        (Some(NodePath::Block { row, column, block }), SettingsUpdate::Content(partial)) => {
            if let Some(block) = next.block_mut(row, column, block) {
                merge_content(&mut block.content, partial);
            }
        }
        (Some(path), SettingsUpdate::Styles(partial)) => {
            let partial = validate_styles(partial)?;
            let styles = match path {
                NodePath::Row { row } => next.row_mut(row).map(|r| &mut r.styles),
                NodePath::Column { row, column } => next.column_mut(row, column).map(|c| &mut c.styles),
                NodePath::Block { row, column, block } => {
                    next.block_mut(row, column, block).map(|b| &mut b.styles)
                }
            };
            if let Some(styles) = styles {
                merge_styles(styles, partial);
            }
        }
        (Some(NodePath::Column { row, column }), SettingsUpdate::Width(width)) => {
            if !(MIN_COLUMN_WIDTH..=MAX_COLUMN_WIDTH).contains(&width) {
                return Err(SettingsError::WidthOutOfRange(width));
            }
            if let Some(column) = next.column_mut(row, column) {
                column.width = width;
            }
        }
        (_, update) => {
            return Err(SettingsError::NotApplicable {
                update: update.name(),
                panel: panel.name(),
            });
        }
    }

    Ok(next)
}

fn merge_content(content: &mut Content, partial: Map<String, Value>) {
    for (key, value) in partial {
        if value.is_null() {
            content.remove(&key);
        } else {
            content.insert(key, value);
        }
    }
}

/// Stringify scalar style values up front so a bad key rejects the whole
/// update before anything is written. `None` marks a removal.
fn validate_styles(partial: Map<String, Value>) -> Result<Vec<(String, Option<String>)>, SettingsError> {
    partial
        .into_iter()
        .map(|(key, value)| {
            if value.is_null() {
                return Ok((key, None));
            }
            match style_value(&value) {
                Some(value) => Ok((key, Some(value))),
                None => Err(SettingsError::InvalidStyleValue(key)),
            }
        })
        .collect()
}

fn merge_styles(styles: &mut Styles, partial: Vec<(String, Option<String>)>) {
    for (key, value) in partial {
        match value {
            Some(value) => {
                styles.insert(key, value);
            }
            None => {
                styles.remove(&key);
            }
        }
    }
}

fn merge_settings(
    settings: &DocumentSettings,
    partial: Map<String, Value>,
) -> Result<DocumentSettings, SettingsError> {
    let mut merged = match serde_json::to_value(settings)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    for (key, value) in partial {
        if value.is_null() {
            merged.remove(&key);
        } else {
            merged.insert(key, value);
        }
    }
    Ok(serde_json::from_value(Value::Object(merged))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailcraft_document::{BlockRegistry, IdGenerator};
    use serde_json::json;
    use std::sync::Arc;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("Expected object"),
        }
    }

    /// One row with one column holding a heading
    fn fixture() -> (Document, String, String, String) {
        let mut registry = BlockRegistry::new(IdGenerator::from_seed("set"));
        let mut row = registry.create_row(1).unwrap();
        let heading = registry.create_block("heading").unwrap();
        let ids = (row.id.clone(), row.columns[0].id.clone(), heading.id.clone());
        Arc::make_mut(&mut row.columns[0]).blocks.push(Arc::new(heading));

        let mut doc = Document::new();
        doc.rows.push(Arc::new(row));
        (doc, ids.0, ids.1, ids.2)
    }

    #[test]
    fn test_panel_classification() {
        let (doc, row, column, block) = fixture();

        assert_eq!(SettingsPanel::for_selection(&doc, None), SettingsPanel::Global);
        assert_eq!(
            SettingsPanel::for_selection(&doc, Some(&row)),
            SettingsPanel::Row { id: row.clone() }
        );
        assert_eq!(
            SettingsPanel::for_selection(&doc, Some(&column)),
            SettingsPanel::Column { id: column.clone() }
        );
        assert_eq!(
            SettingsPanel::for_selection(&doc, Some(&block)),
            SettingsPanel::Block {
                id: block.clone(),
                block_type: "heading".to_string()
            }
        );
        assert_eq!(
            SettingsPanel::for_selection(&doc, Some("deleted")),
            SettingsPanel::Global
        );
    }

    #[test]
    fn test_row_wins_over_block_with_same_id() {
        let doc = mailcraft_document::from_json(
            r#"{ "rows": [{ "id": "dup", "columns": [{ "id": "c", "blocks": [{ "id": "dup", "type": "spacer" }] }] }] }"#,
        )
        .unwrap();

        assert_eq!(
            SettingsPanel::for_selection(&doc, Some("dup")),
            SettingsPanel::Row { id: "dup".to_string() }
        );
    }

    #[test]
    fn test_content_merge() {
        let (doc, _, _, block) = fixture();

        let next = apply_settings(
            &doc,
            Some(&block),
            SettingsUpdate::Content(object(json!({ "text": "Big news", "level": null }))),
        )
        .unwrap();

        let edited = next.block(&block).unwrap();
        assert_eq!(edited.text("text"), Some("Big news"));
        assert!(edited.content.get("level").is_none());
        assert_eq!(doc.block(&block).unwrap().text("level"), Some("h2"));
    }

    #[test]
    fn test_style_merge_on_each_level() {
        let (doc, row, column, block) = fixture();

        for id in [&row, &column, &block] {
            let next = apply_settings(
                &doc,
                Some(id),
                SettingsUpdate::Styles(object(json!({ "backgroundColor": "#fafafa", "paddingTop": 8 }))),
            )
            .unwrap();

            let styles = match next.locate(id).unwrap() {
                NodePath::Row { row } => next.rows[row].styles.clone(),
                NodePath::Column { row, column } => next.rows[row].columns[column].styles.clone(),
                NodePath::Block { row, column, block } => {
                    next.rows[row].columns[column].blocks[block].styles.clone()
                }
            };
            assert_eq!(styles.get("backgroundColor").map(String::as_str), Some("#fafafa"));
            assert_eq!(styles.get("paddingTop").map(String::as_str), Some("8"));
        }
    }

    #[test]
    fn test_invalid_style_value_rejects_whole_update() {
        let (doc, row, _, _) = fixture();
        let err = apply_settings(
            &doc,
            Some(&row),
            SettingsUpdate::Styles(object(json!({ "padding": "4px", "border": { "width": 1 } }))),
        )
        .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidStyleValue(key) if key == "border"));
    }

    #[test]
    fn test_width_update() {
        let (doc, _, column, block) = fixture();

        let next = apply_settings(&doc, Some(&column), SettingsUpdate::Width(40)).unwrap();
        assert_eq!(next.column(&column).unwrap().width, 40);

        assert!(matches!(
            apply_settings(&doc, Some(&column), SettingsUpdate::Width(5)),
            Err(SettingsError::WidthOutOfRange(5))
        ));
        assert!(matches!(
            apply_settings(&doc, Some(&block), SettingsUpdate::Width(40)),
            Err(SettingsError::NotApplicable { update: "width", panel: "block" })
        ));
    }

    #[test]
    fn test_global_update_with_stale_selection() {
        let (doc, _, _, _) = fixture();

        let next = apply_settings(
            &doc,
            Some("deleted"),
            SettingsUpdate::Global(object(json!({ "maxWidth": 640, "backgroundColor": "#ffffff" }))),
        )
        .unwrap();

        assert_eq!(next.settings.max_width, 640);
        assert_eq!(next.settings.background_color, "#ffffff");
        assert_eq!(next.settings.font_family, doc.settings.font_family);
        assert_eq!(next.rows, doc.rows);
    }

    #[test]
    fn test_global_update_rejects_bad_types() {
        let (doc, _, _, _) = fixture();
        let err = apply_settings(
            &doc,
            None,
            SettingsUpdate::Global(object(json!({ "maxWidth": "wide" }))),
        )
        .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidSettings(_)));
    }

    #[test]
    fn test_content_on_row_is_not_applicable() {
        let (doc, row, _, _) = fixture();
        let err = apply_settings(
            &doc,
            Some(&row),
            SettingsUpdate::Content(object(json!({ "text": "x" }))),
        )
        .unwrap_err();
        assert!(matches!(err, SettingsError::NotApplicable { update: "content", panel: "row" }));
    }
}
