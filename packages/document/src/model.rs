//! # Document Model
//!
//! The email design tree: a [`Document`] owns [`Row`]s, rows own
//! [`Column`]s, columns own [`Block`]s.
//!
//! Every node sits behind an `Arc`. Cloning a document only bumps reference
//! counts; the `*_mut` accessors go through `Arc::make_mut`, so an edit
//! copies the path from the root down to the changed node and shares every
//! other subtree with the previous value.
//!
//! ```text
//! Document
//!  ├─ settings
//!  └─ rows[]
//!      └─ Row { id, styles, columns[] }
//!          └─ Column { id, width, styles, blocks[] }
//!              └─ Block { id, type, content, styles }
//! ```

use crate::error::DocumentError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// CSS-like overrides keyed by camelCase property name
pub type Styles = BTreeMap<String, String>;

/// Type-specific block content
pub type Content = Map<String, Value>;

/// Root of an email design
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub settings: DocumentSettings,

    #[serde(default)]
    pub rows: Vec<Arc<Row>>,
}

/// Global style defaults applied to the whole email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentSettings {
    pub background_color: String,

    /// Content width in pixels
    pub max_width: u32,

    pub text_color: String,
    pub font_family: String,
    pub padding: String,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            background_color: "#f4f4f5".to_string(),
            max_width: 600,
            text_color: "#18181b".to_string(),
            font_family: "Arial, Helvetica, sans-serif".to_string(),
            padding: "24px".to_string(),
        }
    }
}

/// Horizontal section of the email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub id: String,

    #[serde(default, deserialize_with = "deserialize_styles")]
    pub styles: Styles,

    #[serde(default)]
    pub columns: Vec<Arc<Column>>,
}

/// Vertical slot inside a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,

    /// Percentage of the row width (10-100)
    #[serde(default = "default_width", deserialize_with = "deserialize_width")]
    pub width: u8,

    #[serde(default, deserialize_with = "deserialize_styles")]
    pub styles: Styles,

    #[serde(default)]
    pub blocks: Vec<Arc<Block>>,
}

/// Smallest content unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,

    /// Raw type tag. Kept as a string so tags this build does not know
    /// survive a load/save round trip.
    #[serde(rename = "type")]
    pub block_type: String,

    #[serde(default, deserialize_with = "deserialize_content")]
    pub content: Content,

    #[serde(default, deserialize_with = "deserialize_styles")]
    pub styles: Styles,
}

pub const MIN_COLUMN_WIDTH: u8 = 10;
pub const MAX_COLUMN_WIDTH: u8 = 100;

fn default_width() -> u8 {
    MAX_COLUMN_WIDTH
}

/// Any JSON number, rounded and clamped to the allowed range. Numeric
/// strings are accepted too; anything else reads as the default.
fn deserialize_width<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let width = match &raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    };

    Ok(width
        .filter(|w| w.is_finite())
        .map(|w| w.round().clamp(MIN_COLUMN_WIDTH as f64, MAX_COLUMN_WIDTH as f64) as u8)
        .unwrap_or_else(default_width))
}

/// Block content must be an object; `null` or any other value reads as
/// empty content
fn deserialize_content<'de, D>(deserializer: D) -> Result<Content, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Content::new()),
    }
}

/// Accepts stored style maps whose values are numbers or booleans
/// (`"fontSize": 16`) and stringifies them. Nulls and nested values are
/// dropped, and a `null` or non-object map reads as empty.
fn deserialize_styles<'de, D>(deserializer: D) -> Result<Styles, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(raw) = Value::deserialize(deserializer)? else {
        return Ok(Styles::new());
    };
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| style_value(&value).map(|value| (key, value)))
        .collect())
}

/// String form of a JSON scalar used as a style value
pub fn style_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Closed set of block types this build knows how to create and render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Heading,
    Paragraph,
    Image,
    Button,
    Divider,
    Spacer,
    Social,
    Menu,
    Video,
    Html,
}

impl BlockKind {
    pub const ALL: [BlockKind; 10] = [
        BlockKind::Heading,
        BlockKind::Paragraph,
        BlockKind::Image,
        BlockKind::Button,
        BlockKind::Divider,
        BlockKind::Spacer,
        BlockKind::Social,
        BlockKind::Menu,
        BlockKind::Video,
        BlockKind::Html,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Heading => "heading",
            BlockKind::Paragraph => "paragraph",
            BlockKind::Image => "image",
            BlockKind::Button => "button",
            BlockKind::Divider => "divider",
            BlockKind::Spacer => "spacer",
            BlockKind::Social => "social",
            BlockKind::Menu => "menu",
            BlockKind::Video => "video",
            BlockKind::Html => "html",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DocumentError::InvalidBlockType(s.to_string()))
    }
}

impl Block {
    /// Known kind, or `None` for a tag loaded from stale data
    pub fn kind(&self) -> Option<BlockKind> {
        self.block_type.parse().ok()
    }

    /// Non-empty string content under `key`
    pub fn text(&self, key: &str) -> Option<&str> {
        self.content
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Finite numeric content under `key`, also accepting numeric strings
    pub fn number(&self, key: &str) -> Option<f64> {
        let number = match self.content.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().trim_end_matches("px").parse::<f64>().ok(),
            _ => None,
        };
        number.filter(|n| n.is_finite())
    }
}

impl Row {
    pub fn block_count(&self) -> usize {
        self.columns.iter().map(|c| c.blocks.len()).sum()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: DocumentSettings) -> Self {
        Self {
            settings,
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn block_count(&self) -> usize {
        self.rows.iter().map(|r| r.block_count()).sum()
    }

    pub fn row(&self, id: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id).map(Arc::as_ref)
    }

    pub fn column(&self, id: &str) -> Option<&Column> {
        self.rows
            .iter()
            .flat_map(|r| r.columns.iter())
            .find(|c| c.id == id)
            .map(Arc::as_ref)
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.rows
            .iter()
            .flat_map(|r| r.columns.iter())
            .flat_map(|c| c.blocks.iter())
            .find(|b| b.id == id)
            .map(Arc::as_ref)
    }

    /// Every node ID in scan order: rows, then their columns and blocks
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flat_map(|row| {
            std::iter::once(row.id.as_str()).chain(row.columns.iter().flat_map(|column| {
                std::iter::once(column.id.as_str())
                    .chain(column.blocks.iter().map(|b| b.id.as_str()))
            }))
        })
    }

    pub fn row_mut(&mut self, row: usize) -> Option<&mut Row> {
        self.rows.get_mut(row).map(Arc::make_mut)
    }

    pub fn column_mut(&mut self, row: usize, column: usize) -> Option<&mut Column> {
        self.row_mut(row)?.columns.get_mut(column).map(Arc::make_mut)
    }

    pub fn block_mut(&mut self, row: usize, column: usize, block: usize) -> Option<&mut Block> {
        self.column_mut(row, column)?
            .blocks
            .get_mut(block)
            .map(Arc::make_mut)
    }
}
