//! # Block Registry
//!
//! The only place rows and blocks are created. Every node handed out
//! carries a freshly minted ID; unknown type tags are rejected here so the
//! rest of the engine can treat an unrecognised `type` as stale data.

use crate::error::{DocumentError, DocumentResult};
use crate::id_generator::IdGenerator;
use crate::model::{Block, BlockKind, Column, Content, Document, Row, Styles};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

pub const MAX_COLUMNS: usize = 4;

pub const DEFAULT_HEADING_TEXT: &str = "Your heading";
pub const DEFAULT_BUTTON_COLOR: &str = "#2563eb";

/// Brand hints supplied by the client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrandColors {
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub text: Option<String>,
}

/// What a palette entry instantiates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteItem {
    /// A row with this many columns
    Layout(usize),
    Block(BlockKind),
}

impl PaletteItem {
    /// Parse a palette tag: a block type name, `"N-column"` or `"columns-N"`
    pub fn parse(tag: &str) -> DocumentResult<Self> {
        if let Ok(kind) = BlockKind::from_str(tag) {
            return Ok(PaletteItem::Block(kind));
        }

        let count = tag
            .strip_suffix("-column")
            .or_else(|| tag.strip_suffix("-columns"))
            .or_else(|| tag.strip_prefix("columns-"))
            .and_then(|n| n.parse::<usize>().ok());

        match count {
            Some(n) if (1..=MAX_COLUMNS).contains(&n) => Ok(PaletteItem::Layout(n)),
            _ => Err(DocumentError::invalid_block_type(tag)),
        }
    }
}

impl FromStr for PaletteItem {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaletteItem::parse(s)
    }
}

/// Factory for rows and blocks with default content
#[derive(Debug, Clone)]
pub struct BlockRegistry {
    ids: IdGenerator,
    brand: BrandColors,
    reserved: HashSet<String>,
}

impl BlockRegistry {
    pub fn new(ids: IdGenerator) -> Self {
        Self {
            ids,
            brand: BrandColors::default(),
            reserved: HashSet::new(),
        }
    }

    pub fn with_brand(mut self, brand: BrandColors) -> Self {
        self.brand = brand;
        self
    }

    /// Remember every ID already present in `doc` so new IDs never reuse
    /// one, even when the document was minted by another generator
    pub fn reserve_ids(&mut self, doc: &Document) {
        self.reserved.extend(doc.ids().map(str::to_string));
    }

    pub fn next_id(&mut self) -> String {
        loop {
            let id = self.ids.new_id();
            if self.reserved.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Create a block from a type tag
    pub fn create_block(&mut self, block_type: &str) -> DocumentResult<Block> {
        let kind = BlockKind::from_str(block_type)?;
        Ok(self.create_block_of(kind))
    }

    pub fn create_block_of(&mut self, kind: BlockKind) -> Block {
        let (content, styles) = self.defaults(kind);
        Block {
            id: self.next_id(),
            block_type: kind.as_str().to_string(),
            content,
            styles,
        }
    }

    /// Create a row of `column_count` equal-width, empty columns
    pub fn create_row(&mut self, column_count: usize) -> DocumentResult<Row> {
        if !(1..=MAX_COLUMNS).contains(&column_count) {
            return Err(DocumentError::InvalidColumnCount {
                count: column_count,
                max: MAX_COLUMNS,
            });
        }

        let width = (100.0 / column_count as f64).round() as u8;
        let id = self.next_id();
        let columns = (0..column_count)
            .map(|_| {
                Arc::new(Column {
                    id: self.next_id(),
                    width,
                    styles: Styles::new(),
                    blocks: Vec::new(),
                })
            })
            .collect();

        Ok(Row {
            id,
            styles: Styles::new(),
            columns,
        })
    }

    /// Copy a row or block subtree, re-keying every node
    pub fn rekey_row(&mut self, row: &Row) -> Row {
        Row {
            id: self.next_id(),
            styles: row.styles.clone(),
            columns: row
                .columns
                .iter()
                .map(|column| {
                    Arc::new(Column {
                        id: self.next_id(),
                        width: column.width,
                        styles: column.styles.clone(),
                        blocks: column
                            .blocks
                            .iter()
                            .map(|b| Arc::new(self.rekey_block(b)))
                            .collect(),
                    })
                })
                .collect(),
        }
    }

    pub fn rekey_block(&mut self, block: &Block) -> Block {
        Block {
            id: self.next_id(),
            ..block.clone()
        }
    }

    fn defaults(&self, kind: BlockKind) -> (Content, Styles) {
        match kind {
            BlockKind::Heading => {
                let mut st = styles(&[
                    ("fontSize", "28px"),
                    ("fontWeight", "bold"),
                    ("textAlign", "left"),
                ]);
                if let Some(text) = &self.brand.text {
                    st.insert("color".to_string(), text.clone());
                }
                (
                    object(json!({ "text": DEFAULT_HEADING_TEXT, "level": "h2" })),
                    st,
                )
            }
            BlockKind::Paragraph => (
                object(json!({ "text": "<p>Write something great.</p>" })),
                styles(&[("fontSize", "16px"), ("lineHeight", "1.5")]),
            ),
            BlockKind::Image => (
                object(json!({ "src": "", "alt": "", "href": "" })),
                styles(&[("width", "100%")]),
            ),
            BlockKind::Button => {
                let background = self
                    .brand
                    .primary
                    .as_deref()
                    .unwrap_or(DEFAULT_BUTTON_COLOR);
                (
                    object(json!({ "text": "Click here", "url": "#" })),
                    styles(&[
                        ("backgroundColor", background),
                        ("color", "#ffffff"),
                        ("padding", "12px 24px"),
                        ("borderRadius", "4px"),
                        ("textAlign", "center"),
                    ]),
                )
            }
            BlockKind::Divider => (
                object(json!({ "thickness": 1, "color": "#e4e4e7", "style": "solid" })),
                Styles::new(),
            ),
            BlockKind::Spacer => (object(json!({ "height": 24 })), Styles::new()),
            BlockKind::Social => (
                object(json!({
                    "links": [
                        { "network": "facebook", "url": "#" },
                        { "network": "twitter", "url": "#" },
                        { "network": "instagram", "url": "#" },
                    ]
                })),
                styles(&[("textAlign", "center")]),
            ),
            BlockKind::Menu => (
                object(json!({
                    "items": [
                        { "label": "Home", "url": "#" },
                        { "label": "Blog", "url": "#" },
                        { "label": "Contact", "url": "#" },
                    ]
                })),
                styles(&[("textAlign", "center")]),
            ),
            BlockKind::Video => (
                object(json!({ "url": "", "thumbnail": "" })),
                Styles::new(),
            ),
            BlockKind::Html => (
                object(json!({ "html": "<div>Custom HTML</div>" })),
                Styles::new(),
            ),
        }
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new(IdGenerator::random())
    }
}

fn object(value: Value) -> Content {
    match value {
        Value::Object(map) => map,
        _ => Content::new(),
    }
}

fn styles(pairs: &[(&str, &str)]) -> Styles {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
