//! # Mailcraft Document
//!
//! Email design tree, node factories and JSON encoding.
//!
//! ```rust,ignore
//! use mailcraft_document::{BlockRegistry, Document, IdGenerator};
//!
//! let mut registry = BlockRegistry::new(IdGenerator::new("campaign-42"));
//! let mut row = registry.create_row(1)?;
//! let heading = registry.create_block("heading")?;
//! ```

pub mod error;
pub mod id_generator;
pub mod index;
pub mod model;
pub mod registry;
pub mod serializer;


pub use error::{DocumentError, DocumentResult};
pub use id_generator::{get_document_seed, IdGenerator};
pub use index::NodePath;
pub use model::{
    style_value, Block, BlockKind, Column, Content, Document, DocumentSettings, Row, Styles,
    MAX_COLUMN_WIDTH, MIN_COLUMN_WIDTH,
};
pub use registry::{BlockRegistry, BrandColors, PaletteItem, MAX_COLUMNS};
pub use serializer::{from_json, to_json, to_json_pretty};
