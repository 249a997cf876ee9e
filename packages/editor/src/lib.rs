//! # Mailcraft Editor
//!
//! Editing engine behind the drag-and-drop email builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ UI: palette, canvas, settings panels        │
//! └─────────────────────────────────────────────┘
//!              ↓ gestures        ↓ panel edits
//! ┌─────────────────────────────────────────────┐
//! │ editor                                      │
//! │  - DropResolver: gesture → one new document │
//! │  - mutations: move / delete / duplicate     │
//! │  - settings: panel for selection + merges   │
//! │  - EditorStore: document, selection, drag   │
//! └─────────────────────────────────────────────┘
//!                     ↓ SetDocument
//! ┌─────────────────────────────────────────────┐
//! │ compiler-html: Document → email HTML        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Documents are values**: every edit computes a complete next
//!    document; unchanged subtrees are shared, never copied
//! 2. **One dispatch per gesture**: hovering never touches the document
//! 3. **Stale IDs are harmless**: unknown sources, targets and selections
//!    degrade to no-ops or the global panel
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mailcraft_editor::{DragSource, DropTarget, EditorConfig, Pipeline};
//!
//! let config = EditorConfig::load(".")?;
//! let mut pipeline = Pipeline::from_config(&config);
//!
//! pipeline.begin_drag(DragSource::Palette("heading".to_string()))?;
//! pipeline.hover(Some(DropTarget::Canvas));
//! pipeline.end_drag(Some(DropTarget::Canvas))?;
//!
//! let html = pipeline.html();
//! ```

mod config;
mod drag;
mod errors;
mod mutations;
mod pipeline;
mod settings;
mod store;

pub use config::{EditorConfig, RenderConfig, DEFAULT_CONFIG_NAME};
pub use drag::{DragError, DragSource, DragState, DropResolver, DropTarget};
pub use errors::EditorError;
pub use mutations::{
    delete_node, duplicate_node, insert_block, insert_row, move_item, move_to_end,
    resolve_destination, Destination, Mutation, MutationError,
};
pub use pipeline::Pipeline;
pub use settings::{apply_settings, SettingsError, SettingsPanel, SettingsUpdate};
pub use store::{Action, ActionKind, EditorState, EditorStore, SubscriptionId};

// Re-export common types for convenience
pub use mailcraft_document::{Block, BlockRegistry, Column, Document, Row};
