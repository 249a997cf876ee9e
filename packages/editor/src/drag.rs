//! # Drop-Target Resolver
//!
//! Turns a drag gesture into exactly one document change.
//!
//! ```text
//!          begin(source)                 end(Some(target))
//!   Idle ───────────────▶ Dragging ─────────────────────────▶ Idle + SetDocument
//!                           │  ▲
//!                  hover()  └──┘            end(None) / cancel()
//!                                  ─────────────────────────▶ Idle
//! ```
//!
//! Hovering only moves the transient highlight. The document is computed
//! and dispatched once, when the gesture ends over a target. Leaving the
//! `Dragging` state always clears the store's dragged ID.
//!
//! ## Palette drops
//!
//! - Layout tags (`"2-column"`) create a row. Dropped on a row it is
//!   inserted before that row; anywhere else it is appended.
//! - Block tags resolve a column the same way as a move: the target column,
//!   or the column owning the target block. The new block goes before the
//!   target block, or at the end of the column. Any other target wraps the
//!   block in a new one-column row appended to the document.
//!
//! Existing nodes are handed to [`move_item`].

use crate::mutations::{insert_block, insert_row, move_item, move_to_end};
use crate::store::{Action, EditorStore};
use mailcraft_document::{BlockRegistry, Document, DocumentError, NodePath, PaletteItem};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// What is being dragged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSource {
    /// A palette entry, by tag
    Palette(String),
    /// An existing row or block, by ID
    Existing(String),
}

impl DragSource {
    /// Value recorded as the store's dragged ID
    pub fn dragged_id(&self) -> &str {
        match self {
            DragSource::Palette(tag) => tag,
            DragSource::Existing(id) => id,
        }
    }
}

/// Where the pointer was released
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// The canvas root, outside any row
    Canvas,
    Node(String),
}

impl DropTarget {
    fn node_id(&self) -> Option<&str> {
        match self {
            DropTarget::Canvas => None,
            DropTarget::Node(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source: DragSource,
        /// Parsed palette entry, for palette sources
        item: Option<PaletteItem>,
        /// Target under the pointer, for highlighting only
        hover: Option<DropTarget>,
    },
}

#[derive(Error, Debug)]
pub enum DragError {
    #[error("A drag gesture is already in progress")]
    GestureInProgress,

    #[error("No drag gesture in progress")]
    NotDragging,

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Drag state machine plus the factory used for palette drops
#[derive(Debug)]
pub struct DropResolver {
    state: DragState,
    registry: BlockRegistry,
}

impl DropResolver {
    pub fn new(registry: BlockRegistry) -> Self {
        Self {
            state: DragState::Idle,
            registry,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Target currently highlighted
    pub fn hovered(&self) -> Option<&DropTarget> {
        match &self.state {
            DragState::Dragging { hover, .. } => hover.as_ref(),
            DragState::Idle => None,
        }
    }

    pub fn registry_mut(&mut self) -> &mut BlockRegistry {
        &mut self.registry
    }

    /// Start a gesture. Palette tags are validated here so a bad tag never
    /// reaches the drop.
    pub fn begin(&mut self, store: &mut EditorStore, source: DragSource) -> Result<(), DragError> {
        if self.is_dragging() || store.dragged_id().is_some() {
            return Err(DragError::GestureInProgress);
        }

        let item = match &source {
            DragSource::Palette(tag) => Some(PaletteItem::parse(tag)?),
            DragSource::Existing(_) => None,
        };

        debug!(source = ?source, "Drag started");
        store.dispatch(Action::SetDragged(Some(source.dragged_id().to_string())));
        self.state = DragState::Dragging {
            source,
            item,
            hover: None,
        };
        Ok(())
    }

    /// Pointer moved over `target`. Never touches the document.
    pub fn hover(&mut self, target: Option<DropTarget>) {
        if let DragState::Dragging { hover, .. } = &mut self.state {
            *hover = target;
        }
    }

    /// Finish the gesture. With a target the resulting document is
    /// dispatched and `true` returned; without one the gesture is
    /// cancelled.
    #[instrument(skip(self, store))]
    pub fn end(&mut self, store: &mut EditorStore, target: Option<DropTarget>) -> Result<bool, DragError> {
        let DragState::Dragging { source, item, .. } = std::mem::take(&mut self.state) else {
            return Err(DragError::NotDragging);
        };

        let committed = match target {
            Some(target) => self
                .resolve(store.document(), &source, item, &target)
                .map(|next| {
                    store.dispatch(Action::SetDocument(next));
                    info!(source = ?source, target = ?target, "Drop committed");
                    true
                }),
            None => {
                debug!(source = ?source, "Drag cancelled");
                Ok(false)
            }
        };

        // The gesture is over even when the drop failed
        store.dispatch(Action::SetDragged(None));
        committed
    }

    /// Abandon the gesture without changing the document
    pub fn cancel(&mut self, store: &mut EditorStore) {
        if self.is_dragging() {
            self.state = DragState::Idle;
            store.dispatch(Action::SetDragged(None));
        }
    }

    /// Compute the document a drop produces. Pure apart from minting IDs.
    pub fn resolve(
        &mut self,
        doc: &Document,
        source: &DragSource,
        item: Option<PaletteItem>,
        target: &DropTarget,
    ) -> Result<Document, DragError> {
        match (source, item) {
            (DragSource::Existing(id), _) => Ok(match target.node_id() {
                Some(target_id) => move_item(doc, id, target_id),
                None => move_to_end(doc, id),
            }),
            (DragSource::Palette(tag), None) => {
                let item = PaletteItem::parse(tag)?;
                self.drop_palette(doc, item, target)
            }
            (DragSource::Palette(_), Some(item)) => self.drop_palette(doc, item, target),
        }
    }

    fn drop_palette(
        &mut self,
        doc: &Document,
        item: PaletteItem,
        target: &DropTarget,
    ) -> Result<Document, DragError> {
        self.registry.reserve_ids(doc);

        match item {
            PaletteItem::Layout(columns) => {
                let row = self.registry.create_row(columns)?;
                let before = target
                    .node_id()
                    .filter(|id| matches!(doc.locate(id), Some(NodePath::Row { .. })));
                Ok(insert_row(doc, row, before))
            }
            PaletteItem::Block(kind) => {
                let block = self.registry.create_block_of(kind);

                if let Some(target_id) = target.node_id() {
                    if let Some(next) = insert_block(doc, block.clone(), target_id) {
                        return Ok(next);
                    }
                }

                let mut row = self.registry.create_row(1)?;
                if let Some(column) = row.columns.first_mut() {
                    Arc::make_mut(column).blocks.push(Arc::new(block));
                }
                Ok(insert_row(doc, row, None))
            }
        }
    }
}

impl Default for DropResolver {
    fn default() -> Self {
        Self::new(BlockRegistry::default())
    }
}
