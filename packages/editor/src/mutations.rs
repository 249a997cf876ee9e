//! # Document Mutations
//!
//! Structural operations on email documents.
//!
//! Every operation takes the current document by reference and returns a
//! new value; the input is never touched. Because rows, columns and blocks
//! are reference counted, the new value shares every subtree the operation
//! did not modify.
//!
//! ## Move semantics
//!
//! - **Row source**: removed from its index and reinserted at the index of
//!   the target row. A target that matches no node appends the row. A
//!   column or block target leaves the document as is.
//! - **Block source**: the destination column is the target column itself,
//!   or the column that owns the target block. The block is inserted right
//!   before the target block, or appended when the target is the column.
//!   A row target or an unknown target leaves the document as is.
//! - Unknown sources and column sources leave the document as is.

use mailcraft_document::{Block, BlockRegistry, Document, NodePath, Row};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

/// Structural mutations as data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Mutation {
    /// Relocate an existing row or block
    #[serde(rename_all = "camelCase")]
    MoveItem { source_id: String, target_id: String },

    /// Remove a row or block together with its descendants
    #[serde(rename_all = "camelCase")]
    DeleteNode { node_id: String },

    /// Insert a re-keyed copy of a row or block right after it
    #[serde(rename_all = "camelCase")]
    DuplicateNode { node_id: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Cannot place {source_kind} {source_id} on {target_kind} {target_id}")]
    KindMismatch {
        source_id: String,
        source_kind: &'static str,
        target_id: String,
        target_kind: &'static str,
    },

    #[error("Columns are fixed when their row is created: {0}")]
    ColumnIsFixed(String),
}

impl Mutation {
    /// Apply to `doc`, producing the next document. Never fails; invalid
    /// mutations yield an unchanged copy.
    pub fn apply(&self, doc: &Document, registry: &mut BlockRegistry) -> Document {
        match self {
            Mutation::MoveItem { source_id, target_id } => move_item(doc, source_id, target_id),
            Mutation::DeleteNode { node_id } => delete_node(doc, node_id),
            Mutation::DuplicateNode { node_id } => duplicate_node(doc, node_id, registry),
        }
    }

    /// Strict check for callers that want to reject a mutation instead of
    /// silently getting an unchanged document
    pub fn validate(&self, doc: &Document) -> Result<(), MutationError> {
        match self {
            Mutation::MoveItem { source_id, target_id } => {
                let source = doc
                    .locate(source_id)
                    .ok_or_else(|| MutationError::NodeNotFound(source_id.clone()))?;

                if matches!(source, NodePath::Column { .. }) {
                    return Err(MutationError::ColumnIsFixed(source_id.clone()));
                }

                let target = doc.locate(target_id);
                let compatible = match (source, target) {
                    (NodePath::Row { .. }, None | Some(NodePath::Row { .. })) => true,
                    (NodePath::Block { .. }, Some(NodePath::Column { .. } | NodePath::Block { .. })) => true,
                    _ => false,
                };

                if compatible || source_id == target_id {
                    Ok(())
                } else {
                    Err(MutationError::KindMismatch {
                        source_id: source_id.clone(),
                        source_kind: kind_name(Some(source)),
                        target_id: target_id.clone(),
                        target_kind: kind_name(target),
                    })
                }
            }

            Mutation::DeleteNode { node_id } | Mutation::DuplicateNode { node_id } => {
                match doc.locate(node_id) {
                    None => Err(MutationError::NodeNotFound(node_id.clone())),
                    Some(NodePath::Column { .. }) => Err(MutationError::ColumnIsFixed(node_id.clone())),
                    Some(_) => Ok(()),
                }
            }
        }
    }
}

fn kind_name(path: Option<NodePath>) -> &'static str {
    match path {
        Some(NodePath::Row { .. }) => "row",
        Some(NodePath::Column { .. }) => "column",
        Some(NodePath::Block { .. }) => "block",
        None => "nothing",
    }
}

/// Where a block lands: a column, and optionally the block to insert before
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destination<'a> {
    pub row: usize,
    pub column: usize,
    pub before: Option<&'a str>,
}

/// Resolve a drop target to a column: the column itself, or the column
/// owning the target block
pub fn resolve_destination<'a>(doc: &Document, target_id: &'a str) -> Option<Destination<'a>> {
    match doc.locate(target_id)? {
        NodePath::Column { row, column } => Some(Destination {
            row,
            column,
            before: None,
        }),
        NodePath::Block { row, column, .. } => Some(Destination {
            row,
            column,
            before: Some(target_id),
        }),
        NodePath::Row { .. } => None,
    }
}

/// Move an existing row or block onto `target_id`
#[instrument(skip(doc))]
pub fn move_item(doc: &Document, source_id: &str, target_id: &str) -> Document {
    relocate(doc, source_id, Some(target_id))
}

/// Move an existing node to the end of the canvas. Rows are appended;
/// blocks have no canvas placement and stay where they are.
#[instrument(skip(doc))]
pub fn move_to_end(doc: &Document, source_id: &str) -> Document {
    relocate(doc, source_id, None)
}

fn relocate(doc: &Document, source_id: &str, target_id: Option<&str>) -> Document {
    let mut next = doc.clone();

    let Some(source) = doc.locate(source_id) else {
        debug!(source_id, "Move source not found");
        return next;
    };

    if target_id == Some(source_id) {
        return next;
    }

    match source {
        NodePath::Row { row } => {
            let target = target_id.and_then(|id| doc.locate(id));
            move_row(&mut next, row, target);
        }
        NodePath::Block { row, column, block } => {
            let Some(destination) = target_id.and_then(|id| resolve_destination(doc, id)) else {
                debug!(source_id, ?target_id, "Block target is not a column or block");
                return next;
            };
            move_block(&mut next, (row, column, block), destination);
        }
        NodePath::Column { .. } => {
            debug!(source_id, "Columns cannot be moved");
        }
    }

    next
}

fn move_row(doc: &mut Document, from: usize, target: Option<NodePath>) {
    match target {
        Some(NodePath::Row { row: to }) => {
            let moved = doc.rows.remove(from);
            doc.rows.insert(to, moved);
        }
        None => {
            let moved = doc.rows.remove(from);
            doc.rows.push(moved);
        }
        Some(other) => {
            debug!(target = ?other, "Row dropped on a non-row node");
        }
    }
}

fn move_block(doc: &mut Document, (row, column, index): (usize, usize, usize), to: Destination) {
    // Removing a block never shifts row or column positions, so the
    // destination resolved against the old document stays valid.
    let Some(source) = doc.column_mut(row, column) else {
        return;
    };
    let moved = source.blocks.remove(index);

    if let Some(target) = doc.column_mut(to.row, to.column) {
        insert_before(&mut target.blocks, moved, to.before);
    }
}

fn insert_before(blocks: &mut Vec<Arc<Block>>, block: Arc<Block>, before: Option<&str>) {
    let at = before
        .and_then(|id| blocks.iter().position(|b| b.id == id))
        .unwrap_or(blocks.len());
    blocks.insert(at, block);
}

/// Remove a row or block. Columns are fixed and unknown IDs are ignored.
#[instrument(skip(doc))]
pub fn delete_node(doc: &Document, node_id: &str) -> Document {
    let mut next = doc.clone();

    match doc.locate(node_id) {
        Some(NodePath::Row { row }) => {
            next.rows.remove(row);
        }
        Some(NodePath::Block { row, column, block }) => {
            if let Some(column) = next.column_mut(row, column) {
                column.blocks.remove(block);
            }
        }
        Some(NodePath::Column { .. }) => debug!(node_id, "Columns cannot be deleted"),
        None => debug!(node_id, "Delete target not found"),
    }

    next
}

/// Insert a copy of a row or block directly after the original
#[instrument(skip(doc, registry))]
pub fn duplicate_node(doc: &Document, node_id: &str, registry: &mut BlockRegistry) -> Document {
    let mut next = doc.clone();
    registry.reserve_ids(doc);

    match doc.locate(node_id) {
        Some(NodePath::Row { row }) => {
            let copy = registry.rekey_row(&doc.rows[row]);
            next.rows.insert(row + 1, Arc::new(copy));
        }
        Some(NodePath::Block { row, column, block }) => {
            let copy = registry.rekey_block(&doc.rows[row].columns[column].blocks[block]);
            if let Some(column) = next.column_mut(row, column) {
                column.blocks.insert(block + 1, Arc::new(copy));
            }
        }
        Some(NodePath::Column { .. }) => debug!(node_id, "Columns cannot be duplicated"),
        None => debug!(node_id, "Duplicate target not found"),
    }

    next
}

/// Splice a new row in before the row `before_id`, or append it
pub fn insert_row(doc: &Document, row: Row, before_id: Option<&str>) -> Document {
    let mut next = doc.clone();
    let at = before_id
        .and_then(|id| next.rows.iter().position(|r| r.id == id))
        .unwrap_or(next.rows.len());
    next.rows.insert(at, Arc::new(row));
    next
}

/// Splice a new block into the column resolved from `target_id`. Returns
/// `None` when the target is neither a column nor a block.
pub fn insert_block(doc: &Document, block: Block, target_id: &str) -> Option<Document> {
    let destination = resolve_destination(doc, target_id)?;
    let mut next = doc.clone();
    let column = next.column_mut(destination.row, destination.column)?;
    insert_before(&mut column.blocks, Arc::new(block), destination.before);
    Some(next)
}
