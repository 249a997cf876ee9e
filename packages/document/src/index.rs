//! # Node Lookup
//!
//! Nodes carry no parent pointers. A node's owner is found by looking its
//! ID up with [`Document::locate`] and reading the positions of the
//! enclosing row and column.
//!
//! Lookups scan rows first, then columns, then blocks, so if malformed data
//! ever reuses an ID the structurally outermost node wins.

use crate::model::Document;

/// Position of a node inside a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodePath {
    Row { row: usize },
    Column { row: usize, column: usize },
    Block { row: usize, column: usize, block: usize },
}

impl Document {
    /// Find a node by ID
    pub fn locate(&self, id: &str) -> Option<NodePath> {
        if let Some(row) = self.rows.iter().position(|r| r.id == id) {
            return Some(NodePath::Row { row });
        }

        for (row, r) in self.rows.iter().enumerate() {
            if let Some(column) = r.columns.iter().position(|c| c.id == id) {
                return Some(NodePath::Column { row, column });
            }
        }

        for (row, r) in self.rows.iter().enumerate() {
            for (column, c) in r.columns.iter().enumerate() {
                if let Some(block) = c.blocks.iter().position(|b| b.id == id) {
                    return Some(NodePath::Block { row, column, block });
                }
            }
        }

        None
    }
}
