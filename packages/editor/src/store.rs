//! # Editor State Store
//!
//! Single owner of the document being edited, the current selection and
//! the node being dragged.
//!
//! State only changes through [`EditorStore::dispatch`]. Actions replace
//! whole values; the store never merges. Structural and content edits are
//! computed elsewhere into a complete next document and handed over with
//! [`Action::SetDocument`].
//!
//! Observers register callbacks and are told about every dispatch after it
//! has been applied.

use crate::settings::{apply_settings, SettingsError, SettingsUpdate};
use mailcraft_document::Document;
use std::fmt;
use tracing::debug;

/// Everything the editor UI reads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorState {
    pub document: Document,

    /// Node whose settings panel is shown
    pub selected_id: Option<String>,

    /// Node or palette tag currently being dragged
    pub dragged_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetDocument(Document),
    SelectElement(Option<String>),
    SetDragged(Option<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    SetDocument,
    SelectElement,
    SetDragged,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::SetDocument(_) => ActionKind::SetDocument,
            Action::SelectElement(_) => ActionKind::SelectElement,
            Action::SetDragged(_) => ActionKind::SetDragged,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&EditorState, ActionKind)>;

pub struct EditorStore {
    state: EditorState,

    /// Bumped on every `SetDocument`
    version: u64,

    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl EditorStore {
    pub fn new(document: Document) -> Self {
        Self {
            state: EditorState {
                document,
                selected_id: None,
                dragged_id: None,
            },
            version: 0,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn document(&self) -> &Document {
        &self.state.document
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.state.selected_id.as_deref()
    }

    pub fn dragged_id(&self) -> Option<&str> {
        self.state.dragged_id.as_deref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn dispatch(&mut self, action: Action) {
        let kind = action.kind();

        match action {
            Action::SetDocument(document) => {
                self.state.document = document;
                self.version += 1;
            }
            Action::SelectElement(id) => self.state.selected_id = id,
            Action::SetDragged(id) => self.state.dragged_id = id,
        }

        debug!(action = ?kind, version = self.version, "Dispatched");

        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.state, kind);
        }
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&EditorState, ActionKind) + 'static,
    {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether the subscription existed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Apply a settings edit to the selected node (or the global settings
    /// when nothing valid is selected) and dispatch the result
    pub fn update_selected(&mut self, update: SettingsUpdate) -> Result<(), SettingsError> {
        let next = apply_settings(&self.state.document, self.selected_id(), update)?;
        self.dispatch(Action::SetDocument(next));
        Ok(())
    }
}

impl Default for EditorStore {
    fn default() -> Self {
        Self::new(Document::new())
    }
}

impl fmt::Debug for EditorStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorStore")
            .field("state", &self.state)
            .field("version", &self.version)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
