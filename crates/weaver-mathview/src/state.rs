//! Editor state: an immutable document plus the current selection.

use crate::document::Document;
use crate::transaction::Transaction;
use crate::types::Selection;

#[derive(Debug, Clone)]
pub struct EditorState {
    doc: Document,
    selection: Selection,
}

impl EditorState {
    /// Create a state. The selection is clamped to the document.
    pub fn new(doc: Document, selection: Selection) -> Self {
        let selection = selection.clamp(doc.len());
        Self { doc, selection }
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Start a transaction from this state.
    pub fn tr(&self) -> Transaction {
        Transaction::new(self)
    }

    /// The state that results from `tr`.
    pub fn apply(&self, tr: &Transaction) -> EditorState {
        EditorState::new(tr.doc().clone(), tr.selection())
    }
}
