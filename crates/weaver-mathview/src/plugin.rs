//! Plugin hooks the host calls on every state transition.

use crate::decoration::DecorationSet;
use crate::state::EditorState;
use crate::transaction::Transaction;

/// Identifies a plugin's slice of editor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginKey(&'static str);

impl PluginKey {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

/// A plugin-owned value derived from editor state.
///
/// `init` runs once when the host creates its state; `apply` runs for every
/// transaction and returns the replacement value. Both are synchronous.
pub trait StateField {
    type Value: Clone;

    fn key(&self) -> PluginKey;

    fn init(&self, state: &EditorState) -> Self::Value;

    fn apply(
        &self,
        tr: &Transaction,
        value: &Self::Value,
        old_state: &EditorState,
        new_state: &EditorState,
    ) -> Self::Value;
}

/// A plugin whose state includes decorations for the host to paint.
pub trait DecorationProvider: StateField {
    fn decorations<'a>(&self, value: &'a Self::Value) -> Option<&'a DecorationSet>;
}
