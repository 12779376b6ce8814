//! Transactions: a batch of steps plus a selection update.

use std::collections::BTreeMap;

use smol_str::SmolStr;

use crate::document::Document;
use crate::error::TransformError;
use crate::mapping::{Assoc, Mapping};
use crate::mark::{Mark, MarkType};
use crate::state::EditorState;
use crate::step::Step;
use crate::types::Selection;

/// An edit in progress, created from a state with [`EditorState::tr`].
///
/// Steps are applied eagerly, so `doc()` is always the document as it will be
/// after the transaction. The mapping accumulates one step map per step.
#[derive(Debug, Clone)]
pub struct Transaction {
    before: Document,
    doc: Document,
    docs: Vec<Document>,
    steps: Vec<Step>,
    mapping: Mapping,
    start_selection: Selection,
    selection: Option<Selection>,
    meta: BTreeMap<SmolStr, SmolStr>,
}

impl Transaction {
    pub(crate) fn new(state: &EditorState) -> Self {
        Self {
            before: state.doc().clone(),
            doc: state.doc().clone(),
            docs: Vec::new(),
            steps: Vec::new(),
            mapping: Mapping::new(),
            start_selection: state.selection(),
            selection: None,
            meta: BTreeMap::new(),
        }
    }

    /// Document the transaction started from.
    pub fn before(&self) -> &Document {
        &self.before
    }

    /// Document after all steps so far.
    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The document each step was applied to, parallel to `steps()`.
    pub fn docs(&self) -> &[Document] {
        &self.docs
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Whether `set_selection` was called.
    pub fn selection_set(&self) -> bool {
        self.selection.is_some()
    }

    /// The selection after this transaction: the explicit one if set,
    /// otherwise the starting selection mapped through every step.
    pub fn selection(&self) -> Selection {
        match self.selection {
            Some(selection) => selection,
            None => Selection::new(
                self.mapping.map(self.start_selection.anchor, Assoc::After),
                self.mapping.map(self.start_selection.head, Assoc::After),
            )
            .clamp(self.doc.len()),
        }
    }

    /// Apply a step and record it.
    pub fn step(&mut self, step: Step) -> Result<&mut Self, TransformError> {
        let doc = step.apply(&self.doc)?;
        tracing::trace!(target: "weaver::transform", ?step, "applied step");
        self.mapping.push(step.get_map());
        self.steps.push(step);
        self.docs.push(std::mem::replace(&mut self.doc, doc));
        Ok(self)
    }

    /// Insert text at `pos`. The new text takes the marks running through `pos`.
    pub fn insert_text(&mut self, pos: usize, text: &str) -> Result<&mut Self, TransformError> {
        self.doc.check_pos(pos)?;
        let marks = self.doc.marks_inside(pos);
        self.replace_with(pos, pos, text, marks)
    }

    pub fn delete(&mut self, from: usize, to: usize) -> Result<&mut Self, TransformError> {
        self.replace_with(from, to, "", Vec::new())
    }

    /// Replace `from..to` with `text` carrying `marks`.
    pub fn replace_with(
        &mut self,
        from: usize,
        to: usize,
        text: &str,
        marks: Vec<Mark>,
    ) -> Result<&mut Self, TransformError> {
        self.doc.check_range(from, to)?;
        if from == to && text.is_empty() {
            return Ok(self);
        }
        self.step(Step::Replace {
            from,
            to,
            text: text.into(),
            marks,
        })
    }

    pub fn add_mark(
        &mut self,
        from: usize,
        to: usize,
        mark: Mark,
    ) -> Result<&mut Self, TransformError> {
        self.doc.check_range(from, to)?;
        if from == to {
            return Err(TransformError::EmptyMarkRange { pos: from });
        }
        self.step(Step::AddMark { from, to, mark })
    }

    /// Remove every mark of `ty` from `from..to`, one step per distinct mark found.
    pub fn remove_mark(
        &mut self,
        from: usize,
        to: usize,
        ty: &MarkType,
    ) -> Result<&mut Self, TransformError> {
        self.doc.check_range(from, to)?;
        let range = from..to;
        let found: Vec<Step> = self
            .doc
            .marks()
            .spans_of_type(ty)
            .filter(|span| span.overlaps(&range))
            .map(|span| Step::RemoveMark {
                from: span.range.start.max(from),
                to: span.range.end.min(to),
                mark: span.mark.clone(),
            })
            .collect();
        for step in found {
            self.step(step)?;
        }
        Ok(self)
    }

    pub fn set_selection(&mut self, selection: Selection) -> Result<&mut Self, TransformError> {
        self.doc.check_pos(selection.anchor)?;
        self.doc.check_pos(selection.head)?;
        self.selection = Some(selection);
        Ok(self)
    }

    /// Attach a piece of metadata for plugins or the host.
    pub fn set_meta(&mut self, key: impl Into<SmolStr>, value: impl Into<SmolStr>) -> &mut Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn get_meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(SmolStr::as_str)
    }
}
