//! Immutable document: text plus mark spans.
//!
//! Positions are char offsets `0..=len`. A position names the gap between two
//! chars, so "the mark at `pos`" always means the mark on the char *after* it.

use std::ops::Range;

use smol_str::SmolStr;

use crate::error::TransformError;
use crate::mark::{Mark, MarkSet, MarkSpan, MarkType};
use crate::text::{EditorRope, TextBuffer};

/// A maximal run of chars sharing the same set of marks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    /// Position of the first char.
    pub pos: usize,
    pub text: SmolStr,
    pub marks: Vec<Mark>,
}

impl TextNode {
    pub fn end(&self) -> usize {
        self.pos + self.text.chars().count()
    }

    pub fn has_mark(&self, ty: &MarkType) -> bool {
        self.marks.iter().any(|mark| mark.is_type(ty))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    text: EditorRope,
    marks: MarkSet,
}

impl Document {
    /// Plain document without marks.
    pub fn new(text: &str) -> Self {
        Self {
            text: EditorRope::from_str(text),
            marks: MarkSet::new(),
        }
    }

    /// Document with marks applied to the given ranges, in order.
    pub fn from_parts(
        text: &str,
        marks: impl IntoIterator<Item = (Range<usize>, Mark)>,
    ) -> Result<Self, TransformError> {
        let mut doc = Self::new(text);
        for (range, mark) in marks {
            doc.check_range(range.start, range.end)?;
            doc.marks.add(range, mark);
        }
        Ok(doc)
    }

    pub(crate) fn with_parts(text: EditorRope, marks: MarkSet) -> Self {
        Self { text, marks }
    }

    pub fn text(&self) -> &EditorRope {
        &self.text
    }

    pub fn marks(&self) -> &MarkSet {
        &self.marks
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.text.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn content(&self) -> String {
        self.text.to_string()
    }

    pub fn check_pos(&self, pos: usize) -> Result<(), TransformError> {
        if pos > self.len() {
            return Err(TransformError::PositionOutOfRange {
                pos,
                len: self.len(),
            });
        }
        Ok(())
    }

    pub fn check_range(&self, from: usize, to: usize) -> Result<(), TransformError> {
        if from > to {
            return Err(TransformError::InvalidRange { from, to });
        }
        self.check_pos(to)
    }

    /// Text content of `from..to`, clamped to the document.
    pub fn text_between(&self, from: usize, to: usize) -> SmolStr {
        let to = to.min(self.len());
        let from = from.min(to);
        self.text.slice(from..to).unwrap_or_default()
    }

    /// Marks on the char after `pos`.
    pub fn marks_at(&self, pos: usize) -> Vec<&Mark> {
        self.marks.marks_at(pos)
    }

    /// Marks shared by the chars on both sides of `pos`.
    ///
    /// Text inserted at `pos` carries these. Marks never extend past their
    /// edges, so typing at the boundary of a run leaves the run unchanged.
    pub fn marks_inside(&self, pos: usize) -> Vec<Mark> {
        if pos == 0 {
            return Vec::new();
        }
        let after = self.marks.marks_at(pos);
        self.marks
            .marks_at(pos - 1)
            .into_iter()
            .filter(|mark| after.contains(mark))
            .cloned()
            .collect()
    }

    /// Split the document into text nodes.
    pub fn text_nodes(&self) -> Vec<TextNode> {
        let mut cuts = self.marks.boundaries();
        cuts.insert(0);
        cuts.insert(self.len());

        let cuts: Vec<usize> = cuts.into_iter().filter(|&pos| pos <= self.len()).collect();
        cuts.windows(2)
            .filter(|w| w[0] < w[1])
            .map(|w| TextNode {
                pos: w[0],
                text: self.text_between(w[0], w[1]),
                marks: self.marks.marks_at(w[0]).into_iter().cloned().collect(),
            })
            .collect()
    }

    /// Text nodes carrying a mark of `ty`.
    pub fn find_children_by_mark(&self, ty: &MarkType) -> Vec<TextNode> {
        self.text_nodes()
            .into_iter()
            .filter(|node| node.has_mark(ty))
            .collect()
    }

    /// Full extent of the run of `ty` containing the char after `pos`.
    ///
    /// The run is the contiguous stretch of the exact same mark (type and
    /// attrs), so `from <= pos < to` holds for the result.
    pub fn mark_range(&self, pos: usize, ty: &MarkType) -> Option<Range<usize>> {
        self.marks.span_at(pos, ty).map(|span| span.range.clone())
    }

    /// Whether any char in `from..to` carries a mark of `ty`.
    pub fn has_mark_in(&self, from: usize, to: usize, ty: &MarkType) -> bool {
        let range = from..to;
        self.marks
            .spans_of_type(ty)
            .any(|span: &MarkSpan| span.overlaps(&range))
    }
}
