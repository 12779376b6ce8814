//! Marks and mark spans.
//!
//! A mark tags a run of characters (math, emphasis, links, ...). Marks of the
//! same type are exclusive: a character carries at most one mark of each type.
//! `MarkSet` stores marks as non-overlapping, normalized spans so that every
//! span is a maximal contiguous run of one mark.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use smol_str::SmolStr;

/// Identity of a kind of mark. Two marks have the same type when their names match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkType(SmolStr);

impl MarkType {
    /// The math mark (inline and display math).
    pub const MATH: MarkType = MarkType(SmolStr::new_inline("math"));

    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// A mark instance: a type plus attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mark {
    pub ty: MarkType,
    pub attrs: BTreeMap<SmolStr, SmolStr>,
}

impl Mark {
    pub fn new(ty: MarkType) -> Self {
        Self {
            ty,
            attrs: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, key: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(SmolStr::as_str)
    }

    pub fn is_type(&self, ty: &MarkType) -> bool {
        &self.ty == ty
    }
}

/// One contiguous run of a mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkSpan {
    pub range: Range<usize>,
    pub mark: Mark,
}

impl MarkSpan {
    pub fn new(range: Range<usize>, mark: Mark) -> Self {
        Self { range, mark }
    }

    /// Whether the char at `pos` carries this span's mark.
    pub fn covers(&self, pos: usize) -> bool {
        self.range.contains(&pos)
    }

    /// Whether this span shares at least one char with `range`.
    pub fn overlaps(&self, range: &Range<usize>) -> bool {
        self.range.start < range.end && range.start < self.range.end
    }
}

/// Normalized collection of mark spans for one document.
///
/// Invariants kept after every mutation:
/// - no empty spans
/// - spans of the same type never overlap
/// - adjacent spans with equal marks are merged
/// - spans are ordered by start, then by mark type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkSet {
    spans: Vec<MarkSpan>,
}

impl MarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spans(&self) -> &[MarkSpan] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Spans carrying a mark of `ty`, in document order.
    pub fn spans_of_type<'a, 'b>(
        &'a self,
        ty: &'b MarkType,
    ) -> impl Iterator<Item = &'a MarkSpan> + use<'a, 'b> {
        self.spans.iter().filter(move |span| span.mark.is_type(ty))
    }

    /// Marks on the char at `pos`.
    pub fn marks_at(&self, pos: usize) -> Vec<&Mark> {
        self.spans
            .iter()
            .filter(|span| span.covers(pos))
            .map(|span| &span.mark)
            .collect()
    }

    /// The span of `ty` covering the char at `pos`, if any.
    pub fn span_at(&self, pos: usize, ty: &MarkType) -> Option<&MarkSpan> {
        self.spans_of_type(ty).find(|span| span.covers(pos))
    }

    /// Every position where some mark starts or ends.
    pub fn boundaries(&self) -> BTreeSet<usize> {
        self.spans
            .iter()
            .flat_map(|span| [span.range.start, span.range.end])
            .collect()
    }

    /// Apply `mark` to `range`, replacing any other mark of the same type there.
    pub fn add(&mut self, range: Range<usize>, mark: Mark) {
        if range.is_empty() {
            return;
        }
        self.cut(&range, |span| span.mark.ty == mark.ty);
        self.spans.push(MarkSpan::new(range, mark));
        self.normalize();
    }

    /// Remove exactly `mark` from `range`.
    pub fn remove(&mut self, range: Range<usize>, mark: &Mark) {
        if range.is_empty() {
            return;
        }
        self.cut(&range, |span| &span.mark == mark);
        self.normalize();
    }

    /// Remove every mark of `ty` from `range`.
    pub fn remove_type(&mut self, range: Range<usize>, ty: &MarkType) {
        if range.is_empty() {
            return;
        }
        self.cut(&range, |span| &span.mark.ty == ty);
        self.normalize();
    }

    /// Adjust spans for a text replacement.
    ///
    /// `range` is removed, `inserted_len` chars are inserted at its start and
    /// carry exactly `inserted_marks`. Spans that straddle the insertion point
    /// are split around the new text.
    pub fn replace(&mut self, range: Range<usize>, inserted_len: usize, inserted_marks: &[Mark]) {
        let from = range.start;
        let to = range.end;
        let mut spans = Vec::with_capacity(self.spans.len() + 1);

        for span in self.spans.drain(..) {
            let MarkSpan { range: r, mark } = span;
            if r.start < from {
                spans.push(MarkSpan::new(r.start..r.end.min(from), mark.clone()));
            }
            if r.end > to {
                let start = r.start.max(to);
                let shift = |pos: usize| pos - to + from + inserted_len;
                spans.push(MarkSpan::new(shift(start)..shift(r.end), mark));
            }
        }

        self.spans = spans;
        for mark in inserted_marks {
            let inserted = from..from + inserted_len;
            self.cut(&inserted, |span| span.mark.ty == mark.ty);
            if !inserted.is_empty() {
                self.spans.push(MarkSpan::new(inserted, mark.clone()));
            }
        }
        self.normalize();
    }

    /// Remove `range` from every span matching `pred`, keeping the parts outside it.
    fn cut(&mut self, range: &Range<usize>, pred: impl Fn(&MarkSpan) -> bool) {
        let mut spans = Vec::with_capacity(self.spans.len() + 1);
        for span in self.spans.drain(..) {
            if !pred(&span) || !span.overlaps(range) {
                spans.push(span);
                continue;
            }
            if span.range.start < range.start {
                spans.push(MarkSpan::new(span.range.start..range.start, span.mark.clone()));
            }
            if span.range.end > range.end {
                spans.push(MarkSpan::new(range.end..span.range.end, span.mark));
            }
        }
        self.spans = spans;
    }

    fn normalize(&mut self) {
        self.spans.retain(|span| !span.range.is_empty());
        self.spans
            .sort_by(|a, b| (&a.mark.ty, a.range.start).cmp(&(&b.mark.ty, b.range.start)));

        let mut merged: Vec<MarkSpan> = Vec::with_capacity(self.spans.len());
        for span in self.spans.drain(..) {
            if let Some(last) = merged.last_mut() {
                if last.mark == span.mark && span.range.start <= last.range.end {
                    last.range.end = last.range.end.max(span.range.end);
                    continue;
                }
            }
            merged.push(span);
        }

        merged.sort_by(|a, b| (a.range.start, &a.mark.ty).cmp(&(b.range.start, &b.mark.ty)));
        self.spans = merged;
    }
}
