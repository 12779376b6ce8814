//! View-only decorations and decoration sets.
//!
//! Decorations never touch document content. Inline decorations override the
//! presentation of a range; widget decorations attach a lazily built element at
//! a position. A `DecorationSet` is immutable: remapping through a transaction
//! yields a new set that shares widget payloads with the old one, so hosts can
//! keep already painted widgets.

use std::ops::Range;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::document::Document;
use crate::mapping::{Assoc, Mapping};
use crate::widget::Widget;

/// Presentation overrides for an inline decoration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineAttrs {
    pub style: Option<SmolStr>,
    pub class: Option<SmolStr>,
}

impl InlineAttrs {
    pub fn style(style: impl Into<SmolStr>) -> Self {
        Self {
            style: Some(style.into()),
            class: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DecorationKind {
    Inline(InlineAttrs),
    Widget(Arc<Widget>),
}

#[derive(Debug, Clone)]
pub struct Decoration {
    from: usize,
    to: usize,
    kind: DecorationKind,
}

impl Decoration {
    /// Style override for `from..to`.
    pub fn inline(from: usize, to: usize, attrs: InlineAttrs) -> Self {
        Self {
            from,
            to,
            kind: DecorationKind::Inline(attrs),
        }
    }

    /// Widget anchored at `pos`.
    pub fn widget(pos: usize, widget: Widget) -> Self {
        Self {
            from: pos,
            to: pos,
            kind: DecorationKind::Widget(Arc::new(widget)),
        }
    }

    pub fn from(&self) -> usize {
        self.from
    }

    pub fn to(&self) -> usize {
        self.to
    }

    pub fn range(&self) -> Range<usize> {
        self.from..self.to
    }

    pub fn kind(&self) -> &DecorationKind {
        &self.kind
    }

    pub fn is_widget(&self) -> bool {
        matches!(self.kind, DecorationKind::Widget(_))
    }

    pub fn as_widget(&self) -> Option<&Arc<Widget>> {
        match &self.kind {
            DecorationKind::Widget(widget) => Some(widget),
            DecorationKind::Inline(_) => None,
        }
    }

    pub fn as_inline(&self) -> Option<&InlineAttrs> {
        match &self.kind {
            DecorationKind::Inline(attrs) => Some(attrs),
            DecorationKind::Widget(_) => None,
        }
    }

    /// Carry this decoration through `mapping`. `None` means it was deleted.
    ///
    /// Inline ranges do not grow to cover text inserted at their edges and
    /// vanish once they collapse. Widgets vanish when the content they sit
    /// on is deleted.
    fn map(&self, mapping: &Mapping, doc_len: usize) -> Option<Decoration> {
        match &self.kind {
            DecorationKind::Inline(_) => {
                let from = mapping.map(self.from, Assoc::After);
                let to = mapping.map(self.to, Assoc::Before);
                if from >= to || to > doc_len {
                    return None;
                }
                Some(Decoration {
                    from,
                    to,
                    kind: self.kind.clone(),
                })
            }
            DecorationKind::Widget(widget) => {
                let assoc = if widget.side() < 0 {
                    Assoc::Before
                } else {
                    Assoc::After
                };
                let result = mapping.map_result(self.from, assoc);
                if result.deleted || result.pos > doc_len {
                    return None;
                }
                Some(Decoration {
                    from: result.pos,
                    to: result.pos,
                    kind: self.kind.clone(),
                })
            }
        }
    }
}

/// Ordered, immutable collection of decorations for one document.
#[derive(Debug, Clone, Default)]
pub struct DecorationSet {
    decorations: Arc<[Decoration]>,
}

impl DecorationSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set for `doc`. Decorations outside the document and empty
    /// inline ranges are dropped.
    pub fn create(doc: &Document, decorations: Vec<Decoration>) -> Self {
        let len = doc.len();
        let mut decorations: Vec<Decoration> = decorations
            .into_iter()
            .filter(|deco| {
                let valid = deco.from <= deco.to
                    && deco.to <= len
                    && (deco.is_widget() || deco.from < deco.to);
                if !valid {
                    tracing::warn!(
                        target: "weaver::decoration",
                        from = deco.from,
                        to = deco.to,
                        doc_len = len,
                        "dropping decoration outside document"
                    );
                }
                valid
            })
            .collect();
        Self::sort(&mut decorations);
        Self {
            decorations: decorations.into(),
        }
    }

    /// Remap every decoration through `mapping` onto `doc`.
    pub fn map(&self, mapping: &Mapping, doc: &Document) -> Self {
        if self.decorations.is_empty() || mapping.maps().iter().all(|m| m.is_identity()) {
            return self.clone();
        }
        let len = doc.len();
        let mut decorations: Vec<Decoration> = self
            .decorations
            .iter()
            .filter_map(|deco| deco.map(mapping, len))
            .collect();
        Self::sort(&mut decorations);
        Self {
            decorations: decorations.into(),
        }
    }

    fn sort(decorations: &mut [Decoration]) {
        decorations.sort_by_key(|deco| (deco.from, deco.to));
    }

    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decoration> {
        self.decorations.iter()
    }

    /// Decorations touching `start..=end`.
    pub fn find(&self, start: usize, end: usize) -> Vec<&Decoration> {
        self.decorations
            .iter()
            .filter(|deco| deco.from <= end && deco.to >= start)
            .collect()
    }

    pub fn widgets(&self) -> impl Iterator<Item = (usize, &Arc<Widget>)> {
        self.decorations
            .iter()
            .filter_map(|deco| deco.as_widget().map(|w| (deco.from, w)))
    }

    pub fn inlines(&self) -> impl Iterator<Item = (Range<usize>, &InlineAttrs)> {
        self.decorations
            .iter()
            .filter_map(|deco| deco.as_inline().map(|attrs| (deco.range(), attrs)))
    }

    /// Whether both sets hold the same decorations, with widgets compared by identity.
    pub fn ptr_eq(&self, other: &DecorationSet) -> bool {
        Arc::ptr_eq(&self.decorations, &other.decorations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::StepMap;
    use crate::widget::{Element, GetPos, WidgetFactory};

    struct Blank;

    impl WidgetFactory for Blank {
        fn to_dom(&self, _get_pos: GetPos) -> Element {
            Element::new("span")
        }
    }

    fn pair(from: usize, to: usize) -> Vec<Decoration> {
        vec![
            Decoration::inline(from, to, InlineAttrs::style("display: none;")),
            Decoration::widget(from, Widget::new(Arc::new(Blank))),
        ]
    }

    fn mapping(maps: impl IntoIterator<Item = StepMap>) -> Mapping {
        let mut mapping = Mapping::new();
        for map in maps {
            mapping.push(map);
        }
        mapping
    }

    #[test]
    fn test_create_sorts_and_filters() {
        let doc = Document::new("0123456789");
        let mut decos = pair(6, 8);
        decos.extend(pair(1, 3));
        decos.push(Decoration::inline(4, 4, InlineAttrs::default()));
        decos.push(Decoration::inline(8, 20, InlineAttrs::default()));

        let set = DecorationSet::create(&doc, decos);
        let order: Vec<(usize, usize, bool)> =
            set.iter().map(|d| (d.from(), d.to(), d.is_widget())).collect();
        assert_eq!(
            order,
            vec![(1, 1, true), (1, 3, false), (6, 6, true), (6, 8, false)]
        );
    }

    #[test]
    fn test_map_shifts_and_keeps_widget_identity() {
        let doc = Document::new("0123456789");
        let set = DecorationSet::create(&doc, pair(4, 7));
        let before = set.widgets().next().map(|(_, w)| w.clone()).unwrap();

        // Insert two chars at the start.
        let new_doc = Document::new("xx0123456789");
        let mapped = set.map(&mapping([StepMap::new(0, 0, 2)]), &new_doc);
        let (pos, after) = mapped.widgets().next().unwrap();
        assert_eq!(pos, 6);
        assert!(Arc::ptr_eq(&before, after));
        assert_eq!(mapped.inlines().next().unwrap().0, 6..9);
    }

    #[test]
    fn test_insert_at_edges_does_not_grow_inline() {
        let doc = Document::new("0123456789");
        let set = DecorationSet::create(&doc, pair(4, 7));

        let at_start = set.map(&mapping([StepMap::new(4, 0, 1)]), &Document::new("01234567890"));
        assert_eq!(at_start.inlines().next().unwrap().0, 5..8);
        assert_eq!(at_start.widgets().next().unwrap().0, 5);

        let at_end = set.map(&mapping([StepMap::new(7, 0, 1)]), &Document::new("01234567890"));
        assert_eq!(at_end.inlines().next().unwrap().0, 4..7);
    }

    #[test]
    fn test_map_drops_deleted() {
        let doc = Document::new("0123456789");
        let mut decos = pair(2, 5);
        decos.extend(pair(7, 9));
        let set = DecorationSet::create(&doc, decos);

        // Delete 1..6, covering the first pair entirely.
        let mapped = set.map(&mapping([StepMap::new(1, 5, 0)]), &Document::new("06789"));
        assert_eq!(mapped.len(), 2);
        assert_eq!(mapped.widgets().next().unwrap().0, 2);
        assert_eq!(mapped.inlines().next().unwrap().0, 2..4);
    }

    #[test]
    fn test_map_identity_is_cheap() {
        let doc = Document::new("0123456789");
        let set = DecorationSet::create(&doc, pair(2, 5));
        let mapped = set.map(&mapping([StepMap::identity()]), &doc);
        assert!(mapped.ptr_eq(&set));
    }

    #[test]
    fn test_find() {
        let doc = Document::new("0123456789");
        let mut decos = pair(2, 5);
        decos.extend(pair(7, 9));
        let set = DecorationSet::create(&doc, decos);
        assert_eq!(set.find(0, 1).len(), 0);
        assert_eq!(set.find(3, 3).len(), 1);
        assert_eq!(set.find(5, 7).len(), 3);
    }
}
