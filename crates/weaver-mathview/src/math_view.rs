//! Live math preview.
//!
//! Math-marked ranges show a typeset preview while the cursor is elsewhere
//! and their raw source while the cursor is inside them. The plugin owns one
//! `DecorationSet`:
//!
//! - for every inactive range, an inline decoration hiding the source and a
//!   widget at the range start rendering the preview
//! - nothing for the range holding the cursor
//!
//! On each transaction the set is rebuilt when a math mark was added or
//! removed, or when the cursor was or is inside math. Any other transaction
//! only remaps the existing set, so previews are not re-typeset by unrelated
//! edits.

use std::ops::Range;
use std::rc::Rc;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::config::MathViewConfig;
use crate::decoration::{Decoration, DecorationSet, InlineAttrs};
use crate::document::Document;
use crate::mark::MarkType;
use crate::plugin::{DecorationProvider, PluginKey, StateField};
use crate::state::EditorState;
use crate::transaction::Transaction;
use crate::typeset::{MathKind, Typesetter};
use crate::types::Selection;
use crate::view::EditorView;
use crate::widget::{Element, GetPos, Widget, WidgetFactory};

pub struct MathViewPlugin {
    config: MathViewConfig,
    mark: MarkType,
    typesetter: Arc<dyn Typesetter>,
}

impl MathViewPlugin {
    pub const KEY: PluginKey = PluginKey::new("math-view");

    const RESCAN: &'static str = "rescan";

    pub fn new(config: MathViewConfig, typesetter: Arc<dyn Typesetter>) -> Self {
        let mark = config.mark_type();
        Self {
            config,
            mark,
            typesetter,
        }
    }

    /// Plugin with the default configuration.
    pub fn with_typesetter(typesetter: Arc<dyn Typesetter>) -> Self {
        Self::new(MathViewConfig::default(), typesetter)
    }

    pub fn config(&self) -> &MathViewConfig {
        &self.config
    }

    /// Build the full decoration set for `state`.
    pub fn decorations_for_doc(&self, state: &EditorState) -> DecorationSet {
        let doc = state.doc();
        let cursor = state.selection().from();
        let mut decorations = Vec::new();
        let mut seen: Vec<Range<usize>> = Vec::new();

        for node in doc.find_children_by_mark(&self.mark) {
            let Some(range) = doc.mark_range(node.pos, &self.mark) else {
                tracing::error!(
                    target: "weaver::math_view",
                    pos = node.pos,
                    "math-marked node has no resolvable mark range"
                );
                debug_assert!(false, "unresolvable math mark range at {}", node.pos);
                continue;
            };
            // Several nodes can share one run when other marks split it.
            if seen.contains(&range) {
                continue;
            }
            seen.push(range.clone());

            if range.contains(&cursor) {
                continue;
            }

            let kind = node
                .marks
                .iter()
                .find(|mark| mark.is_type(&self.mark))
                .map(MathKind::from_mark)
                .unwrap_or_default();
            let text = doc.text_between(range.start, range.end);

            decorations.push(Decoration::inline(
                range.start,
                range.end,
                InlineAttrs::style(self.config.hidden_style.clone()),
            ));
            let widget = Widget::new(Arc::new(MathPreview {
                text: text.clone(),
                kind,
                class: self.config.preview_class.clone(),
                tag: self.config.container_tag.clone(),
                typesetter: self.typesetter.clone(),
            }))
            .with_key(text);
            decorations.push(Decoration::widget(range.start, widget));
        }

        tracing::debug!(
            target: "weaver::math_view",
            ranges = seen.len(),
            decorations = decorations.len(),
            cursor,
            "scanned document for math"
        );
        DecorationSet::create(doc, decorations)
    }

    /// Ask the plugin to rebuild every preview when `tr` is applied, for
    /// example after the typesetting engine finished loading.
    pub fn request_rescan(tr: &mut Transaction) -> &mut Transaction {
        tr.set_meta(Self::KEY.name(), Self::RESCAN)
    }

    fn rescan_requested(tr: &Transaction) -> bool {
        tr.get_meta(Self::KEY.name()) == Some(Self::RESCAN)
    }

    /// Whether any step added, removed or reshaped a math range.
    fn math_marks_changed(&self, tr: &Transaction) -> bool {
        tr.steps()
            .iter()
            .zip(tr.docs())
            .any(|(step, doc)| step.changes_mark(doc, &self.mark))
    }

    fn in_math(&self, doc: &Document, selection: Selection) -> bool {
        doc.mark_range(selection.from(), &self.mark).is_some()
    }
}

impl StateField for MathViewPlugin {
    type Value = DecorationSet;

    fn key(&self) -> PluginKey {
        Self::KEY
    }

    fn init(&self, state: &EditorState) -> DecorationSet {
        self.decorations_for_doc(state)
    }

    fn apply(
        &self,
        tr: &Transaction,
        set: &DecorationSet,
        old_state: &EditorState,
        new_state: &EditorState,
    ) -> DecorationSet {
        if Self::rescan_requested(tr) {
            tracing::trace!(target: "weaver::math_view", "rescan requested");
            return self.decorations_for_doc(new_state);
        }

        if self.math_marks_changed(tr) {
            tracing::trace!(target: "weaver::math_view", "math marks changed, rescanning");
            return self.decorations_for_doc(new_state);
        }

        if self.in_math(old_state.doc(), old_state.selection())
            || self.in_math(new_state.doc(), new_state.selection())
        {
            tracing::trace!(target: "weaver::math_view", "selection touches math, rescanning");
            return self.decorations_for_doc(new_state);
        }

        tracing::trace!(
            target: "weaver::math_view",
            steps = tr.steps().len(),
            "remapping math decorations"
        );
        set.map(tr.mapping(), tr.doc())
    }
}

impl DecorationProvider for MathViewPlugin {
    fn decorations<'a>(&self, value: &'a DecorationSet) -> Option<&'a DecorationSet> {
        Some(value)
    }
}

/// Widget factory for one math range.
struct MathPreview {
    text: SmolStr,
    kind: MathKind,
    class: SmolStr,
    tag: SmolStr,
    typesetter: Arc<dyn Typesetter>,
}

impl WidgetFactory for MathPreview {
    fn to_dom(&self, get_pos: GetPos) -> Element {
        let mut container = Element::new(self.tag.clone());
        container.add_class(self.class.clone());
        container.add_class(self.kind.class());

        // Clicking the preview puts the cursor at the start of the source.
        container.set_on_click(Rc::new(move |view: &mut dyn EditorView| {
            let Some(pos) = get_pos() else {
                tracing::trace!(target: "weaver::math_view", "click on detached preview");
                return;
            };
            let mut tr = view.state().tr();
            if let Err(err) = tr.set_selection(Selection::collapsed(pos)) {
                tracing::warn!(target: "weaver::math_view", %err, "cannot select math source");
                return;
            }
            view.dispatch(tr);
            view.focus();
        }));

        self.typesetter.typeset(&mut container, &self.text, self.kind);
        container
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mark::Mark;
    use crate::typeset::SourceTypesetter;

    fn math() -> Mark {
        MathKind::Inline.mark()
    }

    fn plugin() -> MathViewPlugin {
        MathViewPlugin::with_typesetter(Arc::new(SourceTypesetter))
    }

    // "ab$x+1$cd$y$ef": A = 2..7, B = 9..12
    fn state_with(selection: Selection) -> EditorState {
        let doc = Document::from_parts("ab$x+1$cd$y$ef", [(2..7, math()), (9..12, math())])
            .unwrap();
        EditorState::new(doc, selection)
    }

    fn state_at(pos: usize) -> EditorState {
        state_with(Selection::collapsed(pos))
    }

    fn summary(set: &DecorationSet) -> String {
        set.iter()
            .map(|deco| match deco.as_widget() {
                Some(widget) => {
                    format!("widget @{} key={}", deco.from(), widget.key().unwrap_or(""))
                }
                None => format!("hide {}..{}", deco.from(), deco.to()),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_full_scan_outside_all_ranges() {
        let set = plugin().decorations_for_doc(&state_at(0));
        insta::assert_snapshot!(summary(&set), @r"
        widget @2 key=$x+1$
        hide 2..7
        widget @9 key=$y$
        hide 9..12
        ");
    }

    #[test]
    fn test_cursor_at_range_start_is_active() {
        let set = plugin().decorations_for_doc(&state_at(2));
        assert_eq!(set.len(), 2);
        assert!(set.find(2, 7).is_empty());
    }

    #[test]
    fn test_cursor_at_range_end_is_inactive() {
        let set = plugin().decorations_for_doc(&state_at(7));
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_split_run_yields_one_pair() {
        let doc = Document::from_parts(
            "$a*b$",
            [(0..5, math()), (2..3, Mark::new(MarkType::new("em")))],
        )
        .unwrap();
        let state = EditorState::new(doc.clone(), Selection::collapsed(5));
        assert_eq!(doc.find_children_by_mark(&MarkType::MATH).len(), 3);
        let set = plugin().decorations_for_doc(&state);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_hidden_style_from_config() {
        let config = MathViewConfig {
            hidden_style: "visibility: hidden;".into(),
            ..Default::default()
        };
        let plugin = MathViewPlugin::new(config, Arc::new(SourceTypesetter));
        let set = plugin.decorations_for_doc(&state_at(0));
        let (_, attrs) = set.inlines().next().unwrap();
        assert_eq!(attrs.style.as_deref(), Some("visibility: hidden;"));
    }

    #[test]
    fn test_custom_mark_name() {
        let config = MathViewConfig {
            mark: "tex".into(),
            ..Default::default()
        };
        let plugin = MathViewPlugin::new(config, Arc::new(SourceTypesetter));
        let doc = Document::from_parts(
            "$a$ $b$",
            [(0..3, Mark::new(MarkType::new("tex"))), (4..7, math())],
        )
        .unwrap();
        let set = plugin.decorations_for_doc(&EditorState::new(doc, Selection::collapsed(7)));
        assert_eq!(set.len(), 2);
        assert_eq!(set.widgets().next().unwrap().0, 0);
    }

    #[test]
    fn test_widget_renders_preview() {
        let set = plugin().decorations_for_doc(&state_at(0));
        let (_, widget) = set.widgets().next().unwrap();
        let el = widget.render(Rc::new(|| Some(2)));
        assert_eq!(el.tag(), "div");
        assert!(el.has_class("pm-math-mathjax"));
        assert!(el.has_class("pm-math-inline"));
        assert_eq!(el.text_content(), "\\(x+1\\)");
        assert!(el.on_click().is_some());
    }

    #[test]
    fn test_display_math_kind() {
        let doc = Document::from_parts("$$a$$", [(0..5, MathKind::Display.mark())]).unwrap();
        let set = plugin().decorations_for_doc(&EditorState::new(doc, Selection::collapsed(5)));
        let (_, widget) = set.widgets().next().unwrap();
        let el = widget.render(Rc::new(|| Some(0)));
        assert!(el.has_class("pm-math-display"));
        assert_eq!(el.text_content(), "\\[a\\]");
    }

    #[test]
    fn test_apply_tiers() {
        let plugin = plugin();
        let state = state_at(0);
        let set = plugin.init(&state);

        // Unrelated insertion: remapped, not rebuilt.
        let mut tr = state.tr();
        tr.insert_text(14, "!").unwrap();
        let next = state.apply(&tr);
        let remapped = plugin.apply(&tr, &set, &state, &next);
        let old_widget = set.widgets().next().unwrap().1;
        let new_widget = remapped.widgets().next().unwrap().1;
        assert!(Arc::ptr_eq(old_widget, new_widget));

        // Adding a math mark: rebuilt.
        let mut tr = next.tr();
        tr.add_mark(13, 15, math()).unwrap();
        let marked = next.apply(&tr);
        let rebuilt = plugin.apply(&tr, &remapped, &next, &marked);
        assert_eq!(rebuilt.len(), 6);
        let first = rebuilt.widgets().next().unwrap().1;
        assert!(!Arc::ptr_eq(old_widget, first));

        // Moving into A: rebuilt without A's pair.
        let mut tr = marked.tr();
        tr.set_selection(Selection::collapsed(3)).unwrap();
        let inside = marked.apply(&tr);
        let active = plugin.apply(&tr, &rebuilt, &marked, &inside);
        assert_eq!(active.len(), 4);
        assert!(active.find(2, 7).is_empty());
    }

    #[test]
    fn test_other_mark_changes_do_not_rescan() {
        let plugin = plugin();
        let state = state_at(0);
        let set = plugin.init(&state);

        let mut tr = state.tr();
        tr.add_mark(0, 2, Mark::new(MarkType::new("strong"))).unwrap();
        let next = state.apply(&tr);
        let after = plugin.apply(&tr, &set, &state, &next);
        assert!(after.ptr_eq(&set));
    }

    #[test]
    fn test_selection_decided_by_lower_bound() {
        // Forward, starting outside A and ending inside it: A keeps its preview.
        let set = plugin().decorations_for_doc(&state_with(Selection::new(0, 4)));
        assert_eq!(set.len(), 4);

        // Backward, head inside A and anchor past it: A shows its source.
        let set = plugin().decorations_for_doc(&state_with(Selection::new(8, 3)));
        assert_eq!(set.len(), 2);
        assert!(set.find(2, 7).is_empty());
    }

    #[test]
    fn test_range_selection_tiers() {
        let plugin = plugin();
        let state = state_at(0);
        let set = plugin.init(&state);

        // Extending past A's start keeps the lower bound outside: remapped.
        let mut tr = state.tr();
        tr.set_selection(Selection::new(0, 4)).unwrap();
        let extended = state.apply(&tr);
        let kept = plugin.apply(&tr, &set, &state, &extended);
        assert!(kept.ptr_eq(&set));

        // A backward selection whose lower bound is in A: rescanned.
        let mut tr = extended.tr();
        tr.set_selection(Selection::new(8, 3)).unwrap();
        let backward = extended.apply(&tr);
        let active = plugin.apply(&tr, &kept, &extended, &backward);
        assert_eq!(active.len(), 2);
        assert!(active.find(2, 7).is_empty());

        // Leaving A again: the old lower bound was in math, so rescanned.
        let mut tr = backward.tr();
        tr.set_selection(Selection::new(1, 5)).unwrap();
        let forward = backward.apply(&tr);
        let restored = plugin.apply(&tr, &active, &backward, &forward);
        assert_eq!(summary(&restored), summary(&set));
    }

    #[test]
    fn test_requested_rescan() {
        let plugin = plugin();
        let state = state_at(0);
        let set = plugin.init(&state);

        let mut tr = state.tr();
        MathViewPlugin::request_rescan(&mut tr);
        let next = state.apply(&tr);
        let rebuilt = plugin.apply(&tr, &set, &state, &next);
        assert!(!rebuilt.ptr_eq(&set));
        assert_eq!(summary(&rebuilt), summary(&set));
    }

    #[test]
    fn test_replace_reshaping_math_rescans() {
        let plugin = plugin();
        let state = state_at(0);
        let set = plugin.init(&state);

        // Inserting marked math at the end of the document.
        let mut tr = state.tr();
        tr.replace_with(14, 14, "$q$", vec![math()]).unwrap();
        let next = state.apply(&tr);
        let rebuilt = plugin.apply(&tr, &set, &state, &next);
        let widgets: Vec<usize> = rebuilt.widgets().map(|(pos, _)| pos).collect();
        assert_eq!(widgets, vec![2, 9, 14]);

        // Plain text cutting into B's start shrinks B, its preview follows.
        let mut tr = state.tr();
        tr.replace_with(8, 10, "QQ", vec![]).unwrap();
        let next = state.apply(&tr);
        let rebuilt = plugin.apply(&tr, &set, &state, &next);
        insta::assert_snapshot!(summary(&rebuilt), @r"
        widget @2 key=$x+1$
        hide 2..7
        widget @10 key=y$
        hide 10..12
        ");
    }
}
