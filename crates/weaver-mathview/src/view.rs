//! The host side of the plugin contract.
//!
//! `EditorView` is what widget click handlers talk to. `HeadlessView` is a
//! complete host without a UI toolkit: it applies transactions, runs the
//! plugin's state hooks, paints widgets lazily and keeps their positions
//! current. Real front ends do the same against their own node tree.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use crate::decoration::DecorationSet;
use crate::plugin::DecorationProvider;
use crate::state::EditorState;
use crate::transaction::Transaction;
use crate::widget::{Element, Widget};

pub trait EditorView {
    fn state(&self) -> &EditorState;

    /// Queue a transaction. It is applied after whatever is currently running.
    fn dispatch(&mut self, tr: Transaction);

    fn focus(&mut self);

    fn has_focus(&self) -> bool;
}

struct PaintedWidget {
    widget: Arc<Widget>,
    pos: Rc<Cell<Option<usize>>>,
    element: Element,
}

/// In-memory host for a single decoration-providing plugin.
pub struct HeadlessView<P: DecorationProvider> {
    plugin: P,
    state: EditorState,
    value: P::Value,
    painted: Vec<PaintedWidget>,
    queue: VecDeque<Transaction>,
    dispatching: bool,
    focused: bool,
    renders: usize,
}

impl<P: DecorationProvider> HeadlessView<P> {
    pub fn new(plugin: P, state: EditorState) -> Self {
        let value = plugin.init(&state);
        let mut view = Self {
            plugin,
            state,
            value,
            painted: Vec::new(),
            queue: VecDeque::new(),
            dispatching: false,
            focused: false,
            renders: 0,
        };
        view.paint();
        view
    }

    pub fn plugin(&self) -> &P {
        &self.plugin
    }

    pub fn plugin_value(&self) -> &P::Value {
        &self.value
    }

    /// Decorations the plugin currently provides.
    pub fn decorations(&self) -> DecorationSet {
        self.plugin
            .decorations(&self.value)
            .cloned()
            .unwrap_or_default()
    }

    /// Painted widgets with their current positions, in document order.
    pub fn painted(&self) -> impl Iterator<Item = (usize, &Element)> {
        self.painted
            .iter()
            .filter_map(|p| p.pos.get().map(|pos| (pos, &p.element)))
    }

    /// How many times a widget element has been built.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Simulate a click on the `index`th painted widget. Returns false if it
    /// does not exist or has no click handler.
    pub fn click_widget(&mut self, index: usize) -> bool {
        let Some(handler) = self
            .painted
            .get(index)
            .and_then(|p| p.element.on_click().cloned())
        else {
            return false;
        };
        let view: &mut dyn EditorView = self;
        handler(view);
        true
    }

    fn apply_transaction(&mut self, tr: Transaction) {
        let new_state = self.state.apply(&tr);
        let value = self
            .plugin
            .apply(&tr, &self.value, &self.state, &new_state);
        self.state = new_state;
        self.value = value;
        self.paint();
    }

    /// Sync painted widgets with the current decorations.
    ///
    /// An existing element is kept when its widget is the same allocation
    /// (remapped set) or renders the same thing (rebuilt set, same key).
    /// Elements that are no longer needed have their position cleared.
    fn paint(&mut self) {
        let decorations = self.decorations();
        let wanted: Vec<(usize, Arc<Widget>)> = decorations
            .widgets()
            .map(|(pos, widget)| (pos, widget.clone()))
            .collect();

        let mut previous: Vec<Option<PaintedWidget>> = self.painted.drain(..).map(Some).collect();
        let mut slots: Vec<Option<PaintedWidget>> = wanted.iter().map(|_| None).collect();

        for (slot, (_, widget)) in slots.iter_mut().zip(&wanted) {
            if let Some(idx) = previous
                .iter()
                .position(|p| p.as_ref().is_some_and(|p| Arc::ptr_eq(&p.widget, widget)))
            {
                *slot = previous[idx].take();
            }
        }
        for (slot, (_, widget)) in slots.iter_mut().zip(&wanted) {
            if slot.is_some() {
                continue;
            }
            if let Some(idx) = previous
                .iter()
                .position(|p| p.as_ref().is_some_and(|p| p.widget.same_as(widget)))
            {
                *slot = previous[idx].take();
            }
        }

        let mut reused = 0;
        let mut painted = Vec::with_capacity(wanted.len());
        for (slot, (pos, widget)) in slots.into_iter().zip(wanted) {
            let entry = match slot {
                Some(mut entry) => {
                    reused += 1;
                    entry.pos.set(Some(pos));
                    entry.widget = widget;
                    entry
                }
                None => {
                    let cell = Rc::new(Cell::new(Some(pos)));
                    let reader = cell.clone();
                    let element = widget.render(Rc::new(move || reader.get()));
                    self.renders += 1;
                    PaintedWidget {
                        widget,
                        pos: cell,
                        element,
                    }
                }
            };
            painted.push(entry);
        }

        let mut destroyed = 0;
        for stale in previous.into_iter().flatten() {
            stale.pos.set(None);
            destroyed += 1;
        }

        tracing::trace!(
            target: "weaver::view",
            painted = painted.len(),
            reused,
            destroyed,
            "painted widgets"
        );
        self.painted = painted;
    }
}

impl<P: DecorationProvider> EditorView for HeadlessView<P> {
    fn state(&self) -> &EditorState {
        &self.state
    }

    fn dispatch(&mut self, tr: Transaction) {
        self.queue.push_back(tr);
        if self.dispatching {
            return;
        }
        self.dispatching = true;
        while let Some(tr) = self.queue.pop_front() {
            self.apply_transaction(tr);
        }
        self.dispatching = false;
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn has_focus(&self) -> bool {
        self.focused
    }
}
