//! Widgets: lazily rendered elements attached to a document position.
//!
//! A widget decoration only carries a factory. Nothing is built until the host
//! paints the decoration and calls [`Widget::render`]. That keeps decoration
//! sets free of side effects. The host passes a [`GetPos`] that reports where
//! the widget currently sits, since decorations move as the document changes.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::view::EditorView;

/// Live position of a painted widget. `None` once the host no longer shows it.
pub type GetPos = Rc<dyn Fn() -> Option<usize>>;

/// Click callback on a rendered element.
pub type ClickHandler = Rc<dyn Fn(&mut dyn EditorView)>;

/// Builds a widget's element at paint time.
pub trait WidgetFactory: Send + Sync {
    fn to_dom(&self, get_pos: GetPos) -> Element;
}

/// The payload of a widget decoration.
#[derive(Clone)]
pub struct Widget {
    factory: Arc<dyn WidgetFactory>,
    key: Option<SmolStr>,
    side: i32,
}

impl Widget {
    pub fn new(factory: Arc<dyn WidgetFactory>) -> Self {
        Self {
            factory,
            key: None,
            side: 0,
        }
    }

    /// Key used to recognise an unchanged widget across rebuilt decoration sets.
    pub fn with_key(mut self, key: impl Into<SmolStr>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Negative sides stick before content inserted at the widget's position.
    pub fn with_side(mut self, side: i32) -> Self {
        self.side = side;
        self
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn side(&self) -> i32 {
        self.side
    }

    /// Build the element. Called by the host when painting.
    pub fn render(&self, get_pos: GetPos) -> Element {
        self.factory.to_dom(get_pos)
    }

    /// Whether `other` would render the same thing, so an existing element can be kept.
    pub fn same_as(&self, other: &Widget) -> bool {
        match (&self.key, &other.key) {
            (Some(a), Some(b)) => a == b,
            _ => Arc::ptr_eq(&self.factory, &other.factory) && self.side == other.side,
        }
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("key", &self.key)
            .field("side", &self.side)
            .finish_non_exhaustive()
    }
}

/// Child of an [`Element`].
#[derive(Clone, Debug)]
pub enum Node {
    Text(SmolStr),
    Element(Element),
}

/// Minimal element tree produced by widgets.
///
/// Platform layers turn this into real nodes (see the browser crate).
#[derive(Clone, Default)]
pub struct Element {
    tag: SmolStr,
    classes: Vec<SmolStr>,
    style: Option<SmolStr>,
    attrs: BTreeMap<SmolStr, SmolStr>,
    children: Vec<Node>,
    on_click: Option<ClickHandler>,
}

impl Element {
    pub fn new(tag: impl Into<SmolStr>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn add_class(&mut self, class: impl Into<SmolStr>) {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn classes(&self) -> &[SmolStr] {
        &self.classes
    }

    pub fn set_style(&mut self, style: impl Into<SmolStr>) {
        self.style = Some(style.into());
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn set_attribute(&mut self, name: impl Into<SmolStr>, value: impl Into<SmolStr>) {
        self.attrs.insert(name.into(), value.into());
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(SmolStr::as_str)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn append_text(&mut self, text: impl Into<SmolStr>) {
        self.children.push(Node::Text(text.into()));
    }

    pub fn append_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => out.push_str(&el.text_content()),
            }
        }
        out
    }

    pub fn set_on_click(&mut self, handler: ClickHandler) {
        self.on_click = Some(handler);
    }

    pub fn on_click(&self) -> Option<&ClickHandler> {
        self.on_click.as_ref()
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag)
            .field("classes", &self.classes)
            .field("style", &self.style)
            .field("attrs", &self.attrs)
            .field("children", &self.children)
            .field("on_click", &self.on_click.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Label(&'static str);

    impl WidgetFactory for Label {
        fn to_dom(&self, get_pos: GetPos) -> Element {
            let mut el = Element::new("span");
            el.append_text(self.0);
            if let Some(pos) = get_pos() {
                el.set_attribute("data-pos", pos.to_string());
            }
            el
        }
    }

    #[test]
    fn test_render_is_lazy_and_uses_pos() {
        let widget = Widget::new(Arc::new(Label("x")));
        let el = widget.render(Rc::new(|| Some(4)));
        assert_eq!(el.tag(), "span");
        assert_eq!(el.text_content(), "x");
        assert_eq!(el.attribute("data-pos"), Some("4"));
    }

    #[test]
    fn test_same_as_prefers_keys() {
        let a = Widget::new(Arc::new(Label("x"))).with_key("$x$");
        let b = Widget::new(Arc::new(Label("y"))).with_key("$x$");
        let c = Widget::new(Arc::new(Label("x"))).with_key("$y$");
        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));

        let factory: Arc<dyn WidgetFactory> = Arc::new(Label("z"));
        let d = Widget::new(factory.clone());
        let e = Widget::new(factory);
        assert!(d.same_as(&e));
        assert!(!d.same_as(&d.clone().with_side(-1)));
    }

    #[test]
    fn test_element_classes_dedupe() {
        let mut el = Element::new("div");
        el.add_class("pm-math-mathjax");
        el.add_class("pm-math-mathjax");
        el.add_class("pm-math-inline");
        assert_eq!(el.classes().len(), 2);
        assert!(el.has_class("pm-math-inline"));
        assert!(el.on_click().is_none());
    }

    #[test]
    fn test_text_content_nested() {
        let mut inner = Element::new("span");
        inner.append_text("b");
        let mut outer = Element::new("div");
        outer.append_text("a");
        outer.append_child(inner);
        outer.append_text("c");
        assert_eq!(outer.text_content(), "abc");
    }
}
