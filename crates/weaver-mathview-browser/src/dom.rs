//! Building DOM nodes from widget elements.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use wasm_bindgen::JsValue;
use weaver_mathview::{EditorView, Element, Node};

/// A widget element attached to the DOM.
///
/// Owns the click listeners; dropping it detaches them.
pub struct MountedWidget {
    element: web_sys::Element,
    _listeners: Vec<EventListener>,
}

impl MountedWidget {
    pub fn element(&self) -> &web_sys::Element {
        &self.element
    }
}

/// Build the DOM subtree for `element`.
///
/// Click handlers run against `view`. A click that arrives while the view
/// is already borrowed (mid-update) is dropped.
pub fn mount_element(
    document: &web_sys::Document,
    element: &Element,
    view: Rc<RefCell<dyn EditorView>>,
) -> Result<MountedWidget, JsValue> {
    let mut listeners = Vec::new();
    let node = build(document, element, &view, &mut listeners)?;
    Ok(MountedWidget {
        element: node,
        _listeners: listeners,
    })
}

fn build(
    document: &web_sys::Document,
    element: &Element,
    view: &Rc<RefCell<dyn EditorView>>,
    listeners: &mut Vec<EventListener>,
) -> Result<web_sys::Element, JsValue> {
    let node = document.create_element(element.tag())?;

    let class_list = node.class_list();
    for class in element.classes() {
        class_list.add_1(class)?;
    }
    if let Some(style) = element.style() {
        node.set_attribute("style", style)?;
    }
    for (name, value) in element.attributes() {
        node.set_attribute(name, value)?;
    }

    for child in element.children() {
        match child {
            Node::Text(text) => {
                let text = document.create_text_node(text);
                node.append_child(&text)?;
            }
            Node::Element(child) => {
                let child = build(document, child, view, listeners)?;
                node.append_child(&child)?;
            }
        }
    }

    if let Some(handler) = element.on_click() {
        let handler = handler.clone();
        let view = view.clone();
        listeners.push(EventListener::new(&node, "click", move |_event| {
            match view.try_borrow_mut() {
                Ok(mut view) => handler(&mut *view),
                Err(_) => {
                    tracing::warn!(
                        target: "weaver::math_view",
                        "view busy, dropping preview click"
                    );
                }
            }
        }));
    }

    Ok(node)
}
