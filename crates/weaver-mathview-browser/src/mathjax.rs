//! MathJax bridge.
//!
//! MathJax scans elements for TeX-delimited math and replaces it with its own
//! rendering. The typesetter writes delimited source into the preview
//! container; once the container is in the DOM, `typeset_element` asks
//! MathJax to process it. Until MathJax finishes (or if it is not loaded)
//! the TeX source stays visible.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use weaver_mathview::{EditorView, Element, MathKind, SourceTypesetter, Typesetter};

use crate::dom::{MountedWidget, mount_element};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = MathJax, js_name = typesetPromise)]
    fn typeset_promise(elements: &js_sys::Array) -> Result<js_sys::Promise, JsValue>;
}

/// Class on containers MathJax has not processed yet.
pub const PENDING_CLASS: &str = "mathjax-pending";

#[derive(Debug, Clone, Copy, Default)]
pub struct MathJaxTypesetter;

impl Typesetter for MathJaxTypesetter {
    fn typeset(&self, container: &mut Element, text: &str, kind: MathKind) {
        container.add_class(PENDING_CLASS);
        SourceTypesetter.typeset(container, text, kind);
    }
}

/// Ask MathJax to typeset `element`.
pub fn typeset_element(element: &web_sys::Element) {
    let targets = js_sys::Array::of1(element);
    match typeset_promise(&targets) {
        Ok(promise) => {
            let element = element.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match JsFuture::from(promise).await {
                    Ok(_) => {
                        if let Err(err) = element.class_list().remove_1(PENDING_CLASS) {
                            tracing::warn!(
                                target: "weaver::math_view",
                                ?err,
                                "cannot clear pending class after typesetting"
                            );
                        }
                    }
                    Err(err) => {
                        tracing::warn!(target: "weaver::math_view", ?err, "MathJax typeset failed");
                    }
                }
            });
        }
        Err(err) => {
            tracing::warn!(
                target: "weaver::math_view",
                ?err,
                "MathJax not available, leaving TeX source"
            );
        }
    }
}

/// Mount a preview element and typeset it if it came from `MathJaxTypesetter`.
pub fn mount_math_widget(
    document: &web_sys::Document,
    element: &Element,
    view: Rc<RefCell<dyn EditorView>>,
) -> Result<MountedWidget, JsValue> {
    let mounted = mount_element(document, element, view)?;
    if element.has_class(PENDING_CLASS) {
        typeset_element(mounted.element());
    }
    Ok(mounted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typesetter_marks_pending() {
        let mut el = Element::new("div");
        MathJaxTypesetter.typeset(&mut el, "$x$", MathKind::Inline);
        assert!(el.has_class(PENDING_CLASS));
        assert_eq!(el.text_content(), "\\(x\\)");
    }
}
