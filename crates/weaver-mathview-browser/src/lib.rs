//! Browser DOM layer for weaver math previews.
//!
//! This crate turns the widget elements produced by `weaver-mathview` into
//! real DOM nodes and hands them to MathJax. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `dom`: builds `web_sys` nodes from widget `Element`s and wires click handlers
//! - `mathjax`: `Typesetter` that emits TeX for MathJax, plus the typeset call
//!
//! # Re-exports
//!
//! This crate re-exports `weaver-mathview` for convenience, so consumers
//! only need to depend on `weaver-mathview-browser`.

pub use weaver_mathview;
pub use weaver_mathview::*;

pub mod dom;
pub mod mathjax;

pub use dom::{MountedWidget, mount_element};
pub use mathjax::{MathJaxTypesetter, mount_math_widget, typeset_element};
