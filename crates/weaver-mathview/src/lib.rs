//! weaver-mathview: live math preview for the weaver editor.
//!
//! This crate provides:
//! - a small editor state model: `Document` (rope text + mark spans),
//!   `Step`, `Mapping`, `Transaction`, `EditorState`
//! - view-only decorations: `Decoration`, `DecorationSet`, lazily rendered `Widget`s
//! - `MathViewPlugin`, which hides math source and shows a typeset preview
//!   whenever the cursor is outside the math
//! - `HeadlessView`, a host that runs a plugin without a UI toolkit

pub mod config;
pub mod decoration;
pub mod document;
pub mod error;
pub mod mapping;
pub mod mark;
pub mod math_view;
pub mod plugin;
pub mod state;
pub mod step;
pub mod text;
pub mod transaction;
pub mod typeset;
pub mod types;
pub mod view;
pub mod widget;

pub use smol_str::SmolStr;

pub use config::MathViewConfig;
pub use decoration::{Decoration, DecorationKind, DecorationSet, InlineAttrs};
pub use document::{Document, TextNode};
pub use error::{ConfigError, TransformError};
pub use mapping::{Assoc, MapResult, Mapping, StepMap};
pub use mark::{Mark, MarkSet, MarkSpan, MarkType};
pub use math_view::MathViewPlugin;
pub use plugin::{DecorationProvider, PluginKey, StateField};
pub use state::EditorState;
pub use step::Step;
pub use text::{EditorRope, TextBuffer};
pub use transaction::Transaction;
pub use typeset::{MathKind, SourceTypesetter, Typesetter, strip_delimiters};
pub use types::Selection;
pub use view::{EditorView, HeadlessView};
pub use widget::{ClickHandler, Element, GetPos, Node, Widget, WidgetFactory};
