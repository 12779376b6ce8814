//! Typesetting engine interface.
//!
//! The engine is a black box: it fills a container element with a rendering
//! of some math source. Engines that lay out asynchronously (MathJax) may
//! finish later, but `typeset` itself returns immediately and never fails.

use crate::mark::{Mark, MarkType};
use crate::widget::Element;

/// Inline (`$..$`) or display (`$$..$$`) math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MathKind {
    #[default]
    Inline,
    Display,
}

impl MathKind {
    /// Mark attribute holding the kind.
    pub const ATTR: &'static str = "type";

    pub fn attr_value(self) -> &'static str {
        match self {
            MathKind::Inline => "InlineMath",
            MathKind::Display => "DisplayMath",
        }
    }

    /// Kind recorded on a math mark. Marks without the attribute are inline.
    pub fn from_mark(mark: &Mark) -> Self {
        match mark.attr(Self::ATTR) {
            Some("DisplayMath") => MathKind::Display,
            _ => MathKind::Inline,
        }
    }

    /// A math mark of this kind.
    pub fn mark(self) -> Mark {
        Mark::new(MarkType::MATH).with_attr(Self::ATTR, self.attr_value())
    }

    /// Delimiter used in document source.
    pub fn source_delimiter(self) -> &'static str {
        match self {
            MathKind::Inline => "$",
            MathKind::Display => "$$",
        }
    }

    /// TeX delimiters understood by typesetting engines.
    pub fn tex_delimiters(self) -> (&'static str, &'static str) {
        match self {
            MathKind::Inline => ("\\(", "\\)"),
            MathKind::Display => ("\\[", "\\]"),
        }
    }

    /// Extra class on preview containers.
    pub fn class(self) -> &'static str {
        match self {
            MathKind::Inline => "pm-math-inline",
            MathKind::Display => "pm-math-display",
        }
    }
}

/// Strip the source delimiters from marked math text, if present on both ends.
pub fn strip_delimiters(text: &str, kind: MathKind) -> &str {
    let delim = kind.source_delimiter();
    if text.len() >= delim.len() * 2 && text.starts_with(delim) && text.ends_with(delim) {
        &text[delim.len()..text.len() - delim.len()]
    } else {
        text
    }
}

/// Renders math source into a container.
pub trait Typesetter: Send + Sync {
    fn typeset(&self, container: &mut Element, text: &str, kind: MathKind);
}

/// Writes the math as TeX-delimited source.
///
/// Used when no engine is available, and as the input format for engines
/// that scan the page for delimited math.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceTypesetter;

impl Typesetter for SourceTypesetter {
    fn typeset(&self, container: &mut Element, text: &str, kind: MathKind) {
        let (open, close) = kind.tex_delimiters();
        let body = strip_delimiters(text, kind);
        container.set_attribute("data-math", kind.attr_value());
        container.append_text(format!("{open}{body}{close}"));
    }
}
