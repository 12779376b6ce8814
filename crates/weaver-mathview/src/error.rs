//! Error types for the mathview crate.

use miette::Diagnostic;

/// Errors raised when a step or transaction cannot be applied to a document.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum TransformError {
    /// A position lies past the end of the document.
    #[error("position {pos} is outside the document (length {len})")]
    #[diagnostic(code(weaver::transform::out_of_range))]
    PositionOutOfRange { pos: usize, len: usize },

    /// A range whose start is after its end.
    #[error("invalid range {from}..{to}")]
    #[diagnostic(code(weaver::transform::invalid_range))]
    InvalidRange { from: usize, to: usize },

    /// Marks only apply to non-empty ranges.
    #[error("cannot apply a mark to an empty range at {pos}")]
    #[diagnostic(code(weaver::transform::empty_mark_range))]
    EmptyMarkRange { pos: usize },
}

/// Errors raised while loading plugin configuration.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum ConfigError {
    /// Host-supplied JSON did not match the config shape.
    #[error("invalid math view config: {0}")]
    #[diagnostic(code(weaver::math_view::config))]
    Json(#[from] serde_json::Error),

    /// A field that must not be empty was empty.
    #[error("math view config field `{0}` must not be empty")]
    #[diagnostic(code(weaver::math_view::config))]
    EmptyField(&'static str),
}
