//! Typesetting error types.
//!
//! These represent failures inside a typesetting collaborator. The layout
//! never fails on them: the failure render is displayed instead.

use thiserror::Error;

/// Errors a typesetter can report for one piece of option text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesetError {
    /// A command that takes arguments was not followed by one.
    #[error("missing argument for \\{command}")]
    MissingArgument { command: String },

    /// A `{` without a matching `}` (or the reverse).
    #[error("unbalanced braces in: {0}")]
    UnbalancedBraces(String),

    /// Groups or arguments nested deeper than the parser follows.
    #[error("math nested deeper than {limit} levels")]
    TooDeep { limit: usize },

    /// The collaborator gave up for its own reasons.
    #[error("typesetter failed: {0}")]
    Backend(String),
}

impl TypesetError {
    /// Returns `true` if the error comes from the markup itself rather than
    /// the collaborator.
    pub fn is_markup_error(&self) -> bool {
        matches!(
            self,
            TypesetError::MissingArgument { .. }
                | TypesetError::UnbalancedBraces(_)
                | TypesetError::TooDeep { .. }
        )
    }
}
