//! Fatal error taxonomy.
//!
//! There are no recoverable parse errors: unmatched Markdown constructs
//! degrade to literal text. The variants here are configuration or
//! extension failures that are deterministic for a given input and
//! parser setup.

use thiserror::Error;

/// Errors surfaced by parsing, rendering, or directive dispatch.
#[derive(Debug, Error)]
pub enum Error {
    /// A token kind reached the renderer with no registered method.
    #[error("no renderer method registered for token type `{0}`")]
    RendererMissingMethod(String),

    /// A directive envelope named a directive with no registered handler.
    #[error("directive `{0}` is not registered")]
    DirectiveNotRegistered(String),

    /// A handler rejected a directive it could not repair.
    #[error("malformed `{name}` directive: {reason}")]
    DirectiveMalformed {
        /// Directive name as written in the source.
        name: String,
        /// Handler-supplied description of the problem.
        reason: String,
    },

    /// The include resolver could not produce the referenced source.
    #[error("include of `{path}` failed: {reason}")]
    IncludeFailed {
        /// Path as written in the directive.
        path: String,
        /// Resolver-supplied description of the failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = Error::RendererMissingMethod("wavy_underline".into());
        assert!(err.to_string().contains("wavy_underline"));

        let err = Error::DirectiveNotRegistered("spoiler".into());
        assert!(err.to_string().contains("spoiler"));
    }
}
