//! Translator error type.
//!
//! Individual passes report recoverable problems as plain `Result<(), String>`
//! (the spec models rewrite errors as short message strings with no
//! exceptions); `TranslateError` is how [`TranslationContext`](crate::translator::TranslationContext)
//! labels those messages with the path/line they occurred at once it knows
//! them, for the two parse/rewrite error categories spec §7 names: a
//! malformed `#template` directive, and a rewrite failure (undeclared
//! identifier, pointer/value mismatch, unknown `delete` type). `au-translate`
//! performs no I/O itself, so there is no `Io` variant here — that belongs
//! to `au-build::error::BuildError`, which owns the paths it opens.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("{path}:{line}: error: {message}")]
    Rewrite {
        path: String,
        line: usize,
        message: String,
    },

    #[error("malformed #template directive at {path}:{line}: {detail}")]
    MalformedTemplate {
        path: String,
        line: usize,
        detail: String,
    },
}

pub type Result<T> = std::result::Result<T, TranslateError>;
