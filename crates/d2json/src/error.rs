//! Error types for d2json operations.
//!
//! [`D2JsonError`] wraps everything that can go wrong outside the layout core:
//! reading input, parsing D2, external layout engines and JSON encoding. The
//! ordering, tier planning and merge steps never fail.

use std::io;

use thiserror::Error;

use d2json_parser::ParseError;

/// The main error type for d2json operations.
///
/// The `Parse` variant keeps the source text next to the diagnostics so that
/// a front end can render labelled snippets.
#[derive(Debug, Error)]
pub enum D2JsonError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl D2JsonError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
