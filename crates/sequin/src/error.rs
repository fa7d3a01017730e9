//! Error types for Sequin operations.
//!
//! This module provides the main error type [`SequinError`] which wraps
//! the error conditions that can occur while parsing, laying out and
//! exporting a diagram.

use std::io;

use thiserror::Error;

use sequin_parser::error::ParseError;

/// The main error type for Sequin operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text next to the structured
/// [`ParseError`], so callers can render labelled snippets.
#[derive(Debug, Error)]
pub enum SequinError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),
}

impl From<crate::export::Error> for SequinError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl SequinError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
