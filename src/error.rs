//! Error types for thread reconstruction

use crate::normalize::Pass;
use thiserror::Error;

/// Errors that can occur while rebuilding a thread
///
/// Unrecognized markup and unparseable header fields are never errors: they
/// degrade to body text or absent fields. Only the conditions below surface.
#[derive(Error, Debug)]
pub enum ParseError {
    /// A tree rewrite kept changing the document past its iteration ceiling
    #[error("Normalizer pass `{pass}` did not converge within {limit} iterations")]
    NotConverged { pass: Pass, limit: usize },

    /// The caller handed over blank markup
    #[error("Document is empty")]
    EmptyDocument,

    /// Failed to render a thread as JSON
    #[error("Failed to serialize thread: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for thread parsing operations
pub type Result<T> = std::result::Result<T, ParseError>;
