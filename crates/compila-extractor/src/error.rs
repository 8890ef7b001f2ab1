//! Error types for the Compiler

use compila_recompiler::RecompileError;
use thiserror::Error;

/// Errors that can occur while compiling a document
///
/// Only configuration and input-shape problems surface through `Result`.
/// Classifier failures are recoverable and degrade to flagged mappings.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Text exceeds maximum length
    #[error("Text too long: {0} chars (max: {1})")]
    TextTooLong(usize, usize),

    /// A classifier call exceeded its timeout
    #[error("Classification timeout")]
    Timeout,

    /// Classifier response could not be read as the expected JSON array
    #[error("Invalid classifier response: {0}")]
    InvalidFormat(String),

    /// Classifier answered with the wrong number of items
    #[error("Classifier returned {actual} items for a batch of {expected}")]
    LengthMismatch {
        /// Patterns in the batch
        expected: usize,
        /// Items in the response
        actual: usize,
    },

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Mappings and patterns do not fit together
    #[error("Recompilation input error: {0}")]
    Recompile(#[from] RecompileError),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}

impl ExtractorError {
    /// Whether the failed call may be retried
    pub fn is_transient(&self) -> bool {
        matches!(self, ExtractorError::Llm(_) | ExtractorError::Timeout)
    }
}
