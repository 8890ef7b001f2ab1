//! Error types for the Recompiler

use thiserror::Error;

/// Input-shape errors
///
/// These indicate a programmer error in the caller, not a problem with the
/// document content.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecompileError {
    /// Pattern and mapping lists differ in length
    #[error("Length mismatch: {patterns} patterns but {mappings} mappings")]
    LengthMismatch {
        /// Number of patterns
        patterns: usize,
        /// Number of mappings
        mappings: usize,
    },

    /// Two patterns share the same start offset
    #[error("Duplicate pattern at offset {0}")]
    DuplicatePattern(usize),

    /// A mapping references an offset no pattern starts at
    #[error("Mapping references unknown pattern at offset {0}")]
    UnknownPattern(usize),

    /// Two mappings resolve the same pattern
    #[error("Pattern at offset {0} has more than one mapping")]
    DuplicateMapping(usize),
}
