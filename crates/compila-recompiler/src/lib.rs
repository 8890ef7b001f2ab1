//! Compila Recompiler
//!
//! Writes accepted field mappings back into the serialized document body.
//!
//! # Architecture
//!
//! ```text
//! serialized body + patterns + mappings → Recompiler → CompilationResult
//! ```
//!
//! Substitutions run from the end of the document toward the beginning, so a
//! value of a different length than its marker never moves a marker that is
//! still waiting to be replaced. Each marker is searched literally in the
//! part of the body that precedes the previous substitution site.
//!
//! Only malformed input (mismatched pattern and mapping lists) is an error.
//! A marker that cannot be located is counted, never fatal.
//!
//! # Example Usage
//!
//! ```
//! use compila_domain::{FieldMapping, MappingSource, Pattern, PatternType};
//! use compila_recompiler::{BodyFormat, Recompiler};
//!
//! let body = "AAA____BBB____CCC";
//! let patterns = vec![
//!     Pattern::new(3, PatternType::UnderscoreRun, "____"),
//!     Pattern::new(10, PatternType::UnderscoreRun, "____"),
//! ];
//! let mappings = vec![
//!     FieldMapping::compile(3, None, "X", 0.9, MappingSource::Deterministic),
//!     FieldMapping::compile(10, None, "YY", 0.9, MappingSource::Deterministic),
//! ];
//!
//! let result = Recompiler::new(BodyFormat::PlainText)
//!     .recompile(body, &patterns, &mappings)
//!     .unwrap();
//! assert_eq!(result.body, "AAAXBBBYYCCC");
//! ```

#![warn(missing_docs)]

mod error;
mod escape;
mod recompiler;

pub use error::RecompileError;
pub use escape::{escape_markup, BodyFormat};
pub use recompiler::{recompile, Recompiler};
