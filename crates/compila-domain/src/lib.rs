//! Compila Domain Layer
//!
//! This crate contains the data model shared by every stage of the template
//! compilation pipeline. It has ZERO external dependencies (per ADR-004) and
//! defines the value objects and trait interfaces the other crates depend upon.
//!
//! ## Key Concepts
//!
//! - **Pattern**: a blank marker detected in the raw document text
//! - **FieldMapping**: the decision taken for one pattern (compile a value or skip)
//! - **ProfileData**: read-only key/value data supplied by the caller
//! - **ValidationReport**: blocking errors and advisory warnings
//! - **CompilationResult**: the rewritten document body plus counters
//!
//! ## Lifecycle
//!
//! Patterns and mappings are created fresh for every compilation request and
//! carry no identity beyond it. Profile data is owned by the caller.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod confidence;
pub mod mapping;
pub mod pattern;
pub mod profile;
pub mod report;
pub mod traits;

// Re-exports for convenience
pub use confidence::Confidence;
pub use mapping::{FieldMapping, MappingDecision, MappingSource};
pub use pattern::{Pattern, PatternType};
pub use profile::ProfileData;
pub use report::{CompilationResult, ValidationReport};
