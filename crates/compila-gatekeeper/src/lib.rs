//! Compila Gatekeeper
//!
//! Checks a list of field mappings before the document is recompiled.
//!
//! The Gatekeeper provides:
//! - Required-field coverage (blocking errors)
//! - Low-confidence detection (warnings)
//! - "Field known, data missing" detection (warnings)
//!
//! Validation never fails: every problem becomes a line in the report and the
//! caller decides whether to proceed.
//!
//! # Examples
//!
//! ```
//! use compila_domain::{FieldMapping, MappingSource};
//! use compila_gatekeeper::Gatekeeper;
//!
//! let mappings = vec![FieldMapping::compile(
//!     0, Some("nome".to_string()), "Mario", 0.9, MappingSource::Deterministic,
//! )];
//! let report = Gatekeeper::default_config().validate(&mappings, &["nome"]);
//! assert!(report.is_ok());
//! ```

#![warn(missing_docs)]

mod config;
mod validator;

pub use config::ValidationConfig;
pub use validator::{validate, Gatekeeper};
