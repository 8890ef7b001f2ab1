//! Compila Extractor
//!
//! Finds the blanks of a document template and decides what goes in each.
//!
//! # Overview
//!
//! Legal and administrative forms mark their fill-in fields with runs of
//! underscores, dots or dashes, bracketed ellipses and template tokens. The
//! Compiler detects those markers, infers what each one asks for, resolves
//! it against a profile and rewrites the serialized document.
//!
//! # Architecture
//!
//! ```text
//! Text → PatternExtractor → LabelInferencer → FieldResolver
//!                                                 │ unresolved
//!                                                 ▼
//!                                          BatchClassifier → LLM
//!                                                 │
//!                       Gatekeeper ← mappings ────┘
//!                           │
//!                           ▼
//!                      Recompiler → rewritten body
//! ```
//!
//! # Key Features
//!
//! - **Marker detection**: eight marker shapes, deterministic, byte offsets
//! - **Label inference**: ordered, pluggable `LabelStrategy` list
//! - **Deterministic resolution**: synonym dictionary, exact beats substring
//! - **Batch classification**: rate limited, retried, cancellable, with
//!   per-batch fault isolation
//! - **Safe recompilation**: reverse-order literal substitution with escaping
//!
//! # Example Usage
//!
//! ```no_run
//! use compila_extractor::{Compiler, CompilerConfig, CompilationRequest};
//! use compila_domain::ProfileData;
//! use compila_gatekeeper::Gatekeeper;
//! use compila_llm::MockProvider;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let compiler = Compiler::new(
//!     MockProvider::new("[]"),
//!     Gatekeeper::default_config(),
//!     CompilerConfig::default(),
//! )?;
//!
//! let request = CompilationRequest {
//!     text: "Il sottoscritto _____, C.F. _____".to_string(),
//!     profile: ProfileData::new()
//!         .with("nome_completo", "Mario Rossi")
//!         .with("codice_fiscale", "RSSMRA80A01H501U"),
//!     ..CompilationRequest::default()
//! };
//!
//! let outcome = compiler.compile(request, &CancellationToken::new()).await?;
//!
//! println!("{}", outcome.summary);
//! if let Some(result) = outcome.result {
//!     println!("{}", result.body);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod classifier;
mod compiler;
mod config;
mod error;
mod parser;
mod prompt;
mod types;

pub mod dictionary;
pub mod labels;
pub mod patterns;
pub mod resolver;


pub use classifier::BatchClassifier;
pub use compiler::Compiler;
pub use config::{CompilerConfig, MAX_BATCH_SIZE};
pub use error::ExtractorError;
pub use labels::{LabelInferencer, LabelStrategy};
pub use patterns::{extract_patterns, PatternExtractor};
pub use prompt::{PromptBuilder, RESPONSE_SCHEMA};
pub use resolver::{resolve_deterministic, FieldResolver};
pub use types::{
    Analysis, ClassificationOutcome, CompilationOutcome, CompilationRequest, CompilationSummary,
    FieldHint, Resolution,
};
