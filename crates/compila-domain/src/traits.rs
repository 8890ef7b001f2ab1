//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

/// Trait for the external semantic classifier (an LLM behind some transport)
///
/// Implemented by the infrastructure layer (compila-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate text completion
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Generate with structured output (if supported)
    ///
    /// Implementations should honour whatever determinism control the
    /// backend offers, since the same input should yield the same mapping.
    fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error>;
}
