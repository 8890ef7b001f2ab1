//! Compila LLM Provider Layer
//!
//! Pluggable providers for the external semantic classifier.
//!
//! # Architecture
//!
//! This crate provides implementations of the `LlmProvider` trait from
//! `compila-domain`, plus the request throttle shared by every caller of a
//! provider.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use compila_llm::MockProvider;
//! use compila_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("[]");
//! let result = provider.generate("test prompt").unwrap();
//! assert_eq!(result, "[]");
//! ```

#![warn(missing_docs)]

pub mod ollama;
pub mod rate_limit;

use compila_domain::traits::LlmProvider as LlmProviderTrait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

pub use ollama::OllamaProvider;
pub use rate_limit::RateLimiter;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

#[derive(Debug, Default)]
struct MockState {
    responses: HashMap<String, String>,
    containing: Vec<(String, String)>,
    failures_remaining: usize,
    call_count: usize,
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Lookup order: exact prompt, first registered substring rule, default.
///
/// # Examples
///
/// ```
/// use compila_llm::MockProvider;
/// use compila_domain::traits::LlmProvider;
///
/// // Simple fixed response
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(provider.generate("any prompt").unwrap(), "Fixed response");
///
/// // Responses selected by prompt content
/// let mut provider = MockProvider::default();
/// provider.add_response_containing("codice fiscale", "[1]");
/// assert_eq!(provider.generate("... codice fiscale ...").unwrap(), "[1]");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    state: Arc<Mutex<MockState>>,
    latency: Option<Duration>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            state: Arc::new(Mutex::new(MockState::default())),
            latency: None,
        }
    }

    /// Sleep this long inside every call (simulates a slow backend)
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.lock().responses.insert(prompt.into(), response.into());
    }

    /// Respond with `response` to any prompt containing `needle`
    pub fn add_response_containing(
        &mut self,
        needle: impl Into<String>,
        response: impl Into<String>,
    ) {
        self.lock().containing.push((needle.into(), response.into()));
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        self.lock()
            .responses
            .insert(prompt.into(), "ERROR".to_string());
    }

    /// Fail the next `count` calls with a communication error
    pub fn fail_next(&self, count: usize) {
        self.lock().failures_remaining = count;
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.lock().call_count
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        self.lock().call_count = 0;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A poisoned mock only means another test thread panicked mid-call.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn respond(&self, prompt: &str) -> Result<String, LlmError> {
        let response = {
            let mut state = self.lock();
            state.call_count += 1;

            if state.failures_remaining > 0 {
                state.failures_remaining -= 1;
                return Err(LlmError::Communication("Mock transport failure".to_string()));
            }

            state
                .responses
                .get(prompt)
                .cloned()
                .or_else(|| {
                    state
                        .containing
                        .iter()
                        .find(|(needle, _)| prompt.contains(needle.as_str()))
                        .map(|(_, response)| response.clone())
                })
                .unwrap_or_else(|| self.default_response.clone())
        };

        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }

        if response == "ERROR" {
            return Err(LlmError::Other("Mock error".to_string()));
        }
        Ok(response)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.respond(prompt)
    }

    fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, Self::Error> {
        self.respond(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate("any prompt");
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "Test response");
    }

    #[test]
    fn test_mock_provider_specific_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.generate("hello").unwrap(), "world");
        assert_eq!(provider.generate("foo").unwrap(), "bar");
        assert_eq!(provider.generate("unknown").unwrap(), "Default mock response");
    }

    #[test]
    fn test_mock_provider_containing_rules() {
        let mut provider = MockProvider::new("[]");
        provider.add_response_containing("first", "A");
        provider.add_response_containing("second", "B");

        assert_eq!(provider.generate("the first batch").unwrap(), "A");
        assert_eq!(provider.generate("the second batch").unwrap(), "B");
        assert_eq!(provider.generate("the third batch").unwrap(), "[]");
    }

    #[test]
    fn test_exact_response_wins_over_containing() {
        let mut provider = MockProvider::default();
        provider.add_response_containing("prompt", "contained");
        provider.add_response("prompt", "exact");

        assert_eq!(provider.generate("prompt").unwrap(), "exact");
    }

    #[test]
    fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");

        assert_eq!(provider.call_count(), 0);

        provider.generate("prompt1").unwrap();
        assert_eq!(provider.call_count(), 1);

        provider.generate("prompt2").unwrap();
        assert_eq!(provider.call_count(), 2);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");

        let result = provider.generate("bad prompt");
        assert!(matches!(result, Err(LlmError::Other(_))));
    }

    #[test]
    fn test_mock_provider_transient_failures() {
        let provider = MockProvider::new("ok");
        provider.fail_next(2);

        assert!(matches!(provider.generate("p"), Err(LlmError::Communication(_))));
        assert!(matches!(provider.generate("p"), Err(LlmError::Communication(_))));
        assert_eq!(provider.generate("p").unwrap(), "ok");
        assert_eq!(provider.call_count(), 3);
    }

    #[test]
    fn test_mock_provider_structured() {
        let provider = MockProvider::new("structured response");
        let result = provider.generate_structured("prompt", "schema");
        assert_eq!(result.unwrap(), "structured response");
    }

    #[test]
    fn test_mock_provider_clone() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.generate("test").unwrap();

        // Both should share the same call count due to Arc
        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
