//! Configuration for the Compiler

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest batch the external classifier accepts
pub const MAX_BATCH_SIZE: usize = 80;

/// Configuration for the Compiler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Maximum input text length (bytes)
    pub max_text_length: usize,

    /// Characters of context captured on each side of a marker
    pub context_window_chars: usize,

    /// Characters of context sent to the classifier per side
    pub prompt_context_chars: usize,

    /// Send unresolved markers to the external classifier
    pub classifier_enabled: bool,

    /// Patterns per classifier request (at most `MAX_BATCH_SIZE`)
    pub batch_size: usize,

    /// Batches awaited concurrently; dispatch is still rate limited
    pub max_concurrent_batches: usize,

    /// Minimum spacing between classifier requests (milliseconds)
    pub min_request_interval_ms: u64,

    /// Maximum time for a single classifier call (milliseconds)
    pub batch_timeout_ms: u64,

    /// Attempts per batch, first call included
    pub max_attempts: u32,

    /// Initial retry delay, doubled on every further attempt (milliseconds)
    pub backoff_base_ms: u64,
}

impl CompilerConfig {
    /// Get the batch timeout as a Duration
    pub fn batch_timeout(&self) -> Duration {
        Duration::from_millis(self.batch_timeout_ms)
    }

    /// Get the request interval as a Duration
    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    /// Delay before retry number `retry` (1-based)
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let factor = 2u64.saturating_pow(retry.saturating_sub(1));
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.context_window_chars == 0 {
            return Err("context_window_chars must be greater than 0".to_string());
        }
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(format!("batch_size must be between 1 and {}", MAX_BATCH_SIZE));
        }
        if self.max_concurrent_batches == 0 {
            return Err("max_concurrent_batches must be greater than 0".to_string());
        }
        if self.batch_timeout_ms == 0 {
            return Err("batch_timeout_ms must be greater than 0".to_string());
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for CompilerConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_text_length: 2_000_000,
            context_window_chars: 150,
            prompt_context_chars: 100,
            classifier_enabled: true,
            batch_size: 40,
            max_concurrent_batches: 2,
            min_request_interval_ms: 1_000,
            batch_timeout_ms: 60_000,
            max_attempts: 3,
            backoff_base_ms: 1_000,
        }
    }
}

impl CompilerConfig {
    /// Aggressive preset: large batches, short timeouts, fewer retries
    pub fn aggressive() -> Self {
        Self {
            batch_size: MAX_BATCH_SIZE,
            max_concurrent_batches: 4,
            min_request_interval_ms: 250,
            batch_timeout_ms: 30_000,
            max_attempts: 2,
            backoff_base_ms: 500,
            ..Self::default()
        }
    }

    /// Lenient preset: small batches, long timeouts, patient retries
    pub fn lenient() -> Self {
        Self {
            context_window_chars: 200,
            prompt_context_chars: 150,
            batch_size: 20,
            max_concurrent_batches: 1,
            min_request_interval_ms: 2_000,
            batch_timeout_ms: 180_000,
            max_attempts: 5,
            backoff_base_ms: 2_000,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
