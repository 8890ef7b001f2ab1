//! Batch client for the external semantic classifier

use crate::config::{CompilerConfig, MAX_BATCH_SIZE};
use crate::error::ExtractorError;
use crate::parser::parse_classifier_response;
use crate::prompt::{PromptBuilder, RESPONSE_SCHEMA};
use crate::types::{ClassificationCandidate, ClassificationOutcome};
use compila_domain::profile::is_placeholder;
use compila_domain::traits::LlmProvider;
use compila_domain::{FieldMapping, MappingSource, Pattern, ProfileData};
use compila_llm::RateLimiter;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How one batch ended
enum BatchOutcome {
    Classified(Vec<FieldMapping>),
    Failed(Vec<FieldMapping>),
    Cancelled(Vec<FieldMapping>),
}

/// Classifies unresolved patterns in fixed-size batches
///
/// Every call passes through the shared [`RateLimiter`]. Transport errors and
/// timeouts are retried with exponential backoff; unreadable responses are
/// not. A batch that still fails yields skip mappings flagged for review, so
/// one bad batch never affects the others.
pub struct BatchClassifier<L>
where
    L: LlmProvider,
{
    provider: Arc<L>,
    rate_limiter: Arc<RateLimiter>,
    config: CompilerConfig,
}

impl<L> BatchClassifier<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create a classifier with its own rate limiter built from `config`
    pub fn new(provider: Arc<L>, config: CompilerConfig) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(config.min_request_interval()));
        Self {
            provider,
            rate_limiter,
            config,
        }
    }

    /// Share an existing rate limiter
    pub fn with_rate_limiter(mut self, rate_limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    /// The limiter gating every call
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    /// Classify `patterns`, returning one mapping per pattern in input order
    pub async fn classify(&self, patterns: &[Pattern], profile: &ProfileData) -> Vec<FieldMapping> {
        self.classify_with_cancel(patterns, profile, &CancellationToken::new())
            .await
            .mappings
    }

    /// Classify `patterns`, stopping dispatch when `cancel` fires
    ///
    /// Batches already waiting on the classifier complete normally. Batches
    /// (and retries) not yet dispatched are skipped and their patterns come
    /// back flagged for review.
    pub async fn classify_with_cancel(
        &self,
        patterns: &[Pattern],
        profile: &ProfileData,
        cancel: &CancellationToken,
    ) -> ClassificationOutcome {
        let mut outcome = ClassificationOutcome::default();
        if patterns.is_empty() {
            return outcome;
        }

        let batch_size = self.config.batch_size.clamp(1, MAX_BATCH_SIZE);
        let concurrency = self.config.max_concurrent_batches.max(1);
        let batch_count = patterns.len().div_ceil(batch_size);

        info!(
            "Classifying {} patterns in {} batches (size {}, concurrency {})",
            patterns.len(),
            batch_count,
            batch_size,
            concurrency
        );

        let results: Vec<BatchOutcome> = stream::iter(patterns.chunks(batch_size).enumerate())
            .map(|(number, batch)| self.classify_batch(number, batch, profile, cancel))
            .buffered(concurrency)
            .collect()
            .await;

        for result in results {
            match result {
                BatchOutcome::Classified(mappings) => outcome.mappings.extend(mappings),
                BatchOutcome::Failed(mappings) => {
                    outcome.failed_batches += 1;
                    outcome.mappings.extend(mappings);
                }
                BatchOutcome::Cancelled(mappings) => {
                    outcome.cancelled_batches += 1;
                    outcome.mappings.extend(mappings);
                }
            }
        }

        info!(
            "Classification complete: {} batches ok, {} failed, {} cancelled",
            batch_count - outcome.failed_batches - outcome.cancelled_batches,
            outcome.failed_batches,
            outcome.cancelled_batches
        );
        outcome
    }

    /// Classify one batch with retries
    async fn classify_batch(
        &self,
        number: usize,
        batch: &[Pattern],
        profile: &ProfileData,
        cancel: &CancellationToken,
    ) -> BatchOutcome {
        let prompt = match PromptBuilder::new(batch, profile)
            .with_context_chars(self.config.prompt_context_chars)
            .build()
        {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!("Batch {}: could not build prompt: {}", number, e);
                return BatchOutcome::Failed(unclassified(batch));
            }
        };

        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;

            if cancel.is_cancelled() {
                debug!("Batch {}: cancelled before dispatch", number);
                return BatchOutcome::Cancelled(unclassified(batch));
            }
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Batch {}: cancelled while rate limited", number);
                    return BatchOutcome::Cancelled(unclassified(batch));
                }
                _ = self.rate_limiter.acquire() => {}
            }

            debug!(
                "Batch {}: attempt {} of {} ({} patterns)",
                number,
                attempt,
                max_attempts,
                batch.len()
            );

            let error = match self.call_llm(&prompt).await {
                Ok(response) => match parse_classifier_response(&response, batch.len()) {
                    Ok(candidates) => {
                        return BatchOutcome::Classified(to_mappings(batch, candidates, profile));
                    }
                    Err(e) => e,
                },
                Err(e) => e,
            };

            if !error.is_transient() || attempt >= max_attempts {
                warn!(
                    "Batch {}: classification failed after {} attempt(s): {}",
                    number, attempt, error
                );
                return BatchOutcome::Failed(unclassified(batch));
            }

            let delay = self.config.backoff_delay(attempt);
            warn!("Batch {}: {}; retrying in {:?}", number, error, delay);
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Batch {}: cancelled during backoff", number);
                    return BatchOutcome::Cancelled(unclassified(batch));
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Call the provider off the async executor, bounded by the batch timeout
    ///
    /// A blocking call cannot be aborted: when the timeout fires the call
    /// keeps running on the blocking pool and its result is dropped, so a
    /// retry may overlap it. Providers that talk to a service should carry
    /// their own request timeout no longer than `batch_timeout_ms`
    /// (`OllamaProvider::with_timeout`).
    async fn call_llm(&self, prompt: &str) -> Result<String, ExtractorError> {
        let provider = Arc::clone(&self.provider);
        let prompt = prompt.to_string();

        // Call in a blocking context since LlmProvider is not async
        let call = tokio::task::spawn_blocking(move || {
            provider
                .generate_structured(&prompt, RESPONSE_SCHEMA)
                .map_err(|e| ExtractorError::Llm(e.to_string()))
        });

        timeout(self.config.batch_timeout(), call)
            .await
            .map_err(|_| ExtractorError::Timeout)?
            .map_err(|e| ExtractorError::Llm(format!("Task join error: {}", e)))?
    }
}

fn unclassified(batch: &[Pattern]) -> Vec<FieldMapping> {
    batch
        .iter()
        .map(|p| FieldMapping::unclassified(p.index))
        .collect()
}

/// Turn parsed candidates into mappings, filling blank values from the profile
fn to_mappings(
    batch: &[Pattern],
    candidates: Vec<ClassificationCandidate>,
    profile: &ProfileData,
) -> Vec<FieldMapping> {
    batch
        .iter()
        .zip(candidates)
        .map(|(pattern, candidate)| {
            if !candidate.compile {
                return FieldMapping::skip(
                    pattern.index,
                    candidate.field_key,
                    candidate.confidence,
                    MappingSource::Classifier,
                );
            }

            let value = if is_placeholder(&candidate.value) {
                candidate
                    .field_key
                    .as_deref()
                    .and_then(|key| profile.get(key))
                    .unwrap_or_default()
                    .to_string()
            } else {
                candidate.value
            };

            FieldMapping::compile(
                pattern.index,
                candidate.field_key,
                value,
                candidate.confidence,
                MappingSource::Classifier,
            )
        })
        .collect()
}
