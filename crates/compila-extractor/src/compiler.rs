//! Core Compiler implementation

use crate::classifier::BatchClassifier;
use crate::config::CompilerConfig;
use crate::error::ExtractorError;
use crate::patterns::PatternExtractor;
use crate::resolver::FieldResolver;
use crate::types::{
    Analysis, ClassificationOutcome, CompilationOutcome, CompilationRequest, CompilationSummary,
    FieldHint,
};
use compila_domain::traits::LlmProvider;
use compila_domain::{CompilationResult, FieldMapping, MappingSource, Pattern};
use compila_gatekeeper::Gatekeeper;
use compila_llm::RateLimiter;
use compila_recompiler::{BodyFormat, Recompiler};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// The Compiler fills the blanks of a document from a profile
///
/// Stages run in order: marker extraction, deterministic resolution, batch
/// classification of what is left, validation and finally recompilation of
/// the serialized body.
pub struct Compiler<L>
where
    L: LlmProvider,
{
    extractor: PatternExtractor,
    resolver: FieldResolver,
    classifier: BatchClassifier<L>,
    gatekeeper: Gatekeeper,
    body_format: BodyFormat,
    overrides: BTreeMap<usize, String>,
    config: CompilerConfig,
}

impl<L> Compiler<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create a new Compiler
    ///
    /// # Errors
    ///
    /// Returns `ExtractorError::Config` when `config` fails validation.
    pub fn new(
        llm_provider: L,
        gatekeeper: Gatekeeper,
        config: CompilerConfig,
    ) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;

        Ok(Self {
            extractor: PatternExtractor::new(config.context_window_chars),
            resolver: FieldResolver::new(),
            classifier: BatchClassifier::new(Arc::new(llm_provider), config.clone()),
            gatekeeper,
            body_format: BodyFormat::default(),
            overrides: BTreeMap::new(),
            config,
        })
    }

    /// Share a rate limiter with other classifier clients
    pub fn with_rate_limiter(mut self, rate_limiter: Arc<RateLimiter>) -> Self {
        self.classifier = self.classifier.with_rate_limiter(rate_limiter);
        self
    }

    /// Set the format of bodies passed in `CompilationRequest::body`
    pub fn with_body_format(mut self, body_format: BodyFormat) -> Self {
        self.body_format = body_format;
        self
    }

    /// Force values for specific markers, keyed by pattern index
    pub fn with_overrides(mut self, overrides: BTreeMap<usize, String>) -> Self {
        self.overrides = overrides;
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Detect and label markers without resolving them
    pub fn scan(&self, text: &str) -> Vec<Pattern> {
        self.extractor.extract(text)
    }

    /// Run every stage except recompilation
    pub async fn analyze(
        &self,
        request: &CompilationRequest,
        cancel: &CancellationToken,
    ) -> Result<Analysis, ExtractorError> {
        if request.text.len() > self.config.max_text_length {
            return Err(ExtractorError::TextTooLong(
                request.text.len(),
                self.config.max_text_length,
            ));
        }

        let patterns = self.extractor.extract(&request.text);
        info!(
            "Found {} markers in {} bytes of text",
            patterns.len(),
            request.text.len()
        );

        let resolution = self.resolver.resolve(&patterns, &request.profile);

        let outcome = if resolution.unresolved.is_empty() {
            ClassificationOutcome::default()
        } else if self.config.classifier_enabled {
            self.classifier
                .classify_with_cancel(&resolution.unresolved, &request.profile, cancel)
                .await
        } else {
            info!(
                "Classifier disabled, {} markers left for review",
                resolution.unresolved.len()
            );
            ClassificationOutcome {
                mappings: resolution
                    .unresolved
                    .iter()
                    .map(|p| FieldMapping::unclassified(p.index))
                    .collect(),
                ..ClassificationOutcome::default()
            }
        };

        let mut by_index: BTreeMap<usize, FieldMapping> = resolution
            .mapped
            .into_iter()
            .map(|m| (m.pattern_index, m))
            .collect();

        for mapping in outcome.mappings {
            let mapping = match resolution.hints.get(&mapping.pattern_index) {
                Some(hint) => apply_hint(mapping, hint),
                None => mapping,
            };
            by_index.insert(mapping.pattern_index, mapping);
        }

        for (index, value) in &self.overrides {
            match by_index.get_mut(index) {
                Some(mapping) => {
                    let field_key = mapping.field_key.take();
                    let mut manual = FieldMapping::manual(*index, value.as_str());
                    manual.field_key = field_key;
                    *mapping = manual;
                }
                None => warn!("Override for unknown marker at offset {} ignored", index),
            }
        }

        let mappings: Vec<FieldMapping> = patterns
            .iter()
            .map(|p| {
                by_index
                    .remove(&p.index)
                    .unwrap_or_else(|| FieldMapping::unclassified(p.index))
            })
            .collect();

        let report = self
            .gatekeeper
            .validate(&mappings, &request.required_field_keys);

        Ok(Analysis {
            patterns,
            mappings,
            report,
            failed_batches: outcome.failed_batches,
            cancelled: outcome.cancelled_batches > 0,
        })
    }

    /// Substitute the analysed mappings into a serialized body
    pub fn recompile(
        &self,
        body: &str,
        analysis: &Analysis,
    ) -> Result<CompilationResult, ExtractorError> {
        self.recompile_as(body, self.body_format, analysis)
    }

    fn recompile_as(
        &self,
        body: &str,
        format: BodyFormat,
        analysis: &Analysis,
    ) -> Result<CompilationResult, ExtractorError> {
        let result =
            Recompiler::new(format).recompile(body, &analysis.patterns, &analysis.mappings)?;
        Ok(result)
    }

    /// Run the full pipeline
    ///
    /// Recompilation is skipped when the report has errors, unless the
    /// request sets `proceed_on_errors`. Without a serialized body the raw
    /// text is rewritten as plain text.
    pub async fn compile(
        &self,
        request: CompilationRequest,
        cancel: &CancellationToken,
    ) -> Result<CompilationOutcome, ExtractorError> {
        let start_time = Instant::now();

        let analysis = self.analyze(&request, cancel).await?;

        let result = if analysis.report.is_ok() || request.proceed_on_errors {
            let compiled = match &request.body {
                Some(body) => self.recompile_as(body, self.body_format, &analysis)?,
                None => self.recompile_as(&request.text, BodyFormat::PlainText, &analysis)?,
            };
            Some(compiled)
        } else {
            warn!(
                "Validation failed with {} error(s), body left unchanged",
                analysis.report.errors.len()
            );
            None
        };

        let summary = CompilationSummary {
            total_fields: analysis.patterns.len(),
            compiled: result.as_ref().map_or(0, |r| r.compiled_count),
            skipped: result.as_ref().map_or_else(
                || analysis.mappings.iter().filter(|m| !m.should_compile()).count(),
                |r| r.skipped_count,
            ),
            not_found: result.as_ref().map_or(0, |r| r.not_found_count),
            needs_review: analysis.needs_review_count(),
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        };

        info!("Compilation complete: {}", summary);

        Ok(CompilationOutcome {
            analysis,
            result,
            summary,
        })
    }
}

/// Keep a recognised field key on a mapping the classifier left empty
fn apply_hint(mapping: FieldMapping, hint: &FieldHint) -> FieldMapping {
    if mapping.should_compile() || mapping.field_key.is_some() {
        return mapping;
    }
    let fallback = FieldMapping::skip(
        mapping.pattern_index,
        Some(hint.field_key.clone()),
        hint.confidence,
        MappingSource::Deterministic,
    );
    if mapping.needs_review {
        fallback.flagged_for_review()
    } else {
        fallback
    }
}
