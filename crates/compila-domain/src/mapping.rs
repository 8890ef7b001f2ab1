//! Field mapping module - the decision taken for one pattern
//!
//! A single `FieldMapping` type flows through the resolver, the classifier,
//! the validator and the recompiler.

use crate::Confidence;

/// Which stage produced a mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingSource {
    /// Local synonym dictionary
    Deterministic,

    /// External semantic classifier
    Classifier,

    /// Value supplied explicitly by the caller
    ManualOverride,
}

impl MappingSource {
    /// Get the source name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingSource::Deterministic => "deterministic",
            MappingSource::Classifier => "classifier",
            MappingSource::ManualOverride => "manual_override",
        }
    }
}

/// Compile or skip
///
/// The value lives inside `Compile`, so a skipped mapping cannot carry one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingDecision {
    /// Substitute this (non-empty) value for the marker
    Compile(String),

    /// Leave the marker untouched
    Skip,
}

/// Resolution of one pattern to a value decision
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    /// `Pattern::index` of the pattern this mapping resolves
    pub pattern_index: usize,

    /// Canonical profile-field key, if one was identified
    pub field_key: Option<String>,

    /// Compile/skip decision
    pub decision: MappingDecision,

    /// Confidence in the decision
    pub confidence: Confidence,

    /// Stage that produced the mapping
    pub source: MappingSource,

    /// Set when classification failed or was cancelled for this pattern
    pub needs_review: bool,
}

impl FieldMapping {
    /// Create a mapping that substitutes `value`
    ///
    /// A blank value demotes the mapping to a skip, keeping the
    /// compile ⇒ non-empty invariant.
    pub fn compile(
        pattern_index: usize,
        field_key: Option<String>,
        value: impl Into<String>,
        confidence: impl Into<Confidence>,
        source: MappingSource,
    ) -> Self {
        let value = value.into();
        let decision = if value.trim().is_empty() {
            MappingDecision::Skip
        } else {
            MappingDecision::Compile(value)
        };

        Self {
            pattern_index,
            field_key,
            decision,
            confidence: confidence.into(),
            source,
            needs_review: false,
        }
    }

    /// Create a mapping that leaves the marker untouched
    pub fn skip(
        pattern_index: usize,
        field_key: Option<String>,
        confidence: impl Into<Confidence>,
        source: MappingSource,
    ) -> Self {
        Self {
            pattern_index,
            field_key,
            decision: MappingDecision::Skip,
            confidence: confidence.into(),
            source,
            needs_review: false,
        }
    }

    /// Create the mapping used when classification failed for a pattern
    pub fn unclassified(pattern_index: usize) -> Self {
        Self::skip(pattern_index, None, Confidence::ZERO, MappingSource::Classifier)
            .flagged_for_review()
    }

    /// Create a caller-supplied mapping with full confidence
    pub fn manual(pattern_index: usize, value: impl Into<String>) -> Self {
        Self::compile(
            pattern_index,
            None,
            value,
            Confidence::CERTAIN,
            MappingSource::ManualOverride,
        )
    }

    /// Mark the mapping as needing manual review
    pub fn flagged_for_review(mut self) -> Self {
        self.needs_review = true;
        self
    }

    /// Whether the marker should be replaced
    pub fn should_compile(&self) -> bool {
        matches!(self.decision, MappingDecision::Compile(_))
    }

    /// Value to substitute, `""` for skipped mappings
    pub fn value(&self) -> &str {
        match &self.decision {
            MappingDecision::Compile(value) => value,
            MappingDecision::Skip => "",
        }
    }

    /// Field key as a string slice
    pub fn field_key(&self) -> Option<&str> {
        self.field_key.as_deref()
    }
}
