//! Request and response types for compilation

use compila_domain::{
    CompilationResult, Confidence, FieldMapping, Pattern, ProfileData, ValidationReport,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Request to fill one document
#[derive(Debug, Clone, Default)]
pub struct CompilationRequest {
    /// Raw text extracted from the document
    pub text: String,

    /// Serialized body to rewrite; the raw text is used when absent
    pub body: Option<String>,

    /// Profile supplying the values
    pub profile: ProfileData,

    /// Canonical keys that must receive a value
    pub required_field_keys: Vec<String>,

    /// Recompile even when the validation report has errors
    pub proceed_on_errors: bool,
}

/// Field key recognised for a pattern the profile could not fill
#[derive(Debug, Clone, PartialEq)]
pub struct FieldHint {
    /// Canonical key the label resolved to
    pub field_key: String,

    /// Reduced confidence for the missing value
    pub confidence: Confidence,
}

/// Output of the deterministic resolver
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Patterns mapped to a profile value
    pub mapped: Vec<FieldMapping>,

    /// Patterns needing a second opinion, in document order
    pub unresolved: Vec<Pattern>,

    /// Keys recognised for unresolved patterns, by pattern index
    pub hints: BTreeMap<usize, FieldHint>,
}

/// Output of the batch classifier
#[derive(Debug, Clone, Default)]
pub struct ClassificationOutcome {
    /// One mapping per input pattern, in input order
    pub mappings: Vec<FieldMapping>,

    /// Batches that ended in a recoverable failure
    pub failed_batches: usize,

    /// Batches never dispatched because of cancellation
    pub cancelled_batches: usize,
}

/// Everything known about a document before recompilation
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Detected markers in document order
    pub patterns: Vec<Pattern>,

    /// One mapping per pattern, same order
    pub mappings: Vec<FieldMapping>,

    /// Validation outcome
    pub report: ValidationReport,

    /// Classifier batches that failed
    pub failed_batches: usize,

    /// Whether cancellation cut classification short
    pub cancelled: bool,
}

impl Analysis {
    /// Mappings flagged for manual review
    pub fn needs_review_count(&self) -> usize {
        self.mappings.iter().filter(|m| m.needs_review).count()
    }
}

/// Final outcome of a compilation request
#[derive(Debug, Clone)]
pub struct CompilationOutcome {
    /// Patterns, mappings and report
    pub analysis: Analysis,

    /// Rewritten body; `None` when blocked by validation errors
    pub result: Option<CompilationResult>,

    /// Counters for display
    pub summary: CompilationSummary,
}

/// Post-hoc counters shown to the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationSummary {
    /// Markers detected
    pub total_fields: usize,

    /// Markers replaced
    pub compiled: usize,

    /// Markers left untouched on purpose
    pub skipped: usize,

    /// Markers missing from the serialized body
    pub not_found: usize,

    /// Markers flagged for manual review
    pub needs_review: usize,

    /// Wall-clock time for the request
    pub processing_time_ms: u64,
}

impl fmt::Display for CompilationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "compiled {} of {} fields; {} need manual review",
            self.compiled, self.total_fields, self.needs_review
        )?;
        if self.not_found > 0 {
            write!(f, "; {} not found in the document body", self.not_found)?;
        }
        Ok(())
    }
}

/// One marker as sent to the classifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchItem {
    /// Position within the batch
    pub index: usize,
    #[serde(rename = "type")]
    pub pattern_type: String,
    pub label: String,
    pub context_before: String,
    pub context_after: String,
}

/// Payload embedded in the classification prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClassifierRequest {
    pub batch_items: Vec<BatchItem>,
    pub available_profile_entries: BTreeMap<String, String>,
}

/// One element of the classifier's answer, already normalized
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ClassificationCandidate {
    /// Position within the batch this element answers
    pub position: usize,
    pub field_key: Option<String>,
    pub compile: bool,
    pub value: String,
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_display() {
        let summary = CompilationSummary {
            total_fields: 10,
            compiled: 7,
            skipped: 3,
            not_found: 0,
            needs_review: 2,
            processing_time_ms: 5,
        };
        assert_eq!(
            summary.to_string(),
            "compiled 7 of 10 fields; 2 need manual review"
        );
    }

    #[test]
    fn test_summary_display_with_not_found() {
        let summary = CompilationSummary {
            total_fields: 3,
            compiled: 1,
            not_found: 2,
            ..CompilationSummary::default()
        };
        assert!(summary.to_string().ends_with("2 not found in the document body"));
    }

    #[test]
    fn test_batch_item_wire_names() {
        let item = BatchItem {
            index: 0,
            pattern_type: "underscore_run".to_string(),
            label: "C.F.".to_string(),
            context_before: "Il sottoscritto".to_string(),
            context_after: "nato a".to_string(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "underscore_run");
        assert_eq!(json["contextBefore"], "Il sottoscritto");
        assert_eq!(json["contextAfter"], "nato a");
    }
}
