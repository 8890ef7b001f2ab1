//! Mapping validation logic

use crate::ValidationConfig;
use compila_domain::{FieldMapping, ValidationReport};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// The Gatekeeper validates mappings before recompilation
#[derive(Debug, Clone, Default)]
pub struct Gatekeeper {
    config: ValidationConfig,
}

impl Gatekeeper {
    /// Create a new Gatekeeper with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Create a Gatekeeper with default configuration
    pub fn default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// Configuration in use
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate mappings against the required field keys
    ///
    /// # Arguments
    ///
    /// * `mappings` - One mapping per detected pattern
    /// * `required_field_keys` - Canonical keys that must end up with a value
    ///
    /// # Returns
    ///
    /// A report with one error per missing required key and one warning per
    /// doubtful mapping. Never fails.
    pub fn validate<S: AsRef<str>>(
        &self,
        mappings: &[FieldMapping],
        required_field_keys: &[S],
    ) -> ValidationReport {
        let mut report = ValidationReport::new();

        // 1. Required-field coverage
        let mut seen = BTreeSet::new();
        for key in required_field_keys.iter().map(AsRef::as_ref) {
            if !seen.insert(key) {
                continue;
            }
            if let Some(error) = self.check_required(mappings, key) {
                report.errors.push(error);
            }
        }

        // 2. Per-mapping warnings
        for mapping in mappings {
            self.check_mapping(mapping, &mut report.warnings);
        }

        info!(
            "Validated {} mappings: {} errors, {} warnings",
            mappings.len(),
            report.errors.len(),
            report.warnings.len()
        );

        report
    }

    /// Error message for a required key that has no value, if any
    fn check_required(&self, mappings: &[FieldMapping], key: &str) -> Option<String> {
        let mut candidates = mappings
            .iter()
            .filter(|m| m.field_key() == Some(key))
            .peekable();

        if candidates.peek().is_none() {
            debug!("Required field '{}' is not mapped", key);
            return Some(format!("Required field '{}' is not mapped to any marker", key));
        }

        if candidates.any(|m| !m.value().is_empty()) {
            return None;
        }

        Some(format!("Required field '{}' has no value", key))
    }

    fn check_mapping(&self, mapping: &FieldMapping, warnings: &mut Vec<String>) {
        let has_value = !mapping.value().is_empty();

        if !has_value && mapping.confidence.is_below(self.config.low_confidence_threshold) {
            warnings.push(format!(
                "Marker at offset {}: low confidence ({}) and no value",
                mapping.pattern_index, mapping.confidence
            ));
        }

        if self.config.warn_missing_data && !has_value {
            if let Some(key) = mapping.field_key() {
                warnings.push(format!(
                    "Marker at offset {}: field '{}' recognised but profile key '{}' has no data",
                    mapping.pattern_index, key, key
                ));
            }
        }

        if self.config.warn_needs_review && mapping.needs_review {
            warnings.push(format!(
                "Marker at offset {}: needs manual review",
                mapping.pattern_index
            ));
        }
    }
}

/// Validate with the default configuration
pub fn validate<S: AsRef<str>>(
    mappings: &[FieldMapping],
    required_field_keys: &[S],
) -> ValidationReport {
    Gatekeeper::default_config().validate(mappings, required_field_keys)
}
