//! Gatekeeper configuration

use serde::{Deserialize, Serialize};

/// Configuration for validation rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Mappings below this confidence with no value produce a warning
    pub low_confidence_threshold: f64,

    /// Warn when a field key was identified but the profile had no value
    pub warn_missing_data: bool,

    /// Warn when a mapping was flagged for manual review
    pub warn_needs_review: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            low_confidence_threshold: 0.5,
            warn_missing_data: true,
            warn_needs_review: false,
        }
    }
}

impl ValidationConfig {
    /// Create a quiet configuration (required-field errors only)
    pub fn permissive() -> Self {
        Self {
            low_confidence_threshold: 0.0,
            warn_missing_data: false,
            warn_needs_review: false,
        }
    }

    /// Create a strict configuration (all warnings enabled)
    pub fn strict() -> Self {
        Self {
            low_confidence_threshold: 0.7,
            warn_missing_data: true,
            warn_needs_review: true,
        }
    }
}
