//! Deterministic field resolution through the synonym dictionary

use crate::dictionary::{lookup, MatchKind};
use crate::types::{FieldHint, Resolution};
use compila_domain::{Confidence, FieldMapping, MappingSource, Pattern, ProfileData};
use tracing::{debug, info};

/// Confidence of an exact dictionary match
pub const EXACT_MATCH_CONFIDENCE: f64 = 0.9;

/// Confidence of a whole-word containment match
pub const SUBSTRING_MATCH_CONFIDENCE: f64 = 0.7;

/// Confidence kept for a recognised field the profile cannot fill
pub const MISSING_VALUE_CONFIDENCE: f64 = 0.4;

/// Maps labelled patterns to profile values without external calls
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldResolver;

impl FieldResolver {
    /// Create a resolver
    pub fn new() -> Self {
        Self
    }

    /// Split `patterns` into mapped and unresolved
    ///
    /// A pattern is mapped only when its label names a dictionary field and
    /// the profile holds a usable value for it. A recognised field with no
    /// value is left unresolved and recorded as a hint.
    pub fn resolve(&self, patterns: &[Pattern], profile: &ProfileData) -> Resolution {
        let mut resolution = Resolution::default();

        for pattern in patterns {
            let Some(found) = pattern.has_label().then(|| lookup(&pattern.label)).flatten()
            else {
                resolution.unresolved.push(pattern.clone());
                continue;
            };

            let confidence = match found.kind {
                MatchKind::Exact => EXACT_MATCH_CONFIDENCE,
                MatchKind::Substring => SUBSTRING_MATCH_CONFIDENCE,
            };

            match profile.get(found.field_key) {
                Some(value) => {
                    debug!(
                        "Pattern {} '{}' → {} ({:?})",
                        pattern.index, pattern.label, found.field_key, found.kind
                    );
                    resolution.mapped.push(FieldMapping::compile(
                        pattern.index,
                        Some(found.field_key.to_string()),
                        value,
                        confidence,
                        MappingSource::Deterministic,
                    ));
                }
                None => {
                    debug!(
                        "Pattern {} '{}' → {} but the profile has no value",
                        pattern.index, pattern.label, found.field_key
                    );
                    resolution.hints.insert(
                        pattern.index,
                        FieldHint {
                            field_key: found.field_key.to_string(),
                            confidence: Confidence::new(MISSING_VALUE_CONFIDENCE),
                        },
                    );
                    resolution.unresolved.push(pattern.clone());
                }
            }
        }

        info!(
            "Resolved {} of {} patterns deterministically ({} hints)",
            resolution.mapped.len(),
            patterns.len(),
            resolution.hints.len()
        );
        resolution
    }
}

/// Resolve patterns with the default resolver
pub fn resolve_deterministic(patterns: &[Pattern], profile: &ProfileData) -> Resolution {
    FieldResolver::new().resolve(patterns, profile)
}
