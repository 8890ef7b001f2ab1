//! Pipeline outputs: validation report and compilation result

/// Outcome of mapping validation
///
/// Errors are blocking (a required field has no value); warnings are advisory
/// and always shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Blocking issues
    pub errors: Vec<String>,

    /// Non-blocking issues
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether there are no blocking errors
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether the report has nothing at all to show
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Rewritten document body plus substitution counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationResult {
    /// Serialized body after substitution
    pub body: String,

    /// Markers replaced with a value
    pub compiled_count: usize,

    /// Markers intentionally left untouched
    pub skipped_count: usize,

    /// Markers whose text could not be located in the body
    pub not_found_count: usize,
}

impl CompilationResult {
    /// Total number of mappings processed
    pub fn total(&self) -> usize {
        self.compiled_count + self.skipped_count + self.not_found_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_ok() {
        let report = ValidationReport::new();
        assert!(report.is_ok());
        assert!(report.is_clean());
    }

    #[test]
    fn test_warnings_do_not_block() {
        let report = ValidationReport {
            errors: vec![],
            warnings: vec!["low confidence".to_string()],
        };
        assert!(report.is_ok());
        assert!(!report.is_clean());
    }

    #[test]
    fn test_compilation_total() {
        let result = CompilationResult {
            body: String::new(),
            compiled_count: 3,
            skipped_count: 2,
            not_found_count: 1,
        };
        assert_eq!(result.total(), 6);
    }
}
