//! Output formatting for the CLI.

use crate::cli::CliFormat;
use crate::error::Result;
use colored::*;
use compila_domain::{FieldMapping, Pattern, ValidationReport};
use compila_extractor::CompilationSummary;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: CliFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: CliFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Output format in use.
    pub fn format(&self) -> CliFormat {
        self.format
    }

    /// Format detected markers.
    pub fn format_patterns(&self, patterns: &[Pattern]) -> Result<String> {
        match self.format {
            CliFormat::Json => {
                let json: Vec<serde_json::Value> = patterns
                    .iter()
                    .map(|p| {
                        serde_json::json!({
                            "index": p.index,
                            "type": p.pattern_type.as_str(),
                            "raw_text": p.raw_text,
                            "label": p.label,
                            "context_before": p.context_before,
                            "context_after": p.context_after,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            CliFormat::Table => Ok(self.patterns_table(patterns)),
        }
    }

    fn patterns_table(&self, patterns: &[Pattern]) -> String {
        if patterns.is_empty() {
            return self.colorize("No markers found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Offset", "Type", "Marker", "Label", "Context"]);
        for p in patterns {
            builder.push_record([
                p.index.to_string(),
                p.pattern_type.as_str().to_string(),
                p.raw_text.clone(),
                p.label.clone(),
                truncate_start(&p.context_before, 40),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format mappings next to their markers.
    pub fn format_mappings(&self, patterns: &[Pattern], mappings: &[FieldMapping]) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Offset", "Label", "Field", "Value", "Confidence", "Source"]);
        for (p, m) in patterns.iter().zip(mappings) {
            let value = if m.should_compile() {
                m.value().to_string()
            } else if m.needs_review {
                "(review)".to_string()
            } else {
                "(skip)".to_string()
            };
            builder.push_record([
                p.index.to_string(),
                p.label.clone(),
                m.field_key().unwrap_or("-").to_string(),
                value,
                m.confidence.to_string(),
                m.source.as_str().to_string(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format a validation report, one line per entry.
    pub fn format_report(&self, report: &ValidationReport) -> String {
        let mut lines = Vec::new();
        for error in &report.errors {
            lines.push(self.error(error));
        }
        for warning in &report.warnings {
            lines.push(self.warning(warning));
        }
        lines.join("\n")
    }

    /// Format the run summary as JSON.
    pub fn summary_json(
        &self,
        summary: &CompilationSummary,
        report: &ValidationReport,
        body_written: bool,
    ) -> Result<String> {
        let json = serde_json::json!({
            "summary": summary,
            "errors": report.errors,
            "warnings": report.warnings,
            "body_written": body_written,
        });
        Ok(serde_json::to_string_pretty(&json)?)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Keep the last `max` characters, marking the cut with an ellipsis.
fn truncate_start(s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count <= max {
        return s.to_string();
    }
    let tail: String = s.chars().skip(count - max).collect();
    format!("…{}", tail)
}
