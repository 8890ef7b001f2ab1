//! Scan command implementation.

use crate::cli::ScanArgs;
use crate::error::Result;
use crate::output::Formatter;
use compila_extractor::PatternExtractor;
use std::fs;

/// Execute the scan command.
pub fn execute_scan(args: ScanArgs, formatter: &Formatter) -> Result<()> {
    let text = fs::read_to_string(&args.file)?;
    println!("{}", scan_text(&text, args.context_chars, formatter)?);
    Ok(())
}

/// Detect markers in `text` and render them.
pub fn scan_text(text: &str, context_chars: usize, formatter: &Formatter) -> Result<String> {
    let patterns = PatternExtractor::new(context_chars).extract(text);
    formatter.format_patterns(&patterns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliFormat;

    #[test]
    fn test_scan_text_json() {
        let formatter = Formatter::new(CliFormat::Json, false);
        let output = scan_text("Nome: _____ Cognome: [...]", 150, &formatter).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[0]["label"], "Nome");
        assert_eq!(parsed[1]["type"], "ellipsis_in_brackets");
        assert_eq!(parsed[1]["label"], "Cognome");
    }
}
