//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Compila CLI - Fill the blanks of document templates from a profile.
#[derive(Debug, Parser)]
#[command(name = "compila")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "table")]
    pub format: CliFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Human-readable tables
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the blank markers found in a text file
    Scan(ScanArgs),

    /// Fill a document from a profile
    Fill(FillArgs),
}

/// Arguments for the scan command.
#[derive(Debug, Parser)]
pub struct ScanArgs {
    /// Text file to scan
    pub file: PathBuf,

    /// Characters of context captured around each marker
    #[arg(long, default_value_t = 150)]
    pub context_chars: usize,
}

/// Arguments for the fill command.
#[derive(Debug, Parser)]
pub struct FillArgs {
    /// Raw text extracted from the document
    #[arg(short, long)]
    pub text: PathBuf,

    /// Profile as a flat JSON object
    #[arg(short, long)]
    pub profile: PathBuf,

    /// Serialized body to rewrite (defaults to the text itself)
    #[arg(short, long)]
    pub body: Option<PathBuf>,

    /// Treat the body as markup and escape inserted values
    #[arg(long)]
    pub markup: bool,

    /// Required field keys (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub require: Vec<String>,

    /// Force a value for a marker: OFFSET=VALUE (repeatable)
    #[arg(long = "set", value_name = "OFFSET=VALUE")]
    pub overrides: Vec<String>,

    /// Rewrite the body even when required fields are missing
    #[arg(long)]
    pub proceed_on_errors: bool,

    /// Compiler configuration file (TOML)
    #[arg(short, long, env = "COMPILA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Ollama endpoint for the classifier
    #[arg(long, env = "COMPILA_ENDPOINT", default_value = "http://localhost:11434")]
    pub endpoint: String,

    /// Classifier model
    #[arg(long, env = "COMPILA_MODEL", default_value = "llama3.1")]
    pub model: String,

    /// Resolve with the local dictionary only
    #[arg(long)]
    pub offline: bool,

    /// Write the rewritten body here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan() {
        let cli = Cli::parse_from(["compila", "scan", "form.txt"]);
        match cli.command {
            Command::Scan(args) => {
                assert_eq!(args.file, PathBuf::from("form.txt"));
                assert_eq!(args.context_chars, 150);
            }
            _ => panic!("expected scan"),
        }
        assert_eq!(cli.format, CliFormat::Table);
    }

    #[test]
    fn test_parse_fill() {
        let cli = Cli::parse_from([
            "compila",
            "--format",
            "json",
            "fill",
            "--text",
            "form.txt",
            "--profile",
            "mario.json",
            "--require",
            "nome,codice_fiscale",
            "--set",
            "16=Giulia Bianchi",
            "--offline",
        ]);
        assert_eq!(cli.format, CliFormat::Json);
        match cli.command {
            Command::Fill(args) => {
                assert_eq!(args.require, vec!["nome", "codice_fiscale"]);
                assert_eq!(args.overrides, vec!["16=Giulia Bianchi"]);
                assert!(args.offline);
                assert!(!args.markup);
                assert!(args.body.is_none());
            }
            _ => panic!("expected fill"),
        }
    }
}
