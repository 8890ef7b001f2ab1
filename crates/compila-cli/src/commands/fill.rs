//! Fill command implementation.

use crate::cli::{CliFormat, FillArgs};
use crate::config::{load_compiler_config, load_profile, parse_overrides};
use crate::error::Result;
use crate::output::Formatter;
use compila_domain::traits::LlmProvider;
use compila_extractor::{CompilationOutcome, CompilationRequest, Compiler, CompilerConfig};
use compila_gatekeeper::Gatekeeper;
use compila_llm::OllamaProvider;
use compila_recompiler::BodyFormat;
use std::collections::BTreeMap;
use std::fs;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Execute the fill command.
pub async fn execute_fill(
    args: FillArgs,
    formatter: &Formatter,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut config = load_compiler_config(args.config.as_deref())?;
    if args.offline {
        config.classifier_enabled = false;
    }

    let text = fs::read_to_string(&args.text)?;
    let body = args.body.as_ref().map(fs::read_to_string).transpose()?;
    let request = CompilationRequest {
        text,
        body,
        profile: load_profile(&args.profile)?,
        required_field_keys: args.require.clone(),
        proceed_on_errors: args.proceed_on_errors,
    };
    let overrides = parse_overrides(&args.overrides)?;
    let format = if args.markup {
        BodyFormat::Markup
    } else {
        BodyFormat::PlainText
    };

    let provider =
        OllamaProvider::new(&args.endpoint, &args.model).with_timeout(config.batch_timeout());
    if config.classifier_enabled {
        info!("Classifier: {} at {}", provider.model(), args.endpoint);
    }

    let outcome = run_fill(provider, config, format, overrides, request, cancel).await?;

    let written = match (&outcome.result, &args.output) {
        (Some(result), Some(path)) => {
            fs::write(path, &result.body)?;
            true
        }
        (Some(result), None) => {
            if formatter.format() == CliFormat::Table {
                println!("{}", result.body);
            }
            true
        }
        (None, _) => false,
    };

    match formatter.format() {
        CliFormat::Json => {
            println!(
                "{}",
                formatter.summary_json(&outcome.summary, &outcome.analysis.report, written)?
            );
        }
        CliFormat::Table => {
            eprintln!(
                "{}",
                formatter.format_mappings(&outcome.analysis.patterns, &outcome.analysis.mappings)
            );
            let report = formatter.format_report(&outcome.analysis.report);
            if !report.is_empty() {
                eprintln!("{}", report);
            }
            if written {
                eprintln!("{}", formatter.success(&outcome.summary.to_string()));
            } else {
                eprintln!(
                    "{}",
                    formatter.warning("Required fields missing, document not written")
                );
            }
        }
    }

    Ok(())
}

/// Build a compiler and run it on `request`.
pub async fn run_fill<L>(
    provider: L,
    config: CompilerConfig,
    format: BodyFormat,
    overrides: BTreeMap<usize, String>,
    request: CompilationRequest,
    cancel: &CancellationToken,
) -> Result<CompilationOutcome>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    let compiler = Compiler::new(provider, Gatekeeper::default_config(), config)?
        .with_body_format(format)
        .with_overrides(overrides);
    Ok(compiler.compile(request, cancel).await?)
}
