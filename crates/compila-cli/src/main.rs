//! Compila CLI - Fill document templates from a profile.

use anyhow::Context;
use clap::Parser;
use compila_cli::commands;
use compila_cli::{Cli, Command, Formatter};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize tracing (log to stderr)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let formatter = Formatter::new(cli.format, !cli.no_color);

    // Ctrl-C stops dispatching classifier batches; in-flight ones finish
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    match cli.command {
        Command::Scan(args) => {
            let file = args.file.display().to_string();
            commands::execute_scan(args, &formatter)
                .with_context(|| format!("scanning {}", file))?;
        }
        Command::Fill(args) => {
            let file = args.text.display().to_string();
            commands::execute_fill(args, &formatter, &cancel)
                .await
                .with_context(|| format!("filling {}", file))?;
        }
    }

    Ok(())
}
