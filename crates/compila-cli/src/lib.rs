//! Compila CLI library.
//!
//! This library provides the core functionality for the Compila command-line interface,
//! including argument parsing, file loading, command execution, and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, CliFormat, Command};
pub use error::{CliError, Result};
pub use output::Formatter;
