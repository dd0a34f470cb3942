//! cigen CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Incompatible selection
//! - 4: Catalogue integrity error
//! - 5: I/O error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cigen_catalogue::{CatalogueError, IncompatibilityReport};
use cigen_core::CoreError;
use cigen_provider::ProviderError;

mod commands;
mod config;
mod generate;

use commands::{Cli, Commands, UsageError};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const INCOMPATIBLE: u8 = 3;
    pub const CATALOGUE_ERROR: u8 = 4;
    pub const IO_ERROR: u8 = 5;
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args),
        Commands::Add(args) => commands::add::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::Classify(args) => commands::classify::execute(args),
        Commands::List(args) => commands::list::execute(args),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Logs go to stderr so stdout stays parseable.
fn init_logging(cli: &Cli) {
    let default_filter = if cli.verbose {
        "cigen=debug,info"
    } else if cli.quiet {
        "warn"
    } else {
        "cigen=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let json = cli
        .log_json
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let plain = (!cli.log_json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    // Ignore the error when a subscriber is already installed.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(plain)
        .try_init();
}

/// Map an error to an exit code by the first recognised error in its chain.
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if cause.is::<UsageError>() {
            return ExitCodes::INVALID_ARGS;
        }
        if cause.is::<IncompatibilityReport>() {
            return ExitCodes::INCOMPATIBLE;
        }
        if let Some(err) = cause.downcast_ref::<CoreError>() {
            return match err {
                CoreError::Catalogue(err) => catalogue_exit_code(err),
                CoreError::SelectionNotFound(_) => ExitCodes::INVALID_ARGS,
                CoreError::AlreadyExists(_) | CoreError::Io(_) => ExitCodes::IO_ERROR,
                CoreError::Serialization(_) => ExitCodes::GENERAL_ERROR,
            };
        }
        if let Some(err) = cause.downcast_ref::<CatalogueError>() {
            return catalogue_exit_code(err);
        }
        if let Some(err) = cause.downcast_ref::<ProviderError>() {
            return match err {
                ProviderError::InvalidAppName(_) => ExitCodes::INVALID_ARGS,
                ProviderError::Io(_) => ExitCodes::IO_ERROR,
                _ => ExitCodes::GENERAL_ERROR,
            };
        }
        if cause.is::<toml::de::Error>() {
            return ExitCodes::INVALID_ARGS;
        }
        if cause.is::<std::io::Error>() {
            return ExitCodes::IO_ERROR;
        }
    }
    ExitCodes::GENERAL_ERROR
}

fn catalogue_exit_code(err: &CatalogueError) -> u8 {
    match err {
        CatalogueError::Integrity { .. } | CatalogueError::InvalidFragment { .. } => {
            ExitCodes::CATALOGUE_ERROR
        }
        CatalogueError::NotFound(_) | CatalogueError::Io(_) => ExitCodes::IO_ERROR,
    }
}
