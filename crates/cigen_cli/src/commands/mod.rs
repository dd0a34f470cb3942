//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use cigen_catalogue::RawSelection;

pub mod add;
pub mod classify;
pub mod init;
pub mod list;
pub mod validate;

/// cigen - CI/CD pipeline generator
#[derive(Parser)]
#[command(name = "cigen")]
#[command(version, about = "cigen - generate owner-editable CI/CD pipelines")]
#[command(long_about = r#"
cigen composes GitHub Actions workflows and a provider configuration file
from a language, package manager, framework, cloud provider and service type.
The generated files do not depend on cigen.

COMMANDS:
  init      → Generate workflows for a new project
  add       → Add the hotfix or rollback workflow to a generated project
  validate  → Check a selection without writing anything
  classify  → Show what a repository event would deploy
  list      → Show the fragment catalogue

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Incompatible selection
  4 - Catalogue integrity error
  5 - I/O error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate workflows and provider configuration
    Init(init::InitArgs),

    /// Add a hotfix or rollback workflow using the saved selection
    Add(add::AddArgs),

    /// Validate a selection
    Validate(validate::ValidateArgs),

    /// Classify a trigger event
    Classify(classify::ClassifyArgs),

    /// List catalogue fragments
    List(list::ListArgs),
}

/// Bad input that clap cannot catch.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UsageError(pub String);

/// One flag per axis.
#[derive(Args, Debug, Default)]
pub struct SelectionArgs {
    /// Language (e.g. nodejs, python, go)
    #[arg(long)]
    pub language: Option<String>,

    /// Package manager (e.g. npm, poetry, gomod)
    #[arg(long)]
    pub package_manager: Option<String>,

    /// Framework (optional, e.g. nextjs, django)
    #[arg(long)]
    pub framework: Option<String>,

    /// Cloud provider (aws, gcp, azure)
    #[arg(long)]
    pub provider: Option<String>,

    /// Service type (e.g. ecs, lambda, cloudrun)
    #[arg(long)]
    pub service: Option<String>,

    /// Hook to enable; repeatable
    #[arg(long = "hook", value_name = "HOOK")]
    pub hooks: Vec<String>,
}

impl SelectionArgs {
    pub fn is_empty(&self) -> bool {
        self.language.is_none()
            && self.package_manager.is_none()
            && self.framework.is_none()
            && self.provider.is_none()
            && self.service.is_none()
            && self.hooks.is_empty()
    }

    pub fn to_raw(&self) -> RawSelection {
        let raw = RawSelection::new()
            .with_opt("language", self.language.clone())
            .with_opt("package-manager", self.package_manager.clone())
            .with_opt("framework", self.framework.clone())
            .with_opt("provider", self.provider.clone())
            .with_opt("service", self.service.clone());

        if self.hooks.is_empty() {
            raw
        } else {
            raw.add_hooks(self.hooks.iter().cloned())
        }
    }
}

/// Overrides for `cigen.toml`.
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Let hotfix releases skip lint and test by default
    #[arg(long, env = "CIGEN_EMERGENCY_MODE", value_name = "BOOL")]
    pub emergency_mode: Option<bool>,

    /// Directory of YAML fragment overlays
    #[arg(long, value_name = "DIR")]
    pub catalogue: Option<PathBuf>,
}
