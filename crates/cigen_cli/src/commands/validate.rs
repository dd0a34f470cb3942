//! Validate command - Check a selection without writing anything.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use cigen_catalogue::CompatibilityResolver;
use cigen_core::{Composer, SelectionStore};

use crate::commands::{ConfigArgs, SelectionArgs};
use crate::config::CigenConfig;
use crate::generate::{load_catalogue, print_warnings};

#[derive(Args)]
pub struct ValidateArgs {
    // The saved selection is used when no axis flag is given.
    #[command(flatten)]
    selection: SelectionArgs,

    /// Project root (defaults to current directory)
    #[arg(short, long)]
    path: Option<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,
}

pub fn execute(args: ValidateArgs) -> Result<()> {
    let root = match args.path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };

    let raw = if args.selection.is_empty() {
        let saved = SelectionStore::new(&root).load()?;
        info!("Validating saved selection of '{}'", saved.app_name);
        saved.selection
    } else {
        args.selection.to_raw()
    };

    let config = CigenConfig::load(&root)?
        .with_overrides(args.config.emergency_mode, args.config.catalogue);
    let catalogue = load_catalogue(&root, &config)?;

    println!("📋 Validating selection...");
    let selection = match CompatibilityResolver::new(&catalogue).resolve(&raw) {
        Ok(selection) => selection,
        Err(report) => {
            println!("   ❌ {} issue(s):", report.len());
            for issue in &report.issues {
                println!("      - {}", issue);
            }
            return Err(report.into());
        }
    };

    println!("   ✅ Selection is compatible");
    for fragment in selection.fragments() {
        println!("      {}", fragment);
    }

    let pipeline = Composer::new(&catalogue).compose(&selection);
    println!();
    println!("🔧 Stages:");
    for stage in &pipeline.stages {
        println!("   {} ({} steps)", stage.name, stage.steps.len());
    }
    print_warnings(&pipeline.warnings);

    Ok(())
}
