//! Add command - Enable the hotfix or rollback workflow.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tracing::{info, warn};

use cigen_core::{changed_artifacts, write_artifacts, SelectionStore};

use crate::commands::ConfigArgs;
use crate::config::CigenConfig;
use crate::generate::{generate, load_catalogue, print_dry_run, print_warnings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AddTarget {
    /// Separate workflow for hotfix releases
    Hotfix,
    /// Manually dispatched redeploy of a previous tag
    Rollback,
}

impl AddTarget {
    pub fn hook(&self) -> &'static str {
        match self {
            AddTarget::Hotfix => "hotfix",
            AddTarget::Rollback => "rollback",
        }
    }
}

#[derive(Args)]
pub struct AddArgs {
    /// What to add
    #[arg(value_enum)]
    target: AddTarget,

    /// Project root (defaults to current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite generated files that were edited since they were generated
    #[arg(short, long)]
    force: bool,

    /// Print the regenerated files instead of writing them
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

pub fn execute(args: AddArgs) -> Result<()> {
    let root = match args.output {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let hook = args.target.hook();

    let store = SelectionStore::new(&root);
    let mut saved = store.load()?;
    info!("Adding {} to '{}'", hook, saved.app_name);

    let config = CigenConfig::load(&root)?
        .with_overrides(args.config.emergency_mode, args.config.catalogue);
    let catalogue = load_catalogue(&root, &config)?;

    let raw = saved.selection.clone().add_hooks([hook]);
    let generation = generate(&catalogue, &raw, &saved.app_name, &config)?;

    print_warnings(&generation.warnings);

    if args.dry_run {
        print_dry_run(&generation.artifacts);
        return Ok(());
    }

    // What the files on disk were generated from, to tell owner edits apart.
    let previous = match generate(&catalogue, &saved.selection, &saved.app_name, &config) {
        Ok(previous) => previous.artifacts,
        Err(e) => {
            warn!(
                "Cannot render the saved selection ({:#}); treating existing files as edited",
                e
            );
            Vec::new()
        }
    };

    let changed = changed_artifacts(&root, generation.artifacts, &previous, args.force)
        .context("Generated files were edited; use --force to overwrite them")?;

    if changed.is_empty() {
        println!("✅ {} is already enabled; nothing to do", hook);
        return Ok(());
    }

    write_artifacts(&root, &changed, true).context("Failed to write generated files")?;
    saved.update(generation.selection.to_raw());
    store.save(&saved).context("Failed to save selection")?;

    println!("✅ Added {} to {}", hook, saved.app_name);
    println!();
    println!("Updated:");
    for artifact in &changed {
        println!("  📄 {}", artifact.path.display());
    }

    Ok(())
}
