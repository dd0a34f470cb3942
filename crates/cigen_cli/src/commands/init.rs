//! Init command - Generate workflows for a project.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use cigen_core::{write_artifacts, SavedSelection, SelectionStore};

use crate::commands::{ConfigArgs, SelectionArgs};
use crate::config::CigenConfig;
use crate::generate::{generate, load_catalogue, print_dry_run, print_warnings};

#[derive(Args)]
pub struct InitArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Application name, used for service, function and image names
    #[arg(long)]
    app_name: String,

    /// Project root to write into (defaults to current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing files
    #[arg(short, long)]
    force: bool,

    /// Print the generated files instead of writing them
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

pub fn execute(args: InitArgs) -> Result<()> {
    let root = match args.output {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    info!("Generating pipeline for '{}' in {:?}", args.app_name, root);

    let config = CigenConfig::load(&root)?
        .with_overrides(args.config.emergency_mode, args.config.catalogue);
    let store = SelectionStore::new(&root);
    if store.exists() && !args.force && !args.dry_run {
        anyhow::bail!(
            "Project at {:?} was already generated. Use `cigen add` or --force to regenerate.",
            root
        );
    }

    let catalogue = load_catalogue(&root, &config)?;
    let generation = generate(&catalogue, &args.selection.to_raw(), &args.app_name, &config)?;

    print_warnings(&generation.warnings);

    if args.dry_run {
        print_dry_run(&generation.artifacts);
        return Ok(());
    }

    let written = write_artifacts(&root, &generation.artifacts, args.force)
        .context("Failed to write generated files")?;
    store
        .save(&SavedSelection::new(&args.app_name, generation.selection.to_raw()))
        .context("Failed to save selection")?;

    println!("✅ Pipeline generated for {}", args.app_name);
    println!();
    println!("Created:");
    for path in written.iter().filter_map(|p| p.strip_prefix(&root).ok()) {
        println!("  📄 {}", path.display());
    }
    println!("  📁 {}/ - saved selection", cigen_core::STORE_DIR);
    println!();
    println!("Next steps:");
    if !generation.selection.has_hook("hotfix") {
        println!("  cigen add hotfix     # separate workflow for v<semver>-hotfix.<n> releases");
    }
    if !generation.selection.has_hook("rollback") {
        println!("  cigen add rollback   # manual redeploy of a previous tag");
    }

    Ok(())
}
