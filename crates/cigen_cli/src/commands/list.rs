//! List command - Show the fragment catalogue.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use cigen_catalogue::Axis;

use crate::commands::UsageError;
use crate::config::CigenConfig;
use crate::generate::load_catalogue;

#[derive(Args)]
pub struct ListArgs {
    /// Only list one axis (language, package-manager, framework, provider, service, hooks)
    #[arg(long)]
    axis: Option<String>,

    /// Project root whose cigen.toml is read (defaults to current directory)
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Directory of YAML fragment overlays
    #[arg(long, value_name = "DIR")]
    catalogue: Option<PathBuf>,
}

pub fn execute(args: ListArgs) -> Result<()> {
    let root = match args.path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let axes = match &args.axis {
        Some(name) => vec![Axis::from_str(name)
            .ok_or_else(|| UsageError(format!("Unknown axis '{}'", name)))?],
        None => Axis::all(),
    };

    let config = CigenConfig::load(&root)?.with_overrides(None, args.catalogue);
    let catalogue = load_catalogue(&root, &config)?;

    for axis in axes {
        let marker = if axis.is_required() { "" } else { " (optional)" };
        println!("📦 {}{}", axis, marker);
        for fragment in catalogue.values(axis) {
            println!("   {:<14} {}", fragment.value, fragment.name);
            for requirement in &fragment.requires {
                println!("   {:<14}   requires {}", "", requirement);
            }
            for exclusion in &fragment.excludes {
                println!("   {:<14}   excludes {}", "", exclusion.fragment);
            }
        }
        println!();
    }

    Ok(())
}
