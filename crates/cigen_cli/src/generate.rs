//! Selection → artifacts, shared by `init` and `add`.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use cigen_catalogue::{CatalogueLoader, CompatibilityResolver, FragmentCatalogue, RawSelection, Selection};
use cigen_core::{Artifact, Composer, EmitOptions, Emitter};
use cigen_provider::ProviderConfig;

use crate::config::CigenConfig;

/// Everything a generation run produced, before anything is written.
pub struct Generation {
    pub selection: Selection,
    pub artifacts: Vec<Artifact>,
    pub warnings: Vec<String>,
}

/// The builtin catalogue plus any configured overlays, verified.
pub fn load_catalogue(root: &Path, config: &CigenConfig) -> Result<FragmentCatalogue> {
    let builtin = FragmentCatalogue::builtin();
    let catalogue = match &config.catalogue_dir {
        Some(dir) => CatalogueLoader::new(root.join(dir))
            .load_onto(builtin)
            .with_context(|| format!("Failed to load catalogue overlays from {:?}", dir))?,
        None => {
            builtin.verify()?;
            builtin
        }
    };
    info!("Catalogue has {} fragments", catalogue.len());
    Ok(catalogue)
}

/// Resolve, compose and render a selection.
pub fn generate(
    catalogue: &FragmentCatalogue,
    raw: &RawSelection,
    app_name: &str,
    config: &CigenConfig,
) -> Result<Generation> {
    let selection = CompatibilityResolver::new(catalogue).resolve(raw)?;
    let provider = ProviderConfig::from_selection(catalogue, &selection, app_name)?;

    let pipeline = Composer::new(catalogue).compose(&selection);
    let options =
        EmitOptions::new(app_name).with_emergency_mode(config.trigger.emergency_mode);
    let output = Emitter::new(options).emit(&pipeline)?;

    let mut artifacts: Vec<Artifact> = output
        .documents
        .iter()
        .map(|doc| Artifact::new(config.workflow_dir.join(&doc.file_name), doc.content.clone()))
        .collect();
    artifacts.push(Artifact::new(
        provider.relative_path(&config.provider_dir),
        provider.to_yaml()?,
    ));

    Ok(Generation {
        selection,
        artifacts,
        warnings: output.warnings,
    })
}

pub fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        println!("⚠️  {}", warning);
    }
}

pub fn print_dry_run(artifacts: &[Artifact]) {
    for artifact in artifacts {
        println!("--- {}", artifact.path.display());
        print!("{}", artifact.content);
    }
}
