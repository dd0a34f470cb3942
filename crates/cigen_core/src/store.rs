//! Persisted selection.
//!
//! `cigen init` records the selection it generated from in
//! `.cigen/selection.yaml`, so `cigen add` can extend it later without the
//! user repeating every flag.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use cigen_catalogue::RawSelection;

use crate::error::{CoreError, CoreResult};

pub const STORE_DIR: &str = ".cigen";
pub const SELECTION_FILE: &str = "selection.yaml";

/// A selection as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSelection {
    pub app_name: String,
    pub selection: RawSelection,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SavedSelection {
    pub fn new(app_name: impl Into<String>, selection: RawSelection) -> Self {
        let now = Utc::now();
        Self {
            app_name: app_name.into(),
            selection,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the selection and bump `updated_at`.
    pub fn update(&mut self, selection: RawSelection) {
        self.selection = selection;
        self.updated_at = Utc::now();
    }
}

/// Reads and writes the saved selection under a project root.
#[derive(Debug, Clone)]
pub struct SelectionStore {
    root: PathBuf,
}

impl SelectionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.root.join(STORE_DIR).join(SELECTION_FILE)
    }

    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    pub fn load(&self) -> CoreResult<SavedSelection> {
        let path = self.path();
        if !path.exists() {
            return Err(CoreError::SelectionNotFound(path));
        }
        debug!("Loading selection from {:?}", path);
        let content = fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn save(&self, saved: &SavedSelection) -> CoreResult<()> {
        let path = self.path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!("Writing selection to {:?}", path);
        fs::write(&path, serde_yaml::to_string(saved)?)?;
        Ok(())
    }
}

/// A file to write, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub content: String,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Write artifacts under `root`.
///
/// Nothing is written if any target already exists and `force` is false.
pub fn write_artifacts(root: &Path, artifacts: &[Artifact], force: bool) -> CoreResult<Vec<PathBuf>> {
    let targets: Vec<PathBuf> = artifacts.iter().map(|a| root.join(&a.path)).collect();

    if !force {
        if let Some(existing) = targets.iter().find(|t| t.exists()) {
            return Err(CoreError::AlreadyExists(existing.clone()));
        }
    }

    for (artifact, target) in artifacts.iter().zip(&targets) {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!("Writing {:?}", target);
        fs::write(target, &artifact.content)?;
    }

    Ok(targets)
}

/// Pick the artifacts a regeneration has to write under `root`.
///
/// `previous` is the rendering the files on disk were generated from. Files
/// whose rendering did not change are left alone, edited or not. A file that
/// must change but no longer matches `previous` has been edited by its owner:
/// unless `force` is set this fails with [`CoreError::AlreadyExists`] before
/// anything is written.
pub fn changed_artifacts(
    root: &Path,
    fresh: Vec<Artifact>,
    previous: &[Artifact],
    force: bool,
) -> CoreResult<Vec<Artifact>> {
    let mut changed = Vec::new();

    for artifact in fresh {
        let rendered_before = previous.iter().find(|p| p.path == artifact.path);
        if rendered_before.is_some_and(|p| p.content == artifact.content) {
            continue;
        }

        let target = root.join(&artifact.path);
        let existing = match fs::read_to_string(&target) {
            Ok(existing) => existing,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                changed.push(artifact);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if existing == artifact.content {
            continue;
        }

        let untouched = rendered_before.is_some_and(|p| p.content == existing);
        if !untouched && !force {
            return Err(CoreError::AlreadyExists(target));
        }
        if !untouched {
            warn!("Overwriting edited file {:?}", target);
        }
        changed.push(artifact);
    }

    Ok(changed)
}
