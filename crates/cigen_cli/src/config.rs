//! Project configuration (`cigen.toml`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use cigen_trigger::TriggerConfig;

pub const CONFIG_FILE: &str = "cigen.toml";

/// Settings read from `cigen.toml` in the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CigenConfig {
    /// Where workflow documents are written.
    pub workflow_dir: PathBuf,
    /// Where the provider document is written.
    pub provider_dir: PathBuf,
    /// Directory of YAML fragment overlays.
    pub catalogue_dir: Option<PathBuf>,
    pub trigger: TriggerConfig,
}

impl Default for CigenConfig {
    fn default() -> Self {
        Self {
            workflow_dir: PathBuf::from(".github").join("workflows"),
            provider_dir: PathBuf::from("deploy"),
            catalogue_dir: None,
            trigger: TriggerConfig::default(),
        }
    }
}

impl CigenConfig {
    /// Load `cigen.toml` from `root`, or defaults if there is none.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            debug!("No {} in {:?}, using defaults", CONFIG_FILE, root);
            return Ok(Self::default());
        }

        let content =
            fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {:?}", path))?;
        debug!("Loaded {:?}", path);
        Ok(config)
    }

    /// Apply command-line and environment overrides.
    pub fn with_overrides(mut self, emergency_mode: Option<bool>, catalogue: Option<PathBuf>) -> Self {
        if let Some(emergency_mode) = emergency_mode {
            self.trigger.emergency_mode = emergency_mode;
        }
        if catalogue.is_some() {
            self.catalogue_dir = catalogue;
        }
        self
    }
}
