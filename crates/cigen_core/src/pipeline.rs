//! Composed pipeline model.

use std::collections::{BTreeMap, BTreeSet};

use cigen_catalogue::{FragmentRef, StageName, Step};
use cigen_trigger::{StageGuard, StageKind};

/// Deployment role of a stage.
pub fn stage_kind(name: StageName) -> StageKind {
    match name {
        StageName::Lint | StageName::Test => StageKind::Gate,
        StageName::PreBuild | StageName::Build | StageName::PostBuild => StageKind::Build,
        StageName::PreDeploy | StageName::Deploy | StageName::PostDeploy => StageKind::Deploy,
    }
}

/// One stage of a composed pipeline; emitted as one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub name: StageName,
    pub steps: Vec<Step>,
    pub guard: StageGuard,
}

impl Stage {
    pub fn new(name: StageName) -> Self {
        Self {
            name,
            steps: Vec::new(),
            guard: StageGuard::for_kind(stage_kind(name)),
        }
    }

    pub fn kind(&self) -> StageKind {
        stage_kind(self.name)
    }

    pub fn step(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.name == name)
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }
}

/// The result of composing a selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipelineDefinition {
    /// Preamble shared by every job.
    pub setup: Vec<Step>,
    /// In canonical stage order.
    pub stages: Vec<Stage>,
    /// Workflow-level environment with defaults.
    pub env: BTreeMap<String, String>,
    pub secrets: BTreeSet<String>,
    pub warnings: Vec<String>,
    /// Source fragments in precedence order.
    pub fragments: Vec<FragmentRef>,
}

impl PipelineDefinition {
    pub fn stage(&self, name: StageName) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    pub fn stage_names(&self) -> Vec<StageName> {
        self.stages.iter().map(|s| s.name).collect()
    }

    pub fn has_hook(&self, hook: &str) -> bool {
        self.fragments
            .iter()
            .any(|f| f.axis == cigen_catalogue::Axis::Hooks && f.value == hook)
    }

    pub fn step_count(&self) -> usize {
        self.stages.iter().map(|s| s.steps.len()).sum()
    }
}
