//! Fragment definitions.
//!
//! A fragment is the contribution of one axis value (a language, a package
//! manager, a cloud provider, ...) to the generated pipeline. Fragments are
//! plain data: they can be built in code or loaded from YAML.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A configurable dimension of a generation request.
///
/// Variants are declared in composition precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Axis {
    Language,
    PackageManager,
    Framework,
    Provider,
    Service,
    Hooks,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Language => "language",
            Axis::PackageManager => "package-manager",
            Axis::Framework => "framework",
            Axis::Provider => "provider",
            Axis::Service => "service",
            Axis::Hooks => "hooks",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "language" => Some(Axis::Language),
            "package-manager" | "package_manager" | "packagemanager" => Some(Axis::PackageManager),
            "framework" => Some(Axis::Framework),
            "provider" => Some(Axis::Provider),
            "service" => Some(Axis::Service),
            "hooks" | "hook" => Some(Axis::Hooks),
            _ => None,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            Axis::Language,
            Axis::PackageManager,
            Axis::Framework,
            Axis::Provider,
            Axis::Service,
            Axis::Hooks,
        ]
    }

    /// Whether a selection must name a value for this axis.
    pub fn is_required(&self) -> bool {
        !matches!(self, Axis::Framework | Axis::Hooks)
    }

    /// Whether this axis accepts zero or more values.
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, Axis::Hooks)
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifies a fragment by axis and value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FragmentRef {
    pub axis: Axis,
    pub value: String,
}

impl FragmentRef {
    pub fn new(axis: Axis, value: impl Into<String>) -> Self {
        Self {
            axis,
            value: value.into(),
        }
    }
}

impl std::fmt::Display for FragmentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.axis, self.value)
    }
}

/// Named phases of a generated pipeline, in canonical order.
///
/// The `pre-*`/`post-*` variants are hook sub-stages bracketing `build` and
/// `deploy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageName {
    Lint,
    Test,
    PreBuild,
    Build,
    PostBuild,
    PreDeploy,
    Deploy,
    PostDeploy,
}

impl StageName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Lint => "lint",
            StageName::Test => "test",
            StageName::PreBuild => "pre-build",
            StageName::Build => "build",
            StageName::PostBuild => "post-build",
            StageName::PreDeploy => "pre-deploy",
            StageName::Deploy => "deploy",
            StageName::PostDeploy => "post-deploy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "lint" => Some(StageName::Lint),
            "test" => Some(StageName::Test),
            "pre-build" => Some(StageName::PreBuild),
            "build" => Some(StageName::Build),
            "post-build" => Some(StageName::PostBuild),
            "pre-deploy" => Some(StageName::PreDeploy),
            "deploy" => Some(StageName::Deploy),
            "post-deploy" => Some(StageName::PostDeploy),
            _ => None,
        }
    }

    pub fn canonical_order() -> Vec<Self> {
        vec![
            StageName::Lint,
            StageName::Test,
            StageName::PreBuild,
            StageName::Build,
            StageName::PostBuild,
            StageName::PreDeploy,
            StageName::Deploy,
            StageName::PostDeploy,
        ]
    }

    /// Whether this is a hook sub-stage rather than a core stage.
    pub fn is_hook_stage(&self) -> bool {
        matches!(
            self,
            StageName::PreBuild | StageName::PostBuild | StageName::PreDeploy | StageName::PostDeploy
        )
    }
}

impl std::fmt::Display for StageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a step does: run a shell command or invoke an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepAction {
    Run {
        run: String,
    },
    Uses {
        uses: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        with: BTreeMap<String, String>,
    },
}

/// A single pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Conditional guard expression.
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<String>,
    #[serde(flatten)]
    pub action: StepAction,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl Step {
    pub fn run(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            guard: None,
            action: StepAction::Run {
                run: command.into(),
            },
            env: BTreeMap::new(),
        }
    }

    pub fn uses(name: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            guard: None,
            action: StepAction::Uses {
                uses: action.into(),
                with: BTreeMap::new(),
            },
            env: BTreeMap::new(),
        }
    }

    /// Add an action input. Has no effect on `run` steps.
    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let StepAction::Uses { with, .. } = &mut self.action {
            with.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_guard(mut self, guard: impl Into<String>) -> Self {
        self.guard = Some(guard.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Human-readable form of the step's action.
    pub fn command(&self) -> &str {
        match &self.action {
            StepAction::Run { run } => run,
            StepAction::Uses { uses, .. } => uses,
        }
    }
}

/// Steps a fragment contributes to one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepContribution {
    /// Target stage name. Kept as a string so that catalogue integrity can
    /// be checked after loading.
    pub stage: String,
    pub steps: Vec<Step>,
}

impl StepContribution {
    pub fn stage_name(&self) -> Option<StageName> {
        StageName::from_str(&self.stage)
    }
}

/// A co-requisite: the named axis must hold one of `any_of`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub axis: Axis,
    pub any_of: Vec<String>,
}

impl Requirement {
    pub fn is_satisfied_by<'a>(&self, mut selected: impl Iterator<Item = &'a str>) -> bool {
        selected.any(|value| self.any_of.iter().any(|v| v == value))
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.any_of.as_slice() {
            [single] => write!(f, "{}:{}", self.axis, single),
            many => write!(f, "{} in [{}]", self.axis, many.join(", ")),
        }
    }
}

/// A fragment that must not co-occur with the declaring one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    #[serde(flatten)]
    pub fragment: FragmentRef,
    #[serde(default)]
    pub reason: Option<String>,
}

/// The contribution of one axis value to the final pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub axis: Axis,
    pub value: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Steps prepended to every job (toolchain setup, dependency install)
    #[serde(default)]
    pub setup: Vec<Step>,
    #[serde(default)]
    pub contributions: Vec<StepContribution>,
    #[serde(default)]
    pub requires: Vec<Requirement>,
    #[serde(default)]
    pub excludes: Vec<Exclusion>,
    /// Environment variables read or written, with their default values
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub secrets: BTreeSet<String>,
    /// Fields for the provider configuration document (region, cluster, ...)
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
}

impl Fragment {
    pub fn new(axis: Axis, value: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            axis,
            value: value.into(),
            name: name.into(),
            description: String::new(),
            setup: Vec::new(),
            contributions: Vec::new(),
            requires: Vec::new(),
            excludes: Vec::new(),
            env: BTreeMap::new(),
            secrets: BTreeSet::new(),
            settings: BTreeMap::new(),
        }
    }

    pub fn reference(&self) -> FragmentRef {
        FragmentRef::new(self.axis, self.value.clone())
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn setup(mut self, step: Step) -> Self {
        self.setup.push(step);
        self
    }

    /// Append a step to this fragment's contribution for `stage`.
    pub fn step(mut self, stage: StageName, step: Step) -> Self {
        match self
            .contributions
            .iter_mut()
            .find(|c| c.stage == stage.as_str())
        {
            Some(contribution) => contribution.steps.push(step),
            None => self.contributions.push(StepContribution {
                stage: stage.as_str().to_string(),
                steps: vec![step],
            }),
        }
        self
    }

    pub fn requires(mut self, axis: Axis, any_of: &[&str]) -> Self {
        self.requires.push(Requirement {
            axis,
            any_of: any_of.iter().map(|v| v.to_string()).collect(),
        });
        self
    }

    pub fn excludes(mut self, axis: Axis, value: impl Into<String>, reason: impl Into<String>) -> Self {
        self.excludes.push(Exclusion {
            fragment: FragmentRef::new(axis, value),
            reason: Some(reason.into()),
        });
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn secret(mut self, name: impl Into<String>) -> Self {
        self.secrets.insert(name.into());
        self
    }

    pub fn setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// The exclusion this fragment declares against `other`, if any.
    pub fn exclusion_of(&self, other: &FragmentRef) -> Option<&Exclusion> {
        self.excludes.iter().find(|e| &e.fragment == other)
    }

    /// Names of every environment variable and secret this fragment declares.
    pub fn declared_names(&self) -> impl Iterator<Item = &str> {
        self.env
            .keys()
            .map(String::as_str)
            .chain(self.secrets.iter().map(String::as_str))
    }
}
