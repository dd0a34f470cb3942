//! Stage guards.
//!
//! Every pipeline stage carries a guard that decides, from the deployment
//! intent, whether the stage runs. Gates (lint, test) are the only stages an
//! emergency hotfix may skip.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::intent::{DeploymentIntent, IntentKind};

/// Default location of the classifier outputs inside a workflow.
pub const CLASSIFY_OUTPUTS: &str = "needs.classify.outputs";

/// Role a stage plays with respect to deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Safety gate (lint, test).
    Gate,
    /// Produces artifacts (pre-build, build, post-build).
    Build,
    /// Touches an environment (pre-deploy, deploy, post-deploy).
    Deploy,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Gate => "gate",
            StageKind::Build => "build",
            StageKind::Deploy => "deploy",
        }
    }
}

/// Result of evaluating a guard against an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Run,
    Skip,
}

/// Which intents activate a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageGuard {
    pub activates_on: BTreeSet<IntentKind>,
    /// Skipped when the intent bypasses gates.
    pub gated: bool,
}

impl StageGuard {
    pub fn for_kind(kind: StageKind) -> Self {
        let deploys = [
            IntentKind::DeployStaging,
            IntentKind::DeployProduction,
            IntentKind::DeployProductionHotfix,
        ];

        match kind {
            StageKind::Gate | StageKind::Build => Self {
                activates_on: std::iter::once(IntentKind::ValidateOnly)
                    .chain(deploys)
                    .collect(),
                gated: kind == StageKind::Gate,
            },
            StageKind::Deploy => Self {
                activates_on: deploys.into_iter().collect(),
                gated: false,
            },
        }
    }

    /// Drop an intent from the activation set.
    pub fn without(mut self, kind: IntentKind) -> Self {
        self.activates_on.remove(&kind);
        self
    }

    /// Keep only the given intents in the activation set.
    pub fn restricted_to(mut self, kinds: &[IntentKind]) -> Self {
        self.activates_on.retain(|k| kinds.contains(k));
        self
    }

    pub fn is_never(&self) -> bool {
        self.activates_on.is_empty()
    }

    pub fn evaluate(&self, intent: &DeploymentIntent) -> GuardDecision {
        if !self.activates_on.contains(&intent.kind()) {
            return GuardDecision::Skip;
        }
        if self.gated && intent.skips_gates() {
            return GuardDecision::Skip;
        }
        GuardDecision::Run
    }

    /// Render as a GitHub Actions expression body over the classifier outputs,
    /// e.g. `needs.classify.outputs`.
    pub fn expression(&self, outputs: &str) -> String {
        if self.is_never() {
            return "false".to_string();
        }

        let intents = self
            .activates_on
            .iter()
            .map(|k| format!("{}.intent == '{}'", outputs, k.as_str()))
            .collect::<Vec<_>>()
            .join(" || ");

        let gates_can_skip =
            self.gated && self.activates_on.contains(&IntentKind::DeployProductionHotfix);

        if gates_can_skip {
            format!("({}) && {}.skip_gates != 'true'", intents, outputs)
        } else if self.activates_on.len() > 1 {
            format!("({})", intents)
        } else {
            intents
        }
    }
}
