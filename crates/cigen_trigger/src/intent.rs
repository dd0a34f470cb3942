//! Trigger events and deployment intents.

use serde::{Deserialize, Serialize};

/// A repository event that may start the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "event", content = "tag", rename_all = "snake_case")]
pub enum TriggerEvent {
    PullRequest,
    TagPush(String),
    ReleasePublished(String),
    WorkflowDispatch,
}

impl TriggerEvent {
    pub fn tag_push(tag: impl Into<String>) -> Self {
        TriggerEvent::TagPush(tag.into())
    }

    pub fn release_published(tag: impl Into<String>) -> Self {
        TriggerEvent::ReleasePublished(tag.into())
    }

    /// Build an event from a name as GitHub or a user would spell it.
    ///
    /// Returns `None` for unknown names or for tag events without a tag.
    pub fn from_parts(event: &str, tag: Option<&str>) -> Option<Self> {
        match (event.trim().to_lowercase().replace('-', "_").as_str(), tag) {
            ("pull_request" | "pr", _) => Some(TriggerEvent::PullRequest),
            ("workflow_dispatch" | "dispatch", _) => Some(TriggerEvent::WorkflowDispatch),
            ("tag_push" | "push" | "tag", Some(tag)) => Some(TriggerEvent::tag_push(tag)),
            ("release_published" | "release", Some(tag)) => {
                Some(TriggerEvent::release_published(tag))
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerEvent::PullRequest => write!(f, "pull_request"),
            TriggerEvent::TagPush(tag) => write!(f, "tag_push({})", tag),
            TriggerEvent::ReleasePublished(tag) => write!(f, "release_published({})", tag),
            TriggerEvent::WorkflowDispatch => write!(f, "workflow_dispatch"),
        }
    }
}

/// What the pipeline should do in response to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "kebab-case")]
pub enum DeploymentIntent {
    ValidateOnly,
    DeployStaging,
    DeployProduction,
    DeployProductionHotfix { skip_gates: bool },
    NoOp,
}

impl DeploymentIntent {
    pub fn kind(&self) -> IntentKind {
        match self {
            DeploymentIntent::ValidateOnly => IntentKind::ValidateOnly,
            DeploymentIntent::DeployStaging => IntentKind::DeployStaging,
            DeploymentIntent::DeployProduction => IntentKind::DeployProduction,
            DeploymentIntent::DeployProductionHotfix { .. } => IntentKind::DeployProductionHotfix,
            DeploymentIntent::NoOp => IntentKind::NoOp,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Whether lint/test gates are bypassed.
    pub fn skips_gates(&self) -> bool {
        matches!(self, DeploymentIntent::DeployProductionHotfix { skip_gates: true })
    }

    /// Target deployment environment, if the intent deploys.
    pub fn environment(&self) -> Option<&'static str> {
        self.kind().environment()
    }
}

impl std::fmt::Display for DeploymentIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeploymentIntent::DeployProductionHotfix { skip_gates } => {
                write!(f, "{} (skip_gates={})", self.as_str(), skip_gates)
            }
            _ => write!(f, "{}", self.as_str()),
        }
    }
}

/// A [`DeploymentIntent`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntentKind {
    ValidateOnly,
    DeployStaging,
    DeployProduction,
    DeployProductionHotfix,
    NoOp,
}

impl IntentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::ValidateOnly => "validate-only",
            IntentKind::DeployStaging => "deploy-staging",
            IntentKind::DeployProduction => "deploy-production",
            IntentKind::DeployProductionHotfix => "deploy-production-hotfix",
            IntentKind::NoOp => "no-op",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            IntentKind::ValidateOnly,
            IntentKind::DeployStaging,
            IntentKind::DeployProduction,
            IntentKind::DeployProductionHotfix,
            IntentKind::NoOp,
        ]
    }

    pub fn is_deploy(&self) -> bool {
        self.environment().is_some()
    }

    pub fn environment(&self) -> Option<&'static str> {
        match self {
            IntentKind::DeployStaging => Some("staging"),
            IntentKind::DeployProduction | IntentKind::DeployProductionHotfix => Some("production"),
            IntentKind::ValidateOnly | IntentKind::NoOp => None,
        }
    }
}

impl std::fmt::Display for IntentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_from_parts() {
        assert_eq!(
            TriggerEvent::from_parts("pull-request", None),
            Some(TriggerEvent::PullRequest)
        );
        assert_eq!(
            TriggerEvent::from_parts("release", Some("v1.0.0")),
            Some(TriggerEvent::release_published("v1.0.0"))
        );
        assert_eq!(TriggerEvent::from_parts("push", None), None);
        assert_eq!(TriggerEvent::from_parts("schedule", None), None);
    }

    #[test]
    fn test_intent_serializes_with_payload() {
        let json = serde_json::to_string(&DeploymentIntent::DeployProductionHotfix {
            skip_gates: true,
        })
        .unwrap();
        assert_eq!(json, r#"{"intent":"deploy-production-hotfix","skip_gates":true}"#);
    }

    #[test]
    fn test_environments() {
        assert_eq!(DeploymentIntent::DeployStaging.environment(), Some("staging"));
        assert_eq!(
            DeploymentIntent::DeployProductionHotfix { skip_gates: false }.environment(),
            Some("production")
        );
        assert_eq!(DeploymentIntent::ValidateOnly.environment(), None);
        assert!(!IntentKind::NoOp.is_deploy());
    }
}
