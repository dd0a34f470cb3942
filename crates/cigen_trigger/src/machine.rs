//! Event classification.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::intent::{DeploymentIntent, TriggerEvent};
use crate::tag::ReleaseTag;

/// Inputs to classification that do not come from the event itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Emergency mode lets hotfix releases bypass lint and test gates.
    #[serde(default)]
    pub emergency_mode: bool,
}

impl TriggerConfig {
    pub fn emergency() -> Self {
        Self {
            emergency_mode: true,
        }
    }
}

/// The intent chosen for an event, plus why when nothing happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(flatten)]
    pub intent: DeploymentIntent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Classification {
    fn of(intent: DeploymentIntent) -> Self {
        Self {
            intent,
            reason: None,
        }
    }

    fn no_op(reason: impl Into<String>) -> Self {
        Self {
            intent: DeploymentIntent::NoOp,
            reason: Some(reason.into()),
        }
    }
}

/// Map an event to a deployment intent.
///
/// Total and pure: every event yields exactly one intent and the same inputs
/// always give the same result.
pub fn classify(event: &TriggerEvent, config: &TriggerConfig) -> Classification {
    match event {
        TriggerEvent::PullRequest => Classification::of(DeploymentIntent::ValidateOnly),
        TriggerEvent::WorkflowDispatch => {
            Classification::no_op("workflow_dispatch does not deploy; push a release tag instead")
        }
        TriggerEvent::TagPush(tag) => match ReleaseTag::parse(tag) {
            Ok(ReleaseTag::Stable { .. }) => Classification::of(DeploymentIntent::DeployStaging),
            Ok(ReleaseTag::Hotfix { .. }) => Classification::no_op(format!(
                "hotfix tag '{}' is deployed when its release is published, not on push",
                tag
            )),
            Err(e) => Classification::no_op(e.to_string()),
        },
        TriggerEvent::ReleasePublished(tag) => match ReleaseTag::parse(tag) {
            Ok(ReleaseTag::Stable { .. }) => {
                Classification::of(DeploymentIntent::DeployProduction)
            }
            Ok(ReleaseTag::Hotfix { .. }) => {
                Classification::of(DeploymentIntent::DeployProductionHotfix {
                    skip_gates: config.emergency_mode,
                })
            }
            Err(e) => Classification::no_op(e.to_string()),
        },
    }
}

/// Classifier that reports its decisions through tracing.
#[derive(Debug, Clone, Default)]
pub struct TriggerStateMachine {
    config: TriggerConfig,
}

impl TriggerStateMachine {
    pub fn new(config: TriggerConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, event: &TriggerEvent) -> Classification {
        debug!("Classifying {} (emergency_mode={})", event, self.config.emergency_mode);
        let classification = classify(event, &self.config);

        match &classification.reason {
            Some(reason) => warn!("{} -> {}: {}", event, classification.intent, reason),
            None => info!("{} -> {}", event, classification.intent),
        }

        classification
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal() -> TriggerConfig {
        TriggerConfig::default()
    }

    #[test]
    fn test_pull_request_validates() {
        let result = classify(&TriggerEvent::PullRequest, &normal());
        assert_eq!(result.intent, DeploymentIntent::ValidateOnly);
        assert!(result.reason.is_none());
    }

    #[test]
    fn test_stable_tag_push_deploys_staging() {
        let result = classify(&TriggerEvent::tag_push("v1.4.0"), &normal());
        assert_eq!(result.intent, DeploymentIntent::DeployStaging);
    }

    #[test]
    fn test_hotfix_tag_push_is_no_op() {
        let result = classify(&TriggerEvent::tag_push("v1.4.0-hotfix.1"), &normal());
        assert_eq!(result.intent, DeploymentIntent::NoOp);
        assert!(result.reason.unwrap().contains("published"));
    }

    #[test]
    fn test_release_deploys_production() {
        let result = classify(&TriggerEvent::release_published("v1.4.0"), &normal());
        assert_eq!(result.intent, DeploymentIntent::DeployProduction);
    }

    #[test]
    fn test_hotfix_release_takes_gates_from_config() {
        let event = TriggerEvent::release_published("v1.4.0-hotfix.2");

        assert_eq!(
            classify(&event, &normal()).intent,
            DeploymentIntent::DeployProductionHotfix { skip_gates: false }
        );
        assert_eq!(
            classify(&event, &TriggerConfig::emergency()).intent,
            DeploymentIntent::DeployProductionHotfix { skip_gates: true }
        );
    }

    #[test]
    fn test_malformed_and_dispatch_are_no_op() {
        for event in [
            TriggerEvent::tag_push("release-1"),
            TriggerEvent::release_published("v1.2.3-hotfix"),
            TriggerEvent::tag_push(""),
            TriggerEvent::WorkflowDispatch,
        ] {
            let result = classify(&event, &TriggerConfig::emergency());
            assert_eq!(result.intent, DeploymentIntent::NoOp, "{event}");
            assert!(result.reason.is_some(), "{event}");
        }
    }

    #[test]
    fn test_classification_json_shape() {
        let result = classify(&TriggerEvent::WorkflowDispatch, &normal());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["intent"], "no-op");
        assert!(json["reason"].is_string());
    }
}
