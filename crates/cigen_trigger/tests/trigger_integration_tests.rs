//! Integration tests for trigger classification and stage guards.

use cigen_trigger::{
    classify, DeploymentIntent, GuardDecision, StageGuard, StageKind, TriggerConfig,
    TriggerEvent, TriggerStateMachine,
};

fn events() -> Vec<TriggerEvent> {
    vec![
        TriggerEvent::PullRequest,
        TriggerEvent::WorkflowDispatch,
        TriggerEvent::tag_push("v1.0.0"),
        TriggerEvent::tag_push("v1.0.0-hotfix.1"),
        TriggerEvent::tag_push("nightly"),
        TriggerEvent::release_published("v1.0.0"),
        TriggerEvent::release_published("v1.0.0-rc.1"),
        TriggerEvent::release_published("v1.0.0-hotfix.3"),
        TriggerEvent::release_published("v1.0.0-hotfix"),
        TriggerEvent::release_published("1.0.0"),
    ]
}

#[test]
fn test_emergency_hotfix_skips_gates_but_deploys() {
    let machine = TriggerStateMachine::new(TriggerConfig::emergency());
    let result = machine.classify(&TriggerEvent::release_published("v3.2.1-hotfix.1"));

    assert_eq!(
        result.intent,
        DeploymentIntent::DeployProductionHotfix { skip_gates: true }
    );
    assert_eq!(result.intent.environment(), Some("production"));

    let gate = StageGuard::for_kind(StageKind::Gate);
    let build = StageGuard::for_kind(StageKind::Build);
    let deploy = StageGuard::for_kind(StageKind::Deploy);
    assert_eq!(gate.evaluate(&result.intent), GuardDecision::Skip);
    assert_eq!(build.evaluate(&result.intent), GuardDecision::Run);
    assert_eq!(deploy.evaluate(&result.intent), GuardDecision::Run);
}

#[test]
fn test_classification_is_idempotent() {
    for config in [TriggerConfig::default(), TriggerConfig::emergency()] {
        for event in events() {
            assert_eq!(classify(&event, &config), classify(&event, &config));
        }
    }
}

#[test]
fn test_only_hotfix_releases_can_skip_gates() {
    for event in events() {
        let result = classify(&event, &TriggerConfig::emergency());
        if result.intent.skips_gates() {
            assert!(
                matches!(&event, TriggerEvent::ReleasePublished(tag) if tag.contains("-hotfix.")),
                "{event} skipped gates"
            );
        }
    }
}

#[test]
fn test_emergency_mode_only_changes_hotfix_releases() {
    for event in events() {
        let normal = classify(&event, &TriggerConfig::default());
        let emergency = classify(&event, &TriggerConfig::emergency());
        if normal.intent != emergency.intent {
            assert_eq!(
                normal.intent,
                DeploymentIntent::DeployProductionHotfix { skip_gates: false }
            );
        }
    }
}

#[test]
fn test_no_op_always_explains_itself() {
    for event in events() {
        let result = classify(&event, &TriggerConfig::default());
        assert_eq!(
            result.intent == DeploymentIntent::NoOp,
            result.reason.is_some(),
            "{event}"
        );
    }
}

#[test]
fn test_config_from_yaml() {
    let config: TriggerConfig = serde_yaml::from_str("emergency_mode: true").unwrap();
    assert!(config.emergency_mode);

    let config: TriggerConfig = serde_yaml::from_str("{}").unwrap();
    assert!(!config.emergency_mode);
}
