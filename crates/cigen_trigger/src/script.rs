//! Shell rendition of [`classify`](crate::classify) for generated workflows.
//!
//! The script reads `EVENT_NAME`, `REF_TYPE`, `TAG` and `EMERGENCY_MODE` from
//! the environment and appends `intent`, `environment` and `skip_gates` to
//! `$GITHUB_OUTPUT`.

use crate::intent::IntentKind;
use crate::tag::{HOTFIX_TAG_PATTERN, STABLE_TAG_PATTERN};

/// Environment bindings the classifier step needs, as GitHub expressions.
pub fn classifier_env() -> Vec<(&'static str, &'static str)> {
    vec![
        ("EVENT_NAME", "${{ github.event_name }}"),
        ("REF_TYPE", "${{ github.ref_type }}"),
        ("TAG", "${{ github.event.release.tag_name || github.ref_name }}"),
    ]
}

/// Bash script computing the deployment intent of the current event.
pub fn classifier_script() -> String {
    let mut lines = vec![
        "set -euo pipefail".to_string(),
        format!("stable_re='{}'", STABLE_TAG_PATTERN),
        format!("hotfix_re='{}'", HOTFIX_TAG_PATTERN),
        format!("intent={}", IntentKind::NoOp.as_str()),
        "skip_gates=false".to_string(),
        "reason=''".to_string(),
        "tag=\"${TAG:-}\"".to_string(),
        "case \"${EVENT_NAME:-}\" in".to_string(),
        "  pull_request)".to_string(),
        format!("    intent={}", IntentKind::ValidateOnly.as_str()),
        "    ;;".to_string(),
        "  push)".to_string(),
        "    if [[ \"${REF_TYPE:-}\" != tag ]]; then".to_string(),
        "      reason=\"branch pushes do not deploy\"".to_string(),
        "    elif [[ \"$tag\" =~ $hotfix_re ]]; then".to_string(),
        "      reason=\"hotfix tag '$tag' is deployed when its release is published, not on push\""
            .to_string(),
        "    elif [[ \"$tag\" == *hotfix* ]]; then".to_string(),
        "      reason=\"tag '$tag' mentions hotfix but is not of the form v<semver>-hotfix.<n>\""
            .to_string(),
        "    elif [[ \"$tag\" =~ $stable_re ]]; then".to_string(),
        format!("      intent={}", IntentKind::DeployStaging.as_str()),
        "    else".to_string(),
        "      reason=\"tag '$tag' is not of the form v<semver>\"".to_string(),
        "    fi".to_string(),
        "    ;;".to_string(),
        "  release)".to_string(),
        "    if [[ \"$tag\" =~ $hotfix_re ]]; then".to_string(),
        format!("      intent={}", IntentKind::DeployProductionHotfix.as_str()),
        "      if [[ \"${EMERGENCY_MODE:-false}\" == true ]]; then skip_gates=true; fi".to_string(),
        "    elif [[ \"$tag\" == *hotfix* ]]; then".to_string(),
        "      reason=\"tag '$tag' mentions hotfix but is not of the form v<semver>-hotfix.<n>\""
            .to_string(),
        "    elif [[ \"$tag\" =~ $stable_re ]]; then".to_string(),
        format!("      intent={}", IntentKind::DeployProduction.as_str()),
        "    else".to_string(),
        "      reason=\"tag '$tag' is not of the form v<semver>\"".to_string(),
        "    fi".to_string(),
        "    ;;".to_string(),
        "  *)".to_string(),
        "    reason=\"${EVENT_NAME:-unknown} does not deploy; push a release tag instead\""
            .to_string(),
        "    ;;".to_string(),
        "esac".to_string(),
        "case \"$intent\" in".to_string(),
    ];

    for kind in IntentKind::all() {
        lines.push(format!(
            "  {}) environment={} ;;",
            kind.as_str(),
            kind.environment().unwrap_or("''")
        ));
    }
    lines.push("esac".to_string());

    lines.extend([
        "if [[ -n \"$reason\" ]]; then echo \"::warning::$reason\"; fi".to_string(),
        "echo \"intent=$intent (skip_gates=$skip_gates)\"".to_string(),
        "{".to_string(),
        "  echo \"intent=$intent\"".to_string(),
        "  echo \"environment=$environment\"".to_string(),
        "  echo \"skip_gates=$skip_gates\"".to_string(),
        "} >> \"$GITHUB_OUTPUT\"".to_string(),
    ]);

    let mut script = lines.join("\n");
    script.push('\n');
    script
}
