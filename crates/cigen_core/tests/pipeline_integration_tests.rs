//! Integration tests for composing and emitting pipelines from the builtin
//! catalogue.

use std::collections::BTreeSet;

use cigen_catalogue::{CompatibilityResolver, FragmentCatalogue, RawSelection, StageName, StepAction};
use cigen_core::{
    Composer, EmitOptions, Emitter, PipelineDefinition, Workflow, HOTFIX_WORKFLOW, MAIN_WORKFLOW,
    ROLLBACK_WORKFLOW,
};

fn nextjs_on_ecs() -> RawSelection {
    RawSelection::new()
        .with("language", "nodejs")
        .with("package-manager", "npm")
        .with("framework", "nextjs")
        .with("provider", "aws")
        .with("service", "ecs")
}

fn compose(raw: &RawSelection) -> PipelineDefinition {
    let catalogue = FragmentCatalogue::builtin();
    let selection = CompatibilityResolver::new(&catalogue).resolve(raw).unwrap();
    Composer::new(&catalogue).compose(&selection)
}

fn parse(content: &str) -> Workflow {
    serde_yaml::from_str(content).unwrap()
}

#[test]
fn test_framework_overrides_build_in_place() {
    let pipeline = compose(&nextjs_on_ecs());

    let build = pipeline.stage(StageName::Build).unwrap();
    assert_eq!(build.step_names(), vec!["Build"]);
    assert_eq!(build.steps[0].command(), "npx next build");

    let lint = pipeline.stage(StageName::Lint).unwrap();
    assert_eq!(lint.steps[0].command(), "npx next lint");

    let test = pipeline.stage(StageName::Test).unwrap();
    assert_eq!(test.steps[0].command(), "npm test");

    assert_eq!(
        pipeline.stage_names(),
        vec![StageName::Lint, StageName::Test, StageName::Build, StageName::Deploy]
    );
}

#[test]
fn test_step_names_unique_per_stage() {
    let raw = nextjs_on_ecs().add_hooks([
        "security-scan",
        "hotfix",
        "rollback",
        "smoke-test",
        "notify-slack",
    ]);
    let pipeline = compose(&raw);

    for stage in &pipeline.stages {
        let names = stage.step_names();
        let unique: BTreeSet<_> = names.iter().collect();
        assert_eq!(names.len(), unique.len(), "duplicate step in {}", stage.name);
    }

    let post_deploy = pipeline.stage(StageName::PostDeploy).unwrap();
    assert_eq!(
        post_deploy.step_names(),
        vec!["Record deployed version", "Smoke test", "Notify Slack"]
    );
}

#[test]
fn test_env_and_secrets_are_merged() {
    let pipeline = compose(&nextjs_on_ecs().add_hooks(["notify-slack"]));

    assert_eq!(pipeline.env["NODE_VERSION"], "20");
    assert_eq!(pipeline.env["NEXT_TELEMETRY_DISABLED"], "1");
    assert!(pipeline.secrets.contains("AWS_ACCESS_KEY_ID"));
    assert!(pipeline.secrets.contains("SLACK_WEBHOOK_URL"));
    assert!(pipeline.warnings.is_empty());
}

#[test]
fn test_every_step_emitted_exactly_once() {
    let pipeline = compose(&nextjs_on_ecs().add_hooks(["security-scan", "smoke-test"]));
    let output = Emitter::new(EmitOptions::new("storefront"))
        .emit(&pipeline)
        .unwrap();
    let workflow = parse(&output.document(MAIN_WORKFLOW).unwrap().content);

    let mut expected = vec!["classify".to_string()];
    expected.extend(pipeline.stages.iter().map(|s| s.name.as_str().to_string()));
    assert_eq!(workflow.job_ids(), expected);

    for stage in &pipeline.stages {
        let job = workflow.job(stage.name.as_str()).unwrap();
        let emitted: Vec<_> = job.steps.iter().skip(1 + pipeline.setup.len()).collect();
        assert_eq!(emitted.len(), stage.steps.len());
        for (emitted, declared) in emitted.iter().zip(&stage.steps) {
            assert_eq!(*emitted, declared);
        }
    }
}

#[test]
fn test_main_workflow_triggers_and_guards() {
    let pipeline = compose(&nextjs_on_ecs());
    let output = Emitter::new(EmitOptions::new("storefront"))
        .emit(&pipeline)
        .unwrap();
    assert_eq!(output.documents.len(), 1);

    let content = &output.document(MAIN_WORKFLOW).unwrap().content;
    assert!(content.contains("# Required secrets: AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY"));

    let workflow = parse(content);
    let triggers = workflow.triggers.as_mapping().unwrap();
    assert!(triggers.contains_key("pull_request"));
    assert!(triggers.contains_key("push"));
    assert!(triggers.contains_key("release"));

    let classify = workflow.job("classify").unwrap();
    assert_eq!(classify.outputs.len(), 3);

    let lint = workflow.job("lint").unwrap();
    assert_eq!(lint.needs, vec!["classify"]);
    assert!(lint.condition.unwrap().contains("skip_gates != 'true'"));

    let deploy = workflow.job("deploy").unwrap();
    assert_eq!(deploy.needs, vec!["classify", "build"]);
    assert_eq!(
        deploy.environment.as_deref(),
        Some("${{ needs.classify.outputs.environment }}")
    );
    let condition = deploy.condition.unwrap();
    assert!(condition.contains("deploy-production-hotfix"));
    assert!(!condition.contains("skip_gates"));
}

#[test]
fn test_hotfix_hook_emits_separate_workflow() {
    let pipeline = compose(&nextjs_on_ecs().add_hooks(["hotfix"]));
    let output = Emitter::new(EmitOptions::new("storefront"))
        .emit(&pipeline)
        .unwrap();

    let main = parse(&output.document(MAIN_WORKFLOW).unwrap().content);
    let deploy = main.job("deploy").unwrap();
    assert!(!deploy.condition.unwrap().contains("deploy-production-hotfix"));

    let hotfix = parse(&output.document(HOTFIX_WORKFLOW).unwrap().content);
    let triggers = hotfix.triggers.as_mapping().unwrap();
    assert_eq!(triggers.len(), 1);
    assert!(hotfix
        .job("classify")
        .unwrap()
        .condition
        .unwrap()
        .contains("-hotfix."));

    let announce = hotfix.job("pre-deploy").unwrap();
    assert_eq!(announce.environment.as_deref(), Some("production"));
    assert!(announce.steps.iter().any(|s| s.name == "Announce hotfix"));

    let test = hotfix.job("test").unwrap();
    let condition = test.condition.unwrap();
    assert!(condition.contains("deploy-production-hotfix"));
    assert!(condition.contains("skip_gates != 'true'"));
    assert!(!condition.contains("validate-only"));
}

#[test]
fn test_rollback_hook_emits_dispatch_workflow() {
    let pipeline = compose(&nextjs_on_ecs().add_hooks(["rollback"]));
    let output = Emitter::new(EmitOptions::new("storefront"))
        .emit(&pipeline)
        .unwrap();
    assert!(output.document(HOTFIX_WORKFLOW).is_none());

    let rollback = parse(&output.document(ROLLBACK_WORKFLOW).unwrap().content);
    assert!(rollback
        .triggers
        .as_mapping()
        .unwrap()
        .contains_key("workflow_dispatch"));
    assert_eq!(
        rollback.job_ids(),
        vec!["validate-tag", "build", "deploy", "post-deploy"]
    );
    assert_eq!(rollback.env["ROLLBACK_TAG"], "${{ inputs.tag }}");

    // The tag is checked against a full-history checkout, which carries the
    // job token, so private repositories work.
    let validate = rollback.job("validate-tag").unwrap();
    assert_eq!(validate.steps.len(), 2);
    match &validate.steps[0].action {
        StepAction::Uses { uses, with } => {
            assert_eq!(uses, "actions/checkout@v4");
            assert_eq!(with.get("fetch-depth").map(String::as_str), Some("0"));
        }
        other => panic!("expected checkout, got {other:?}"),
    }
    let check = validate.steps[1].command();
    assert!(check.contains("git rev-parse --verify --quiet \"refs/tags/$ROLLBACK_TAG^{commit}\""));
    assert!(!check.contains("ls-remote"));

    let deploy = rollback.job("deploy").unwrap();
    assert_eq!(deploy.needs, vec!["build"]);
    assert!(deploy.condition.is_none());
}

#[test]
fn test_guard_warnings_surface_on_output() {
    let raw = RawSelection::new()
        .with("language", "python")
        .with("package-manager", "pip")
        .with("provider", "aws")
        .with("service", "lambda");
    let pipeline = compose(&raw);
    assert!(pipeline.warnings.is_empty(), "LAMBDA_PUBLISH is declared");

    let catalogue = FragmentCatalogue::builtin().with(
        cigen_catalogue::Fragment::new(cigen_catalogue::Axis::Hooks, "canary", "Canary")
            .step(
                StageName::PostDeploy,
                cigen_catalogue::Step::run("Canary", "true").with_guard("env.CANARY_PERCENT != ''"),
            ),
    );
    let selection = CompatibilityResolver::new(&catalogue)
        .resolve(&raw.add_hooks(["canary"]))
        .unwrap();
    let pipeline = Composer::new(&catalogue).compose(&selection);
    let output = Emitter::new(EmitOptions::new("fn")).emit(&pipeline).unwrap();

    assert_eq!(output.warnings.len(), 1);
    assert!(output.warnings[0].contains("CANARY_PERCENT"));
}
