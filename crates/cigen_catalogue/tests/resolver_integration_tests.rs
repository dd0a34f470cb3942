//! Integration tests for compatibility resolution.

use cigen_catalogue::{
    Axis, CompatibilityResolver, Fragment, FragmentCatalogue, FragmentRef, Incompatibility,
    RawSelection, StageName, Step,
};

fn base(language: &str, package_manager: &str) -> RawSelection {
    RawSelection::new()
        .with("language", language)
        .with("packageManager", package_manager)
        .with("provider", "aws")
        .with("service", "ecs")
}

#[test]
fn test_nextjs_on_ecs_resolves() {
    let catalogue = FragmentCatalogue::builtin();
    let raw = base("nodejs", "npm").with("framework", "nextjs");

    let selection = CompatibilityResolver::new(&catalogue).resolve(&raw).unwrap();

    assert_eq!(selection.get(Axis::Language), Some("nodejs"));
    assert_eq!(selection.get(Axis::PackageManager), Some("npm"));
    assert_eq!(selection.get(Axis::Service), Some("ecs"));
}

#[test]
fn test_poetry_requires_python() {
    let catalogue = FragmentCatalogue::builtin();
    let report = CompatibilityResolver::new(&catalogue)
        .resolve(&base("nodejs", "poetry"))
        .unwrap_err();

    assert_eq!(report.len(), 1);
    match &report.issues[0] {
        Incompatibility::UnmetRequirement { fragment, missing } => {
            assert_eq!(fragment, &FragmentRef::new(Axis::PackageManager, "poetry"));
            assert_eq!(missing.axis, Axis::Language);
            assert_eq!(missing.any_of, vec!["python".to_string()]);
        }
        other => panic!("expected UnmetRequirement, got {other:?}"),
    }
}

#[test]
fn test_lambda_bundler_conflict_in_either_order() {
    let catalogue = FragmentCatalogue::builtin();
    let resolver = CompatibilityResolver::new(&catalogue);

    let forward = RawSelection::new()
        .with("service", "lambda")
        .with("package-manager", "bundler")
        .with("language", "ruby")
        .with("provider", "aws");
    let backward = RawSelection::new()
        .with("provider", "aws")
        .with("language", "ruby")
        .with("package-manager", "bundler")
        .with("service", "lambda");

    let a = resolver.resolve(&forward).unwrap_err();
    let b = resolver.resolve(&backward).unwrap_err();

    assert_eq!(a, b);
    let conflicts: Vec<_> = a
        .issues
        .iter()
        .filter(|i| matches!(i, Incompatibility::Conflict { .. }))
        .collect();
    assert_eq!(conflicts.len(), 1, "a mutual exclusion is reported once");
}

#[test]
fn test_one_sided_exclusion_still_conflicts() {
    let catalogue = FragmentCatalogue::builtin().with(
        Fragment::new(Axis::Hooks, "no-lambda", "No Lambda")
            .excludes(Axis::Service, "lambda", "lambda unsupported")
            .step(StageName::PreDeploy, Step::run("Check", "true")),
    );
    let raw = RawSelection::new()
        .with("language", "python")
        .with("package-manager", "pip")
        .with("provider", "aws")
        .with("service", "lambda")
        .with("hooks", "no-lambda");

    let report = CompatibilityResolver::new(&catalogue).resolve(&raw).unwrap_err();

    assert!(report.has_conflict());
    assert!(report.to_string().contains("lambda unsupported"));
}

#[test]
fn test_resolution_is_deterministic() {
    let catalogue = FragmentCatalogue::builtin();
    let resolver = CompatibilityResolver::new(&catalogue);
    let raw = base("python", "npm").with("framework", "rails");

    let first = resolver.resolve(&raw).unwrap_err();
    let second = resolver.resolve(&raw).unwrap_err();

    assert_eq!(first, second);
    assert!(first.len() >= 3);
}

#[test]
fn test_raw_selection_from_yaml() {
    let raw: RawSelection = serde_yaml::from_str(
        r#"
language: go
packageManager: gomod
framework: gin
provider: gcp
service: cloudrun
hooks: [smoke-test, security-scan]
"#,
    )
    .unwrap();

    let catalogue = FragmentCatalogue::builtin();
    let selection = CompatibilityResolver::new(&catalogue).resolve(&raw).unwrap();

    assert_eq!(selection.hooks(), ["security-scan", "smoke-test"]);
}
