//! Integration tests for provider documents.

use std::path::Path;

use cigen_catalogue::{
    Axis, CompatibilityResolver, Fragment, FragmentCatalogue, RawSelection, Selection, StageName,
    Step,
};
use cigen_provider::{ProviderConfig, ProviderError};
use tempfile::TempDir;

fn resolve(catalogue: &FragmentCatalogue, provider: &str, service: &str) -> Selection {
    let raw = RawSelection::new()
        .with("language", "go")
        .with("package-manager", "gomod")
        .with("provider", provider)
        .with("service", service);
    CompatibilityResolver::new(catalogue).resolve(&raw).unwrap()
}

#[test]
fn test_eks_document() {
    let catalogue = FragmentCatalogue::builtin();
    let config =
        ProviderConfig::from_selection(&catalogue, &resolve(&catalogue, "aws", "eks"), "orders")
            .unwrap();

    assert_eq!(config.provider, "aws");
    assert_eq!(config.service_type, "eks");
    assert_eq!(config.target, "deployment");
    assert_eq!(config.region, "us-east-1");
    assert_eq!(config.cluster.as_deref(), Some("default"));
    assert!(config.settings.is_empty());
    assert_eq!(
        config.relative_path(Path::new("deploy")),
        Path::new("deploy/aws.yaml")
    );
}

#[test]
fn test_yaml_round_trip_through_disk() {
    let catalogue = FragmentCatalogue::builtin();
    let config = ProviderConfig::from_selection(
        &catalogue,
        &resolve(&catalogue, "azure", "appservice"),
        "portal",
    )
    .unwrap();
    assert_eq!(config.cluster, None);
    assert_eq!(config.settings["resource_group"], "app-rg");

    let temp = TempDir::new().unwrap();
    let path = temp.path().join(config.file_name());
    std::fs::write(&path, config.to_yaml().unwrap()).unwrap();

    assert_eq!(ProviderConfig::load(&path).unwrap(), config);
}

#[test]
fn test_clustered_round_trip_through_disk() {
    let catalogue = FragmentCatalogue::builtin();
    let temp = TempDir::new().unwrap();

    for (provider, service) in [("gcp", "gke"), ("azure", "aks")] {
        let config = ProviderConfig::from_selection(
            &catalogue,
            &resolve(&catalogue, provider, service),
            "ledger",
        )
        .unwrap();
        assert_eq!(config.cluster.as_deref(), Some("default"), "{service}");

        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("cluster: default"), "{yaml}");

        let path = temp.path().join(config.file_name());
        std::fs::write(&path, yaml).unwrap();
        assert_eq!(ProviderConfig::load(&path).unwrap(), config, "{service}");
    }
}

#[test]
fn test_overlay_provider_without_region() {
    let catalogue = FragmentCatalogue::builtin()
        .with(
            Fragment::new(Axis::Provider, "fly", "Fly.io")
                .step(StageName::Deploy, Step::run("Install flyctl", "curl -L https://fly.io/install.sh | sh")),
        )
        .with(
            Fragment::new(Axis::Service, "machines", "Fly Machines")
                .requires(Axis::Provider, &["fly"])
                .setting("target", "app")
                .step(StageName::Deploy, Step::run("Deploy service", "flyctl deploy")),
        );

    let err = ProviderConfig::from_selection(
        &catalogue,
        &resolve(&catalogue, "fly", "machines"),
        "edge",
    )
    .unwrap_err();

    match err {
        ProviderError::MissingSetting { fragment, key } => {
            assert_eq!(fragment, "provider:fly");
            assert_eq!(key, "region");
        }
        other => panic!("expected MissingSetting, got {other:?}"),
    }
}

#[test]
fn test_invalid_app_name() {
    let catalogue = FragmentCatalogue::builtin();
    let err = ProviderConfig::from_selection(
        &catalogue,
        &resolve(&catalogue, "gcp", "cloudrun"),
        "My App",
    )
    .unwrap_err();
    assert!(matches!(err, ProviderError::InvalidAppName(_)));
}
