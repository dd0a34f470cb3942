//! The provider configuration document.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use cigen_catalogue::{Axis, FragmentCatalogue, Selection};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::CloudProvider;

fn app_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z][a-z0-9-]{0,62}$").expect("app name pattern is valid")
    })
}

/// Check that an app name is usable as a service, function and image name.
pub fn validate_app_name(name: &str) -> ProviderResult<()> {
    if app_name_pattern().is_match(name) && !name.ends_with('-') {
        Ok(())
    } else {
        Err(ProviderError::InvalidAppName(name.to_string()))
    }
}

/// Deployment target description, read by the generated workflows' owners
/// and by deploy tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider: String,
    pub service_type: String,
    pub target: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    pub app_name: String,
    /// Remaining provider and service settings.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, String>,
}

impl ProviderConfig {
    /// Build from the provider and service fragments of a selection.
    ///
    /// Service settings take precedence over provider settings. A missing
    /// region falls back to the provider's default.
    pub fn from_selection(
        catalogue: &FragmentCatalogue,
        selection: &Selection,
        app_name: &str,
    ) -> ProviderResult<Self> {
        validate_app_name(app_name)?;

        let provider = selection
            .get(Axis::Provider)
            .ok_or_else(|| ProviderError::NotSelected(Axis::Provider.to_string()))?;
        let service = selection
            .get(Axis::Service)
            .ok_or_else(|| ProviderError::NotSelected(Axis::Service.to_string()))?;

        let mut settings = BTreeMap::new();
        for (axis, value) in [(Axis::Provider, provider), (Axis::Service, service)] {
            if let Some(fragment) = catalogue.get(axis, value) {
                settings.extend(fragment.settings.clone());
            }
        }

        let region = match settings.remove("region") {
            Some(region) => region,
            None => CloudProvider::from_str(provider)
                .map(|p| p.default_region().to_string())
                .ok_or_else(|| ProviderError::MissingSetting {
                    fragment: format!("provider:{}", provider),
                    key: "region".to_string(),
                })?,
        };
        let target = settings
            .remove("target")
            .ok_or_else(|| ProviderError::MissingSetting {
                fragment: format!("service:{}", service),
                key: "target".to_string(),
            })?;
        let cluster = settings.remove("cluster");

        debug!("Provider document for {}/{} in {}", provider, service, region);

        Ok(Self {
            provider: provider.to_string(),
            service_type: service.to_string(),
            target,
            region,
            cluster,
            app_name: app_name.to_string(),
            settings,
        })
    }

    /// File name of this document inside the provider directory.
    pub fn file_name(&self) -> String {
        format!("{}.yaml", self.provider)
    }

    pub fn relative_path(&self, provider_dir: &Path) -> PathBuf {
        provider_dir.join(self.file_name())
    }

    pub fn validate(&self) -> ProviderResult<()> {
        validate_app_name(&self.app_name)?;
        for (field, value) in [
            ("provider", &self.provider),
            ("service_type", &self.service_type),
            ("target", &self.target),
            ("region", &self.region),
        ] {
            if value.trim().is_empty() {
                return Err(ProviderError::Invalid(format!("'{}' is empty", field)));
            }
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> ProviderResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml(content: &str) -> ProviderResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> ProviderResult<Self> {
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_names() {
        assert!(validate_app_name("storefront").is_ok());
        assert!(validate_app_name("api-v2").is_ok());
        assert!(validate_app_name("").is_err());
        assert!(validate_app_name("Api").is_err());
        assert!(validate_app_name("2fast").is_err());
        assert!(validate_app_name("trailing-").is_err());
        assert!(validate_app_name(&"a".repeat(64)).is_err());
    }

    #[test]
    fn test_from_yaml_rejects_empty_fields() {
        let yaml = "provider: aws\nservice_type: ecs\ntarget: ''\nregion: us-east-1\napp_name: shop\n";
        assert!(matches!(
            ProviderConfig::from_yaml(yaml),
            Err(ProviderError::Invalid(_))
        ));
    }
}
