//! Cloud providers with builtin defaults.

/// Cloud providers cigen knows defaults for.
///
/// Catalogue overlays may add other providers; those must declare every
/// setting themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudProvider {
    Aws,
    Azure,
    Gcp,
}

impl CloudProvider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "aws" => Some(CloudProvider::Aws),
            "azure" => Some(CloudProvider::Azure),
            "gcp" => Some(CloudProvider::Gcp),
            _ => None,
        }
    }

    /// Region used when the provider fragment does not set one.
    pub fn default_region(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "us-east-1",
            CloudProvider::Azure => "eastus",
            CloudProvider::Gcp => "us-central1",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(CloudProvider::from_str("AWS"), Some(CloudProvider::Aws));
        assert_eq!(CloudProvider::from_str("gcp"), Some(CloudProvider::Gcp));
        assert_eq!(CloudProvider::from_str("digitalocean"), None);
    }

    #[test]
    fn test_default_region() {
        assert_eq!(CloudProvider::Azure.default_region(), "eastus");
        assert_eq!(CloudProvider::Gcp.default_region(), "us-central1");
    }
}
