//! Release tag parsing.
//!
//! Release tags are `v<semver>`; hotfix tags are `v<semver>-hotfix.<n>`.
//! The same pattern strings are embedded in the generated workflows, so the
//! Rust classifier and the shell classifier agree.

use std::sync::OnceLock;

use regex::Regex;
use semver::Version;
use thiserror::Error;

/// Extended regular expression for a stable release tag.
///
/// Follows the semver grammar, with numeric components capped at 19 digits so
/// every match fits the `u64` fields of [`Version`].
pub const STABLE_TAG_PATTERN: &str = r"^v(0|[1-9][0-9]{0,18})\.(0|[1-9][0-9]{0,18})\.(0|[1-9][0-9]{0,18})(-(0|[1-9][0-9]*|[0-9]*[A-Za-z-][0-9A-Za-z-]*)(\.(0|[1-9][0-9]*|[0-9]*[A-Za-z-][0-9A-Za-z-]*))*)?(\+[0-9A-Za-z-]+(\.[0-9A-Za-z-]+)*)?$";

/// Extended regular expression for a hotfix tag.
pub const HOTFIX_TAG_PATTERN: &str = r"^v(0|[1-9][0-9]{0,18})\.(0|[1-9][0-9]{0,18})\.(0|[1-9][0-9]{0,18})-hotfix\.(0|[1-9][0-9]{0,18})(\+[0-9A-Za-z-]+(\.[0-9A-Za-z-]+)*)?$";

/// Substring every hotfix tag contains.
pub const HOTFIX_MARKER: &str = "-hotfix.";

fn stable_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(STABLE_TAG_PATTERN).expect("stable tag pattern is valid"))
}

fn hotfix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(HOTFIX_TAG_PATTERN).expect("hotfix tag pattern is valid"))
}

/// Why a tag name is not a usable release tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("tag '{0}' is empty")]
    Empty(String),

    #[error("tag '{0}' mentions hotfix but is not of the form v<semver>-hotfix.<n>")]
    MalformedHotfix(String),

    #[error("tag '{0}' is not of the form v<semver>")]
    NotARelease(String),

    #[error("tag '{tag}' is not valid semver: {message}")]
    InvalidSemver { tag: String, message: String },
}

/// A parsed release tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseTag {
    Stable { version: Version },
    Hotfix { version: Version, number: u64 },
}

impl ReleaseTag {
    pub fn parse(name: &str) -> Result<Self, TagError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TagError::Empty(name.to_string()));
        }

        if hotfix_pattern().is_match(name) {
            let version = parse_version(name)?;
            let number = version
                .pre
                .as_str()
                .strip_prefix("hotfix.")
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| TagError::MalformedHotfix(name.to_string()))?;
            return Ok(ReleaseTag::Hotfix { version, number });
        }

        if name.contains("hotfix") {
            return Err(TagError::MalformedHotfix(name.to_string()));
        }

        if stable_pattern().is_match(name) {
            return Ok(ReleaseTag::Stable {
                version: parse_version(name)?,
            });
        }

        Err(TagError::NotARelease(name.to_string()))
    }

    pub fn is_hotfix(&self) -> bool {
        matches!(self, ReleaseTag::Hotfix { .. })
    }

    pub fn version(&self) -> &Version {
        match self {
            ReleaseTag::Stable { version } | ReleaseTag::Hotfix { version, .. } => version,
        }
    }
}

fn parse_version(name: &str) -> Result<Version, TagError> {
    let raw = name.strip_prefix('v').unwrap_or(name);
    Version::parse(raw).map_err(|e| TagError::InvalidSemver {
        tag: name.to_string(),
        message: e.to_string(),
    })
}
