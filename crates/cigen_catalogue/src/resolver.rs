//! Compatibility resolution.
//!
//! Turns a raw, string-keyed selection into a validated [`Selection`]. Every
//! violation is collected so that one report covers everything the user has
//! to fix.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::catalogue::FragmentCatalogue;
use crate::fragment::{Axis, Fragment, FragmentRef, Requirement};

/// A value in a raw selection: one string, or a list for `hooks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    One(String),
    Many(Vec<String>),
}

/// Unvalidated user input, keyed by axis name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSelection {
    entries: BTreeMap<String, RawValue>,
}

impl RawSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, axis: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(axis.into(), RawValue::One(value.into()));
        self
    }

    pub fn with_many<I, S>(mut self, axis: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.insert(
            axis.into(),
            RawValue::Many(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Set an axis if `value` is present.
    pub fn with_opt(self, axis: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.with(axis, value),
            None => self,
        }
    }

    /// Add hooks to whatever hooks are already selected.
    pub fn add_hooks<I, S>(mut self, hooks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = Axis::Hooks.as_str().to_string();
        let mut values = match self.entries.remove(&key) {
            Some(RawValue::One(v)) => vec![v],
            Some(RawValue::Many(vs)) => vs,
            None => Vec::new(),
        };
        values.extend(hooks.into_iter().map(Into::into));
        self.entries.insert(key, RawValue::Many(values));
        self
    }

    pub fn get(&self, axis: &str) -> Option<&RawValue> {
        self.entries.get(axis)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A single reason a raw selection cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Incompatibility {
    #[error("missing required axis '{0}'")]
    MissingAxis(Axis),

    #[error("unknown axis '{0}'")]
    UnknownAxis(String),

    #[error("axis '{axis}' takes a single value, got [{}]", .values.join(", "))]
    MultipleValues { axis: Axis, values: Vec<String> },

    #[error("unknown {axis} '{value}'")]
    UnknownFragment { axis: Axis, value: String },

    #[error("{first} conflicts with {second}: {reason}")]
    Conflict {
        first: FragmentRef,
        second: FragmentRef,
        reason: String,
    },

    #[error("{fragment} requires {missing}")]
    UnmetRequirement {
        fragment: FragmentRef,
        missing: Requirement,
    },
}

/// Every incompatibility found in one resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompatibilityReport {
    pub issues: Vec<Incompatibility>,
}

impl IncompatibilityReport {
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_conflict(&self) -> bool {
        self.issues
            .iter()
            .any(|i| matches!(i, Incompatibility::Conflict { .. }))
    }
}

impl std::fmt::Display for IncompatibilityReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "incompatible selection ({} issue", self.issues.len())?;
        if self.issues.len() != 1 {
            write!(f, "s")?;
        }
        write!(f, ")")?;
        for issue in &self.issues {
            write!(f, "\n  - {}", issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for IncompatibilityReport {}

/// A validated selection.
///
/// Only [`CompatibilityResolver::resolve`] constructs one, so holding a
/// `Selection` means every constraint in the catalogue it was resolved
/// against is satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    values: BTreeMap<Axis, String>,
    /// In catalogue declaration order
    hooks: Vec<String>,
}

impl Selection {
    /// The value of a single-valued axis.
    pub fn get(&self, axis: Axis) -> Option<&str> {
        self.values.get(&axis).map(String::as_str)
    }

    pub fn hooks(&self) -> &[String] {
        &self.hooks
    }

    pub fn has_hook(&self, hook: &str) -> bool {
        self.hooks.iter().any(|h| h == hook)
    }

    /// Selected fragments in composition precedence order.
    pub fn fragments(&self) -> Vec<FragmentRef> {
        let mut refs: Vec<FragmentRef> = self
            .values
            .iter()
            .map(|(axis, value)| FragmentRef::new(*axis, value.clone()))
            .collect();
        refs.extend(self.hooks.iter().map(|h| FragmentRef::new(Axis::Hooks, h.clone())));
        refs
    }

    /// Back to raw form, for persisting and later re-resolution.
    pub fn to_raw(&self) -> RawSelection {
        let mut raw = RawSelection::new();
        for (axis, value) in &self.values {
            raw = raw.with(axis.as_str(), value.clone());
        }
        if !self.hooks.is_empty() {
            raw = raw.with_many(Axis::Hooks.as_str(), self.hooks.clone());
        }
        raw
    }
}

/// Validates selections against a catalogue.
pub struct CompatibilityResolver<'a> {
    catalogue: &'a FragmentCatalogue,
}

impl<'a> CompatibilityResolver<'a> {
    pub fn new(catalogue: &'a FragmentCatalogue) -> Self {
        Self { catalogue }
    }

    /// Validate a raw selection.
    pub fn resolve(&self, raw: &RawSelection) -> Result<Selection, IncompatibilityReport> {
        let mut issues = Vec::new();

        for key in raw.entries.keys() {
            if Axis::from_str(key).is_none() {
                issues.push(Incompatibility::UnknownAxis(key.clone()));
            }
        }

        let by_axis = group_by_axis(raw);
        let mut values = BTreeMap::new();
        let mut hooks = BTreeSet::new();

        for axis in Axis::all() {
            let given: Vec<&str> = by_axis
                .get(&axis)
                .map(|vs| vs.iter().map(String::as_str).filter(|v| !is_blank(v)).collect())
                .unwrap_or_default();

            if axis.is_multi_valued() {
                for value in given {
                    if self.check_known(axis, value, &mut issues) {
                        hooks.insert(value.to_string());
                    }
                }
                continue;
            }

            match given.as_slice() {
                [] if axis.is_required() => issues.push(Incompatibility::MissingAxis(axis)),
                [] => {}
                [value] => {
                    if self.check_known(axis, value, &mut issues) {
                        values.insert(axis, value.to_string());
                    }
                }
                many => issues.push(Incompatibility::MultipleValues {
                    axis,
                    values: many.iter().map(|v| v.to_string()).collect(),
                }),
            }
        }

        let mut hooks: Vec<String> = hooks.into_iter().collect();
        hooks.sort_by_key(|h| self.catalogue.position(Axis::Hooks, h));

        let selected: Vec<&Fragment> = values
            .iter()
            .filter_map(|(axis, value)| self.catalogue.get(*axis, value))
            .chain(hooks.iter().filter_map(|h| self.catalogue.get(Axis::Hooks, h)))
            .collect();

        issues.extend(self.check_conflicts(&selected));
        issues.extend(self.check_requirements(&selected, &values, &hooks));

        if issues.is_empty() {
            let selection = Selection { values, hooks };
            info!(
                "Resolved selection: {}",
                selection
                    .fragments()
                    .iter()
                    .map(|r| r.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            Ok(selection)
        } else {
            debug!("Selection rejected with {} issues", issues.len());
            Err(IncompatibilityReport { issues })
        }
    }

    fn check_known(&self, axis: Axis, value: &str, issues: &mut Vec<Incompatibility>) -> bool {
        let known = self.catalogue.contains(axis, value);
        if !known {
            issues.push(Incompatibility::UnknownFragment {
                axis,
                value: value.to_string(),
            });
        }
        known
    }

    /// Every mutually exclusive pair, reported once in canonical order.
    fn check_conflicts(&self, selected: &[&Fragment]) -> Vec<Incompatibility> {
        let mut sorted: Vec<&Fragment> = selected.to_vec();
        sorted.sort_by_key(|f| f.reference());

        let mut conflicts = Vec::new();
        for (i, a) in sorted.iter().enumerate() {
            for b in &sorted[i + 1..] {
                let (a_ref, b_ref) = (a.reference(), b.reference());
                let exclusion = a.exclusion_of(&b_ref).or_else(|| b.exclusion_of(&a_ref));
                if let Some(exclusion) = exclusion {
                    conflicts.push(Incompatibility::Conflict {
                        first: a_ref,
                        second: b_ref,
                        reason: exclusion
                            .reason
                            .clone()
                            .unwrap_or_else(|| "mutually exclusive".to_string()),
                    });
                }
            }
        }
        conflicts
    }

    fn check_requirements(
        &self,
        selected: &[&Fragment],
        values: &BTreeMap<Axis, String>,
        hooks: &[String],
    ) -> Vec<Incompatibility> {
        let mut unmet = Vec::new();
        for fragment in selected {
            for requirement in &fragment.requires {
                let satisfied = if requirement.axis == Axis::Hooks {
                    requirement.is_satisfied_by(hooks.iter().map(String::as_str))
                } else {
                    requirement.is_satisfied_by(values.get(&requirement.axis).map(String::as_str).into_iter())
                };
                if !satisfied {
                    unmet.push(Incompatibility::UnmetRequirement {
                        fragment: fragment.reference(),
                        missing: requirement.clone(),
                    });
                }
            }
        }
        unmet
    }
}

fn group_by_axis(raw: &RawSelection) -> BTreeMap<Axis, Vec<String>> {
    let mut grouped: BTreeMap<Axis, Vec<String>> = BTreeMap::new();
    for (key, value) in &raw.entries {
        if let Some(axis) = Axis::from_str(key) {
            let values = grouped.entry(axis).or_default();
            match value {
                RawValue::One(v) => values.push(v.trim().to_string()),
                RawValue::Many(vs) => values.extend(vs.iter().map(|v| v.trim().to_string())),
            }
        }
    }
    grouped
}

fn is_blank(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("none")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::{StageName, Step};

    fn nextjs_on_ecs() -> RawSelection {
        RawSelection::new()
            .with("language", "nodejs")
            .with("packageManager", "npm")
            .with("framework", "nextjs")
            .with("provider", "aws")
            .with("service", "ecs")
    }

    #[test]
    fn test_resolve_valid_selection() {
        let catalogue = FragmentCatalogue::builtin();
        let selection = CompatibilityResolver::new(&catalogue)
            .resolve(&nextjs_on_ecs())
            .unwrap();

        assert_eq!(selection.get(Axis::Framework), Some("nextjs"));
        assert_eq!(selection.fragments().len(), 5);
        assert_eq!(selection.fragments()[0], FragmentRef::new(Axis::Language, "nodejs"));
    }

    #[test]
    fn test_framework_is_optional() {
        let catalogue = FragmentCatalogue::builtin();
        let raw = nextjs_on_ecs().with("framework", "none");
        let selection = CompatibilityResolver::new(&catalogue).resolve(&raw).unwrap();
        assert_eq!(selection.get(Axis::Framework), None);
    }

    #[test]
    fn test_all_violations_reported_together() {
        let catalogue = FragmentCatalogue::builtin();
        let raw = RawSelection::new()
            .with("language", "cobol")
            .with("provider", "aws")
            .with("service", "cloudrun")
            .with("runtime", "x");

        let report = CompatibilityResolver::new(&catalogue).resolve(&raw).unwrap_err();

        assert!(report.issues.contains(&Incompatibility::UnknownAxis("runtime".into())));
        assert!(report.issues.contains(&Incompatibility::MissingAxis(Axis::PackageManager)));
        assert!(report.issues.contains(&Incompatibility::UnknownFragment {
            axis: Axis::Language,
            value: "cobol".into()
        }));
        assert!(report.issues.iter().any(|i| matches!(
            i,
            Incompatibility::UnmetRequirement { fragment, .. } if fragment.value == "cloudrun"
        )));
    }

    #[test]
    fn test_single_valued_axis_rejects_lists() {
        let catalogue = FragmentCatalogue::builtin();
        let raw = nextjs_on_ecs().with_many("provider", ["aws", "gcp"]);
        let report = CompatibilityResolver::new(&catalogue).resolve(&raw).unwrap_err();
        assert!(matches!(
            report.issues[0],
            Incompatibility::MultipleValues { axis: Axis::Provider, .. }
        ));
    }

    #[test]
    fn test_hooks_follow_catalogue_order() {
        let catalogue = FragmentCatalogue::builtin();
        let raw = nextjs_on_ecs().add_hooks(["notify-slack", "hotfix", "hotfix", "security-scan"]);
        let selection = CompatibilityResolver::new(&catalogue).resolve(&raw).unwrap();
        assert_eq!(selection.hooks(), ["security-scan", "hotfix", "notify-slack"]);
    }

    #[test]
    fn test_hook_requirement() {
        let catalogue = FragmentCatalogue::builtin().with(
            Fragment::new(Axis::Hooks, "canary", "Canary")
                .requires(Axis::Hooks, &["smoke-test"])
                .step(StageName::PostDeploy, Step::run("Canary", "true")),
        );
        let resolver = CompatibilityResolver::new(&catalogue);

        assert!(resolver.resolve(&nextjs_on_ecs().add_hooks(["canary"])).is_err());
        assert!(resolver
            .resolve(&nextjs_on_ecs().add_hooks(["canary", "smoke-test"]))
            .is_ok());
    }

    #[test]
    fn test_to_raw_round_trip() {
        let catalogue = FragmentCatalogue::builtin();
        let resolver = CompatibilityResolver::new(&catalogue);
        let selection = resolver.resolve(&nextjs_on_ecs().add_hooks(["rollback"])).unwrap();
        assert_eq!(resolver.resolve(&selection.to_raw()).unwrap(), selection);
    }

    #[test]
    fn test_report_display_lists_issues() {
        let report = IncompatibilityReport {
            issues: vec![
                Incompatibility::MissingAxis(Axis::Language),
                Incompatibility::MissingAxis(Axis::Service),
            ],
        };
        let text = report.to_string();
        assert!(text.starts_with("incompatible selection (2 issues)"));
        assert!(text.contains("missing required axis 'service'"));
    }
}
