//! The fragment catalogue.
//!
//! An explicitly constructed, read-only registry of fragments. Callers build
//! one at startup (usually [`FragmentCatalogue::builtin`], optionally with
//! overlays from disk) and pass it by reference to the resolver and the
//! composer.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::error::{CatalogueError, CatalogueResult};
use crate::fragment::{Axis, Fragment, FragmentRef};

/// Registry of fragments keyed by axis, in declaration order per axis.
#[derive(Debug, Clone, Default)]
pub struct FragmentCatalogue {
    fragments: BTreeMap<Axis, Vec<Fragment>>,
}

impl FragmentCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fragment.
    ///
    /// A fragment with the same axis and value replaces the existing entry
    /// in place, keeping its declaration position.
    pub fn register(&mut self, fragment: Fragment) {
        let entries = self.fragments.entry(fragment.axis).or_default();
        match entries.iter_mut().find(|f| f.value == fragment.value) {
            Some(existing) => {
                debug!("Replacing fragment {}", fragment.reference());
                *existing = fragment;
            }
            None => {
                debug!("Registering fragment {}", fragment.reference());
                entries.push(fragment);
            }
        }
    }

    pub fn with(mut self, fragment: Fragment) -> Self {
        self.register(fragment);
        self
    }

    /// Register every fragment of `overlay`, replacing same-named entries.
    pub fn merge(&mut self, overlay: FragmentCatalogue) {
        for fragment in overlay.fragments.into_values().flatten() {
            self.register(fragment);
        }
    }

    /// Get a fragment by axis and value.
    pub fn get(&self, axis: Axis, value: &str) -> Option<&Fragment> {
        self.fragments
            .get(&axis)
            .and_then(|entries| entries.iter().find(|f| f.value == value))
    }

    pub fn get_ref(&self, reference: &FragmentRef) -> Option<&Fragment> {
        self.get(reference.axis, &reference.value)
    }

    pub fn contains(&self, axis: Axis, value: &str) -> bool {
        self.get(axis, value).is_some()
    }

    /// Fragments of one axis in declaration order.
    pub fn values(&self, axis: Axis) -> impl Iterator<Item = &Fragment> {
        self.fragments.get(&axis).into_iter().flatten()
    }

    /// Declaration position of a fragment within its axis.
    pub fn position(&self, axis: Axis, value: &str) -> Option<usize> {
        self.fragments
            .get(&axis)
            .and_then(|entries| entries.iter().position(|f| f.value == value))
    }

    /// All fragments, axis by axis.
    pub fn list(&self) -> Vec<&Fragment> {
        self.fragments.values().flatten().collect()
    }

    pub fn len(&self) -> usize {
        self.fragments.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check that every fragment is well formed and only references things
    /// that exist.
    ///
    /// Collects every problem rather than stopping at the first one.
    pub fn verify(&self) -> CatalogueResult<()> {
        let mut issues = Vec::new();

        for fragment in self.list() {
            let id = fragment.reference();

            if fragment.axis == Axis::Hooks && !fragment.setup.is_empty() {
                issues.push(format!("{}: hook fragments cannot contribute setup steps", id));
            }
            check_unique_names(&id, "setup", fragment.setup.iter().map(|s| s.name.as_str()), &mut issues);

            for contribution in &fragment.contributions {
                let stage = match contribution.stage_name() {
                    Some(stage) => stage,
                    None => {
                        issues.push(format!(
                            "{}: references undefined stage '{}'",
                            id, contribution.stage
                        ));
                        continue;
                    }
                };

                if stage.is_hook_stage() && fragment.axis != Axis::Hooks {
                    issues.push(format!(
                        "{}: only hooks may contribute to the '{}' sub-stage",
                        id, stage
                    ));
                }
                if contribution.steps.is_empty() {
                    issues.push(format!("{}: empty contribution to stage '{}'", id, stage));
                }
                check_unique_names(
                    &id,
                    stage.as_str(),
                    contribution.steps.iter().map(|s| s.name.as_str()),
                    &mut issues,
                );
            }

            let mut stages = HashSet::new();
            for contribution in &fragment.contributions {
                if !stages.insert(contribution.stage.as_str()) {
                    issues.push(format!(
                        "{}: more than one contribution to stage '{}'",
                        id, contribution.stage
                    ));
                }
            }

            for requirement in &fragment.requires {
                if requirement.any_of.is_empty() {
                    issues.push(format!("{}: empty requirement on {}", id, requirement.axis));
                }
                for value in &requirement.any_of {
                    if !self.contains(requirement.axis, value) {
                        issues.push(format!(
                            "{}: requires unknown fragment {}:{}",
                            id, requirement.axis, value
                        ));
                    }
                }
            }

            for exclusion in &fragment.excludes {
                if exclusion.fragment == id {
                    issues.push(format!("{}: excludes itself", id));
                } else if self.get_ref(&exclusion.fragment).is_none() {
                    issues.push(format!("{}: excludes unknown fragment {}", id, exclusion.fragment));
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(CatalogueError::Integrity { issues })
        }
    }
}

fn check_unique_names<'a>(
    id: &FragmentRef,
    scope: &str,
    names: impl Iterator<Item = &'a str>,
    issues: &mut Vec<String>,
) {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            issues.push(format!("{}: duplicate step name '{}' in {}", id, name, scope));
        }
    }
}
