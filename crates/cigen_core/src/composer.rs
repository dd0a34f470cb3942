//! Template composition.
//!
//! Merges the fragments of a resolved [`Selection`] into a single
//! [`PipelineDefinition`]. Fragments are applied in precedence order
//! (language, package manager, framework, provider, service, then hooks in
//! catalogue order). A non-hook step whose name already exists in its stage
//! replaces that step in place; hook steps always append.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info, warn};

use cigen_catalogue::{Axis, Fragment, FragmentCatalogue, Selection, StageName, Step};

use crate::pipeline::{PipelineDefinition, Stage};

/// Environment names every generated workflow defines.
pub const BUILTIN_ENV: &[&str] = &["APP_NAME", "EMERGENCY_MODE"];

fn env_reference() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\benv\.([A-Za-z_][A-Za-z0-9_]*)").expect("env reference pattern is valid")
    })
}

/// Composes pipelines from a catalogue.
pub struct Composer<'a> {
    catalogue: &'a FragmentCatalogue,
}

impl<'a> Composer<'a> {
    pub fn new(catalogue: &'a FragmentCatalogue) -> Self {
        Self { catalogue }
    }

    /// Compose a pipeline.
    ///
    /// # Panics
    ///
    /// Panics if a selected fragment is missing from the catalogue, targets a
    /// stage that does not exist, or is a non-hook fragment targeting a hook
    /// sub-stage. Catalogues loaded at runtime should pass
    /// [`FragmentCatalogue::verify`] first.
    pub fn compose(&self, selection: &Selection) -> PipelineDefinition {
        let refs = selection.fragments();
        info!("Composing pipeline from {} fragments", refs.len());

        let fragments: Vec<&Fragment> = refs
            .iter()
            .map(|r| {
                self.catalogue
                    .get_ref(r)
                    .unwrap_or_else(|| panic!("selected fragment {} is not in the catalogue", r))
            })
            .collect();

        let mut setup: Vec<Step> = Vec::new();
        let mut stages: BTreeMap<StageName, Vec<Step>> = BTreeMap::new();
        let mut env = BTreeMap::new();
        let mut secrets = BTreeSet::new();

        for fragment in &fragments {
            let is_hook = fragment.axis == Axis::Hooks;
            debug!("Applying {}", fragment.reference());

            for step in &fragment.setup {
                override_step(&mut setup, step.clone());
            }

            for contribution in &fragment.contributions {
                let stage = contribution.stage_name().unwrap_or_else(|| {
                    panic!(
                        "{} targets unknown stage '{}'",
                        fragment.reference(),
                        contribution.stage
                    )
                });
                if stage.is_hook_stage() && !is_hook {
                    panic!(
                        "{} is not a hook but targets hook stage '{}'",
                        fragment.reference(),
                        stage
                    );
                }

                let steps = stages.entry(stage).or_default();
                for step in &contribution.steps {
                    if is_hook {
                        append_hook_step(steps, step.clone(), &fragment.value);
                    } else {
                        override_step(steps, step.clone());
                    }
                }
            }

            for (key, value) in &fragment.env {
                env.insert(key.clone(), value.clone());
            }
            secrets.extend(fragment.secrets.iter().cloned());
        }

        let stages: Vec<Stage> = stages
            .into_iter()
            .map(|(name, steps)| Stage {
                steps,
                ..Stage::new(name)
            })
            .collect();

        let mut pipeline = PipelineDefinition {
            setup,
            stages,
            env,
            secrets,
            warnings: Vec::new(),
            fragments: refs,
        };
        pipeline.warnings = guard_warnings(&pipeline, &fragments);

        for warning in &pipeline.warnings {
            warn!("{}", warning);
        }
        info!(
            "Composed {} stages with {} steps",
            pipeline.stages.len(),
            pipeline.step_count()
        );

        pipeline
    }
}

fn override_step(steps: &mut Vec<Step>, step: Step) {
    match steps.iter_mut().find(|s| s.name == step.name) {
        Some(existing) => {
            debug!("Overriding step '{}'", step.name);
            *existing = step;
        }
        None => steps.push(step),
    }
}

fn append_hook_step(steps: &mut Vec<Step>, mut step: Step, hook: &str) {
    if steps.iter().any(|s| s.name == step.name) {
        let base = format!("{} ({})", step.name, hook);
        let mut candidate = base.clone();
        let mut n = 2;
        while steps.iter().any(|s| s.name == candidate) {
            candidate = format!("{} {}", base, n);
            n += 1;
        }
        debug!("Renaming hook step '{}' to '{}'", step.name, candidate);
        step.name = candidate;
    }
    steps.push(step);
}

fn guard_warnings(pipeline: &PipelineDefinition, fragments: &[&Fragment]) -> Vec<String> {
    let declared: BTreeSet<&str> = fragments
        .iter()
        .flat_map(|f| f.declared_names())
        .chain(BUILTIN_ENV.iter().copied())
        .collect();

    let setup = pipeline.setup.iter().map(|s| ("setup", s));
    let staged = pipeline
        .stages
        .iter()
        .flat_map(|stage| stage.steps.iter().map(move |s| (stage.name.as_str(), s)));

    let mut warnings = Vec::new();
    for (stage, step) in setup.chain(staged) {
        let Some(guard) = &step.guard else { continue };
        for capture in env_reference().captures_iter(guard) {
            let name = &capture[1];
            if !declared.contains(name) {
                warnings.push(format!(
                    "step '{}' in {} guards on env.{}, which no selected fragment declares",
                    step.name, stage, name
                ));
            }
        }
    }
    warnings
}
