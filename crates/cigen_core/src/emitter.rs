//! Workflow emission.
//!
//! Renders a [`PipelineDefinition`] as GitHub Actions workflow documents:
//!
//! - `pipeline.yml` for pull requests, tag pushes and published releases,
//!   with a leading `classify` job computing the deployment intent;
//! - `hotfix.yml` when the `hotfix` hook is selected, running only for
//!   releases whose tag contains `-hotfix.`;
//! - `rollback.yml` when the `rollback` hook is selected, a manually
//!   dispatched redeploy of a given tag.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use cigen_catalogue::Step;
use cigen_trigger::{
    classifier_env, classifier_script, IntentKind, StageGuard, StageKind, CLASSIFY_OUTPUTS,
    HOTFIX_MARKER, HOTFIX_TAG_PATTERN, STABLE_TAG_PATTERN,
};

use crate::error::CoreResult;
use crate::pipeline::{PipelineDefinition, Stage};

pub const MAIN_WORKFLOW: &str = "pipeline.yml";
pub const HOTFIX_WORKFLOW: &str = "hotfix.yml";
pub const ROLLBACK_WORKFLOW: &str = "rollback.yml";

const CLASSIFY_JOB: &str = "classify";
const CHECKOUT_ACTION: &str = "actions/checkout@v4";

/// Options that are not part of the pipeline itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    pub app_name: String,
    /// Used when the `EMERGENCY_MODE` repository variable is unset.
    pub emergency_mode: bool,
    pub runs_on: String,
}

impl EmitOptions {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            emergency_mode: false,
            runs_on: "ubuntu-latest".to_string(),
        }
    }

    pub fn with_emergency_mode(mut self, emergency_mode: bool) -> Self {
        self.emergency_mode = emergency_mode;
        self
    }
}

/// A rendered workflow file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedDocument {
    pub file_name: String,
    pub content: String,
}

/// Everything one emission produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitOutput {
    pub documents: Vec<EmittedDocument>,
    pub warnings: Vec<String>,
}

impl EmitOutput {
    pub fn document(&self, file_name: &str) -> Option<&EmittedDocument> {
        self.documents.iter().find(|d| d.file_name == file_name)
    }
}

/// A GitHub Actions workflow document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub name: String,
    #[serde(rename = "on")]
    pub triggers: Value,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    /// Job id to job, in execution order.
    pub jobs: Mapping,
}

impl Workflow {
    pub fn job_ids(&self) -> Vec<String> {
        self.jobs
            .keys()
            .filter_map(|k| k.as_str().map(str::to_string))
            .collect()
    }

    pub fn job(&self, id: &str) -> Option<Job> {
        self.jobs
            .get(id)
            .and_then(|v| serde_yaml::from_value(v.clone()).ok())
    }
}

/// A workflow job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    #[serde(rename = "runs-on")]
    pub runs_on: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub needs: Vec<String>,
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    pub steps: Vec<Step>,
}

/// Renders pipelines to workflow documents.
pub struct Emitter {
    options: EmitOptions,
}

impl Emitter {
    pub fn new(options: EmitOptions) -> Self {
        Self { options }
    }

    pub fn emit(&self, pipeline: &PipelineDefinition) -> CoreResult<EmitOutput> {
        let hotfix = pipeline.has_hook("hotfix");
        let rollback = pipeline.has_hook("rollback");

        let mut documents = vec![self.render(MAIN_WORKFLOW, &self.main(pipeline, hotfix)?, pipeline)?];
        if hotfix {
            documents.push(self.render(HOTFIX_WORKFLOW, &self.hotfix(pipeline)?, pipeline)?);
        }
        if rollback {
            documents.push(self.render(ROLLBACK_WORKFLOW, &self.rollback(pipeline)?, pipeline)?);
        }

        info!(
            "Emitted {} workflow document(s) with {} warning(s)",
            documents.len(),
            pipeline.warnings.len()
        );

        Ok(EmitOutput {
            documents,
            warnings: pipeline.warnings.clone(),
        })
    }

    fn main(&self, pipeline: &PipelineDefinition, hotfix_separate: bool) -> CoreResult<Workflow> {
        let mut triggers = Mapping::new();
        triggers.insert("pull_request".into(), Value::Mapping(Mapping::new()));
        triggers.insert("push".into(), single("tags", vec!["v*"]));
        triggers.insert("release".into(), single("types", vec!["published"]));

        let mut jobs = Mapping::new();
        insert_job(&mut jobs, CLASSIFY_JOB, &self.classify_job(None))?;

        let mut previous = None;
        for stage in &pipeline.stages {
            let guard = if hotfix_separate {
                stage.guard.clone().without(IntentKind::DeployProductionHotfix)
            } else {
                stage.guard.clone()
            };
            let environment = format!("${{{{ {}.environment }}}}", CLASSIFY_OUTPUTS);
            let job = self.stage_job(pipeline, stage, previous, Some(&guard), &environment, None);
            insert_job(&mut jobs, stage.name.as_str(), &job)?;
            previous = Some(stage.name.as_str());
        }

        Ok(Workflow {
            name: format!("{} pipeline", self.options.app_name),
            triggers: Value::Mapping(triggers),
            env: self.workflow_env(pipeline),
            jobs,
        })
    }

    fn hotfix(&self, pipeline: &PipelineDefinition) -> CoreResult<Workflow> {
        let mut triggers = Mapping::new();
        triggers.insert("release".into(), single("types", vec!["published"]));

        let only_hotfix = format!("contains(github.event.release.tag_name, '{}')", HOTFIX_MARKER);

        let mut jobs = Mapping::new();
        insert_job(&mut jobs, CLASSIFY_JOB, &self.classify_job(Some(only_hotfix)))?;

        let mut previous = None;
        for stage in &pipeline.stages {
            let guard = stage
                .guard
                .clone()
                .restricted_to(&[IntentKind::DeployProductionHotfix]);
            let job = self.stage_job(pipeline, stage, previous, Some(&guard), "production", None);
            insert_job(&mut jobs, stage.name.as_str(), &job)?;
            previous = Some(stage.name.as_str());
        }

        Ok(Workflow {
            name: format!("{} hotfix", self.options.app_name),
            triggers: Value::Mapping(triggers),
            env: self.workflow_env(pipeline),
            jobs,
        })
    }

    fn rollback(&self, pipeline: &PipelineDefinition) -> CoreResult<Workflow> {
        let mut tag_input = Mapping::new();
        tag_input.insert("description".into(), "Release tag to redeploy".into());
        tag_input.insert("required".into(), Value::Bool(true));
        tag_input.insert("type".into(), "string".into());
        let mut inputs = Mapping::new();
        inputs.insert("tag".into(), Value::Mapping(tag_input));
        let mut dispatch = Mapping::new();
        dispatch.insert("inputs".into(), Value::Mapping(inputs));
        let mut triggers = Mapping::new();
        triggers.insert("workflow_dispatch".into(), Value::Mapping(dispatch));

        let validate = Job {
            name: "Validate rollback tag".to_string(),
            runs_on: self.options.runs_on.clone(),
            needs: Vec::new(),
            condition: None,
            environment: None,
            outputs: BTreeMap::new(),
            env: BTreeMap::new(),
            steps: vec![
                Step::uses("Checkout", CHECKOUT_ACTION).with_input("fetch-depth", "0"),
                Step::run("Validate tag", tag_check_script()),
            ],
        };

        let mut jobs = Mapping::new();
        insert_job(&mut jobs, "validate-tag", &validate)?;

        let mut previous = Some("validate-tag");
        for stage in pipeline.stages.iter().filter(|s| s.kind() != StageKind::Gate) {
            let job = self.stage_job(
                pipeline,
                stage,
                previous,
                None,
                "production",
                Some("${{ inputs.tag }}"),
            );
            insert_job(&mut jobs, stage.name.as_str(), &job)?;
            previous = Some(stage.name.as_str());
        }

        let mut env = self.workflow_env(pipeline);
        env.insert("ROLLBACK_TAG".to_string(), "${{ inputs.tag }}".to_string());

        Ok(Workflow {
            name: format!("{} rollback", self.options.app_name),
            triggers: Value::Mapping(triggers),
            env,
            jobs,
        })
    }

    fn classify_job(&self, condition: Option<String>) -> Job {
        let mut step = Step::run("Classify trigger", classifier_script()).with_id(CLASSIFY_JOB);
        for (key, value) in classifier_env() {
            step = step.with_env(key, value);
        }

        let outputs = ["intent", "environment", "skip_gates"]
            .into_iter()
            .map(|name| {
                (
                    name.to_string(),
                    format!("${{{{ steps.{}.outputs.{} }}}}", CLASSIFY_JOB, name),
                )
            })
            .collect();

        Job {
            name: "Classify trigger".to_string(),
            runs_on: self.options.runs_on.clone(),
            needs: Vec::new(),
            condition,
            environment: None,
            outputs,
            env: BTreeMap::new(),
            steps: vec![step],
        }
    }

    fn stage_job(
        &self,
        pipeline: &PipelineDefinition,
        stage: &Stage,
        previous: Option<&str>,
        guard: Option<&StageGuard>,
        environment: &str,
        checkout_ref: Option<&str>,
    ) -> Job {
        let mut needs = Vec::new();
        if guard.is_some() {
            needs.push(CLASSIFY_JOB.to_string());
        }
        if let Some(previous) = previous {
            needs.push(previous.to_string());
        }

        let condition = guard.map(|g| {
            format!(
                "${{{{ !failure() && !cancelled() && ({}) }}}}",
                g.expression(CLASSIFY_OUTPUTS)
            )
        });

        let mut checkout = Step::uses("Checkout", CHECKOUT_ACTION);
        if let Some(git_ref) = checkout_ref {
            checkout = checkout.with_input("ref", git_ref);
        }

        let mut steps = Vec::with_capacity(stage.steps.len() + pipeline.setup.len() + 1);
        steps.push(checkout);
        steps.extend(pipeline.setup.iter().cloned());
        steps.extend(stage.steps.iter().cloned());
        debug!("Job '{}' has {} steps", stage.name, steps.len());

        Job {
            name: stage_title(stage),
            runs_on: self.options.runs_on.clone(),
            needs,
            condition,
            environment: (stage.kind() == StageKind::Deploy).then(|| environment.to_string()),
            outputs: BTreeMap::new(),
            env: BTreeMap::new(),
            steps,
        }
    }

    fn workflow_env(&self, pipeline: &PipelineDefinition) -> BTreeMap<String, String> {
        let mut env = pipeline.env.clone();
        env.insert("APP_NAME".to_string(), self.options.app_name.clone());
        env.insert(
            "EMERGENCY_MODE".to_string(),
            format!(
                "${{{{ vars.EMERGENCY_MODE || '{}' }}}}",
                self.options.emergency_mode
            ),
        );
        env
    }

    fn render(
        &self,
        file_name: &str,
        workflow: &Workflow,
        pipeline: &PipelineDefinition,
    ) -> CoreResult<EmittedDocument> {
        let secrets = if pipeline.secrets.is_empty() {
            "none".to_string()
        } else {
            pipeline.secrets.iter().cloned().collect::<Vec<_>>().join(", ")
        };

        let mut content = format!(
            "# Generated by cigen for {}. Edit freely; cigen is not needed to run it.\n\
             # Required secrets: {}\n",
            self.options.app_name, secrets
        );
        content.push_str(&serde_yaml::to_string(workflow)?);

        Ok(EmittedDocument {
            file_name: file_name.to_string(),
            content,
        })
    }
}

fn insert_job(jobs: &mut Mapping, id: &str, job: &Job) -> CoreResult<()> {
    jobs.insert(id.into(), serde_yaml::to_value(job)?);
    Ok(())
}

fn single(key: &str, values: Vec<&str>) -> Value {
    let mut map = Mapping::new();
    map.insert(
        key.into(),
        Value::Sequence(values.into_iter().map(Value::from).collect()),
    );
    Value::Mapping(map)
}

fn stage_title(stage: &Stage) -> String {
    let name = stage.name.as_str().replace('-', " ");
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => name,
    }
}

/// Checks the tag shape, then that it exists in the full-history checkout.
fn tag_check_script() -> String {
    format!(
        "stable_re='{}'\n\
         hotfix_re='{}'\n\
         if [[ ! \"$ROLLBACK_TAG\" =~ $stable_re && ! \"$ROLLBACK_TAG\" =~ $hotfix_re ]]; then\n  \
         echo \"::error::'$ROLLBACK_TAG' is not a release tag\"\n  \
         exit 1\n\
         fi\n\
         if ! git rev-parse --verify --quiet \"refs/tags/$ROLLBACK_TAG^{{commit}}\" >/dev/null; then\n  \
         echo \"::error::tag '$ROLLBACK_TAG' does not exist\"\n  \
         exit 1\n\
         fi\n",
        STABLE_TAG_PATTERN, HOTFIX_TAG_PATTERN
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_title() {
        assert_eq!(stage_title(&Stage::new(cigen_catalogue::StageName::PreDeploy)), "Pre deploy");
        assert_eq!(stage_title(&Stage::new(cigen_catalogue::StageName::Lint)), "Lint");
    }

    #[test]
    fn test_empty_pipeline_emits_classify_only() {
        let output = Emitter::new(EmitOptions::new("demo"))
            .emit(&PipelineDefinition::default())
            .unwrap();

        assert_eq!(output.documents.len(), 1);
        let doc = output.document(MAIN_WORKFLOW).unwrap();
        assert!(doc.content.starts_with("# Generated by cigen for demo."));
        assert!(doc.content.contains("# Required secrets: none"));

        let workflow: Workflow = serde_yaml::from_str(&doc.content).unwrap();
        assert_eq!(workflow.job_ids(), vec!["classify"]);
        assert_eq!(workflow.env["APP_NAME"], "demo");
        assert_eq!(
            workflow.env["EMERGENCY_MODE"],
            "${{ vars.EMERGENCY_MODE || 'false' }}"
        );
    }

    #[test]
    fn test_emergency_default() {
        let emitter = Emitter::new(EmitOptions::new("demo").with_emergency_mode(true));
        let env = emitter.workflow_env(&PipelineDefinition::default());
        assert_eq!(env["EMERGENCY_MODE"], "${{ vars.EMERGENCY_MODE || 'true' }}");
    }
}
