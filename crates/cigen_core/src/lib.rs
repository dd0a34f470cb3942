//! # cigen_core
//!
//! Pipeline composition and workflow emission for cigen.
//!
//! - [`Composer`] merges the fragments of a resolved selection into a
//!   [`PipelineDefinition`]
//! - [`Emitter`] renders a pipeline as GitHub Actions workflow documents
//! - [`SelectionStore`] persists the selection a project was generated from

pub mod composer;
pub mod emitter;
pub mod error;
pub mod pipeline;
pub mod store;

pub use composer::{Composer, BUILTIN_ENV};
pub use emitter::{
    EmitOptions, EmitOutput, EmittedDocument, Emitter, Job, Workflow, HOTFIX_WORKFLOW,
    MAIN_WORKFLOW, ROLLBACK_WORKFLOW,
};
pub use error::{CoreError, CoreResult};
pub use pipeline::{stage_kind, PipelineDefinition, Stage};
pub use store::{
    changed_artifacts, write_artifacts, Artifact, SavedSelection, SelectionStore, SELECTION_FILE,
    STORE_DIR,
};
