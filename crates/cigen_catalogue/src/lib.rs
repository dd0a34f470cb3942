//! # cigen_catalogue
//!
//! Fragment catalogue and compatibility resolution for cigen.
//!
//! Each value of each axis (language, package manager, framework, provider,
//! service, hooks) is a [`Fragment`]: the steps it contributes per stage, the
//! environment and secrets it declares, and the `requires`/`excludes`
//! constraints it places on other selections.
//!
//! ## Example
//!
//! ```rust
//! use cigen_catalogue::{CompatibilityResolver, FragmentCatalogue, RawSelection};
//!
//! let catalogue = FragmentCatalogue::builtin();
//! let raw = RawSelection::new()
//!     .with("language", "nodejs")
//!     .with("package-manager", "npm")
//!     .with("framework", "nextjs")
//!     .with("provider", "aws")
//!     .with("service", "ecs");
//!
//! let selection = CompatibilityResolver::new(&catalogue).resolve(&raw).unwrap();
//! assert_eq!(selection.fragments().len(), 5);
//! ```

pub mod builtin;
pub mod catalogue;
pub mod error;
pub mod fragment;
pub mod loader;
pub mod resolver;

pub use catalogue::FragmentCatalogue;
pub use error::{CatalogueError, CatalogueResult};
pub use fragment::{
    Axis, Exclusion, Fragment, FragmentRef, Requirement, StageName, Step, StepAction,
    StepContribution,
};
pub use loader::CatalogueLoader;
pub use resolver::{
    CompatibilityResolver, Incompatibility, IncompatibilityReport, RawSelection, RawValue,
    Selection,
};
