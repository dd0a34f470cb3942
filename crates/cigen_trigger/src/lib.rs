//! # cigen_trigger
//!
//! Deployment trigger state machine for cigen.
//!
//! Maps repository events (pull requests, tag pushes, published releases) to
//! a [`DeploymentIntent`], and decides per stage whether that intent runs it.
//!
//! ```rust
//! use cigen_trigger::{classify, DeploymentIntent, TriggerConfig, TriggerEvent};
//!
//! let result = classify(
//!     &TriggerEvent::release_published("v2.1.0-hotfix.1"),
//!     &TriggerConfig::emergency(),
//! );
//! assert_eq!(
//!     result.intent,
//!     DeploymentIntent::DeployProductionHotfix { skip_gates: true }
//! );
//! ```

pub mod gate;
pub mod intent;
pub mod machine;
pub mod script;
pub mod tag;

pub use gate::{GuardDecision, StageGuard, StageKind, CLASSIFY_OUTPUTS};
pub use intent::{DeploymentIntent, IntentKind, TriggerEvent};
pub use machine::{classify, Classification, TriggerConfig, TriggerStateMachine};
pub use script::{classifier_env, classifier_script};
pub use tag::{ReleaseTag, TagError, HOTFIX_MARKER, HOTFIX_TAG_PATTERN, STABLE_TAG_PATTERN};
