//! # cigen_provider
//!
//! Provider configuration documents for cigen.
//!
//! One document is written per generated project, describing where the
//! pipeline deploys: provider, service type, target, region and optional
//! cluster. Values come from the `settings` of the selected provider and
//! service fragments.

pub mod config;
pub mod error;
pub mod provider;

pub use config::{validate_app_name, ProviderConfig};
pub use error::{ProviderError, ProviderResult};
pub use provider::CloudProvider;
