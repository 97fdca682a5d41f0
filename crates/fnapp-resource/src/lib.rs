//! # Function App Resource
//!
//! Declarative lifecycle of an Azure Function App on top of
//! [`fnapp_arm::WebAppsApi`].
//!
//! ## App Settings
//!
//! Five settings are derived from the configuration and always sent:
//! `AzureWebJobsDashboard`, `AzureWebJobsStorage`,
//! `FUNCTIONS_EXTENSION_VERSION`, `WEBSITE_CONTENTSHARE` and
//! `WEBSITE_CONTENTAZUREFILECONNECTIONSTRING`. They are stripped from the
//! user-visible `app_settings` on read.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod expand;
pub mod flatten;
pub mod lifecycle;

pub use error::ResourceError;
pub use lifecycle::FunctionAppResource;
