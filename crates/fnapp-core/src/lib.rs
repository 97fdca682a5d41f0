//! # Function App Core
//!
//! Declarative model for an Azure Function App and the pure logic around it.
//!
//! This crate provides:
//! - The desired configuration (`FunctionAppConfig`) and its nested blocks
//! - The attribute schema (presence, defaults, replace-on-change flags)
//! - The implicitly managed app settings and how they are merged and stripped
//! - ARM resource ID parsing
//! - Change detection between two configurations
//!
//! Nothing here performs I/O; the ARM client and the lifecycle adapter live
//! in their own crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod diff;
pub mod resource_id;
pub mod schema;
pub mod settings;
pub mod state;
pub mod validation;

pub use config::{ConnectionString, ConnectionStringType, FunctionAppConfig, SiteConfig};
pub use diff::ChangeSet;
pub use resource_id::{FunctionAppId, ResourceId, ResourceIdError};
pub use schema::{Attribute, AttributeKind, Presence, SCHEMA};
pub use settings::{ImplicitSettings, IMPLICIT_APP_SETTING_KEYS};
pub use state::{ComputedAttributes, ResourceData};
pub use validation::{normalize_location, ValidationError};
