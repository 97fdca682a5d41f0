//! # ARM Adapter
//!
//! HTTP client for the `Microsoft.Web` sites API of Azure Resource Manager.
//!
//! ## Request Rules
//!
//! - Every request carries `api-version`, a bearer token and a fresh
//!   `x-ms-client-request-id`
//! - Path segments taken from user input are percent-encoded
//! - `201`/`202` answers are followed through `Azure-AsyncOperation` or
//!   `Location` until the operation is terminal
//!
//! [`WebAppsApi`] is the seam the resource lifecycle is written against;
//! [`ArmClient`] is its HTTP implementation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod client;
pub mod lro;
pub mod models;
pub mod paths;

pub use api::WebAppsApi;
pub use client::{ArmClient, ArmClientConfig, ClientError};
pub use lro::{OperationState, PollTarget};
pub use models::{
    ConnStringValueTypePair, ConnectionStringDictionary, NameValuePair, ResourceNameAvailability,
    Site, SiteConfig, SiteConfigResource, SiteProperties, StringDictionary,
};
