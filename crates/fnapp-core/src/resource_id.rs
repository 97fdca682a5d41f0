//! ARM resource identifiers.
//!
//! An ID is a `/`-separated list of key/value pairs:
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/{ns}/{type}/{name}/...`

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Resource provider namespace for App Service.
pub const WEB_PROVIDER: &str = "Microsoft.Web";

/// A parsed ARM resource ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceId {
    /// Subscription identifier
    pub subscription_id: String,
    /// Resource group, when the ID is scoped to one
    pub resource_group: Option<String>,
    /// Provider namespace, e.g. `Microsoft.Web`
    pub provider: Option<String>,
    /// Remaining type/name pairs, e.g. `sites -> my-app`
    pub path: BTreeMap<String, String>,
}

impl ResourceId {
    /// Parse a resource ID.
    ///
    /// # Errors
    ///
    /// Returns error if the segment count is odd, a key or value is empty,
    /// or the subscription is missing.
    pub fn parse(id: &str) -> Result<Self, ResourceIdError> {
        let without_query = id.trim().split('?').next().unwrap_or_default();
        let trimmed = without_query.trim_matches('/');

        if trimmed.is_empty() {
            return Err(ResourceIdError::Empty);
        }

        let segments: Vec<&str> = trimmed.split('/').collect();
        if segments.len() % 2 != 0 {
            return Err(ResourceIdError::OddSegments(id.to_string()));
        }

        let mut pairs = BTreeMap::new();
        for chunk in segments.chunks(2) {
            let (key, value) = (chunk[0], chunk[1]);
            if key.is_empty() || value.is_empty() {
                return Err(ResourceIdError::EmptySegment {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
            pairs.insert(key.to_string(), value.to_string());
        }

        let subscription_id = pairs
            .remove("subscriptions")
            .ok_or_else(|| ResourceIdError::MissingSubscription(id.to_string()))?;

        // Older IDs use lowercase `resourcegroups`.
        let resource_group = pairs
            .remove("resourceGroups")
            .or_else(|| pairs.remove("resourcegroups"));

        let provider = pairs.remove("providers");

        Ok(Self {
            subscription_id,
            resource_group,
            provider,
            path: pairs,
        })
    }
}

/// Identity of a Function App: subscription, resource group and site name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionAppId {
    /// Subscription identifier
    pub subscription_id: String,
    /// Resource group name
    pub resource_group: String,
    /// Site name
    pub name: String,
}

impl FunctionAppId {
    /// Build an identity from its parts.
    #[must_use]
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            name: name.into(),
        }
    }

    /// Parse a site resource ID.
    ///
    /// # Errors
    ///
    /// Returns error if the ID is malformed or does not name a site in a
    /// resource group.
    pub fn parse(id: &str) -> Result<Self, ResourceIdError> {
        let parsed = ResourceId::parse(id)?;

        let resource_group = parsed
            .resource_group
            .ok_or_else(|| ResourceIdError::MissingResourceGroup(id.to_string()))?;
        let name = parsed
            .path
            .get("sites")
            .cloned()
            .ok_or_else(|| ResourceIdError::NotASite(id.to_string()))?;

        Ok(Self {
            subscription_id: parsed.subscription_id,
            resource_group,
            name,
        })
    }
}

impl fmt::Display for FunctionAppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/{}/sites/{}",
            self.subscription_id, self.resource_group, WEB_PROVIDER, self.name
        )
    }
}

/// Errors that can occur parsing a resource ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceIdError {
    /// Nothing to parse
    #[error("resource ID is empty")]
    Empty,
    /// Segments do not pair up
    #[error("the number of path segments is not divisible by 2 in {0:?}")]
    OddSegments(String),
    /// A key or value is empty (e.g. `//`)
    #[error("key/value cannot be empty strings (key: {key:?}, value: {value:?})")]
    EmptySegment {
        /// Segment key
        key: String,
        /// Segment value
        value: String,
    },
    /// No `subscriptions/{id}` pair
    #[error("no subscription ID found in {0:?}")]
    MissingSubscription(String),
    /// No `resourceGroups/{name}` pair
    #[error("no resource group found in {0:?}")]
    MissingResourceGroup(String),
    /// No `sites/{name}` pair
    #[error("{0:?} does not identify an App Service site")]
    NotASite(String),
}
