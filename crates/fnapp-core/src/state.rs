//! Resource data: identity, interpreted configuration and computed values.

use crate::config::FunctionAppConfig;
use crate::resource_id::{FunctionAppId, ResourceIdError};
use serde::{Deserialize, Serialize};

/// Attributes set by the server and never declared by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedAttributes {
    /// Default `*.azurewebsites.net` hostname
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_hostname: Option<String>,
    /// Comma-separated outbound IP addresses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound_ip_addresses: Option<String>,
}

/// State of one Function App as last seen.
///
/// An empty `id` means the resource does not exist remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceData {
    /// ARM resource ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Configuration as read back (or as applied)
    pub config: FunctionAppConfig,
    /// Server-computed attributes
    #[serde(default)]
    pub computed: ComputedAttributes,
}

impl ResourceData {
    /// Resource data for a configuration that has no remote identity yet.
    #[must_use]
    pub fn new(config: FunctionAppConfig) -> Self {
        Self {
            id: None,
            config,
            computed: ComputedAttributes::default(),
        }
    }

    /// Resource data for an existing remote ID, e.g. on import.
    #[must_use]
    pub fn with_id(id: impl Into<String>, config: FunctionAppConfig) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::new(config)
        }
    }

    /// Whether the resource exists remotely.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Record the remote identity.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Forget the remote identity (logical deletion).
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// Parse the recorded identity.
    ///
    /// # Errors
    ///
    /// Returns error if there is no identity or it is not a site ID.
    pub fn function_app_id(&self) -> Result<FunctionAppId, ResourceIdError> {
        match self.id.as_deref() {
            Some(id) => FunctionAppId::parse(id),
            None => Err(ResourceIdError::Empty),
        }
    }
}
