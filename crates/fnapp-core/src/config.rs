//! Desired configuration of a Function App.
//!
//! Attribute names follow the declarative surface (`snake_case`), so a
//! configuration file deserializes straight into [`FunctionAppConfig`].

use crate::validation::{self, ValidationError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Runtime version used when none is declared.
pub const DEFAULT_VERSION: &str = "~1";

/// Runtime versions accepted for `version`.
pub const SUPPORTED_VERSIONS: &[&str] = &["~1", "beta"];

/// Desired state of a Function App as declared by the user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionAppConfig {
    /// Globally unique site name
    pub name: String,
    /// Resource group holding the site
    pub resource_group_name: String,
    /// Azure region
    pub location: String,
    /// Resource ID of the hosting plan
    pub app_service_plan_id: String,
    /// Whether the site is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Functions runtime version (`~1` or `beta`)
    #[serde(default = "default_version")]
    pub version: String,
    /// Storage account connection string backing the runtime
    pub storage_connection_string: String,
    /// User app settings (never includes the implicit keys)
    #[serde(default)]
    pub app_settings: BTreeMap<String, String>,
    /// Connection strings exposed to the functions; left to the server when unset
    #[serde(
        default,
        rename = "connection_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub connection_strings: Option<Vec<ConnectionString>>,
    /// Resource tags
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// ARR affinity; left to the server when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_affinity_enabled: Option<bool>,
    /// Redirect HTTP to HTTPS
    #[serde(default)]
    pub https_only: bool,
    /// Site configuration block; left to the server when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_config: Option<SiteConfig>,
}

fn default_true() -> bool {
    true
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

impl FunctionAppConfig {
    /// Create a configuration with the required attributes and defaults for
    /// everything else.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        resource_group_name: impl Into<String>,
        location: impl Into<String>,
        app_service_plan_id: impl Into<String>,
        storage_connection_string: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            resource_group_name: resource_group_name.into(),
            location: location.into(),
            app_service_plan_id: app_service_plan_id.into(),
            enabled: true,
            version: default_version(),
            storage_connection_string: storage_connection_string.into(),
            app_settings: BTreeMap::new(),
            connection_strings: None,
            tags: BTreeMap::new(),
            client_affinity_enabled: None,
            https_only: false,
            site_config: None,
        }
    }

    /// Parse a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns error if the document does not match the attribute surface.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Name of the Azure Files share holding the function content.
    #[must_use]
    pub fn content_share_name(&self) -> String {
        format!("{}-content", self.name)
    }

    /// Check every attribute constraint.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_app_service_name(&self.name)?;
        validation::require_non_empty("resource_group_name", &self.resource_group_name)?;
        validation::require_non_empty("location", &self.location)?;
        validation::require_non_empty("app_service_plan_id", &self.app_service_plan_id)?;
        validation::require_non_empty("storage_connection_string", &self.storage_connection_string)?;
        validation::validate_version(&self.version)?;

        let mut seen = std::collections::BTreeSet::new();
        for entry in self.connection_strings.iter().flatten() {
            validation::require_non_empty("connection_string.name", &entry.name)?;
            if !seen.insert(entry.name.as_str()) {
                return Err(ValidationError::DuplicateConnectionString(entry.name.clone()));
            }
        }

        Ok(())
    }
}

impl fmt::Debug for FunctionAppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionAppConfig")
            .field("name", &self.name)
            .field("resource_group_name", &self.resource_group_name)
            .field("location", &self.location)
            .field("app_service_plan_id", &self.app_service_plan_id)
            .field("enabled", &self.enabled)
            .field("version", &self.version)
            .field("storage_connection_string", &"<redacted>")
            .field("app_settings", &self.app_settings.keys().collect::<Vec<_>>())
            .field("connection_strings", &self.connection_strings)
            .field("tags", &self.tags)
            .field("client_affinity_enabled", &self.client_affinity_enabled)
            .field("https_only", &self.https_only)
            .field("site_config", &self.site_config)
            .finish()
    }
}

/// The `site_config` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Keep the app loaded even when idle
    #[serde(default)]
    pub always_on: bool,
    /// Run the worker as a 32-bit process
    #[serde(default = "default_true")]
    pub use_32_bit_worker_process: bool,
    /// Enable web sockets
    #[serde(default)]
    pub websockets_enabled: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            always_on: false,
            use_32_bit_worker_process: true,
            websockets_enabled: false,
        }
    }
}

/// A named connection string with its service type.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionString {
    /// Connection string name
    pub name: String,
    /// Connection string value
    pub value: String,
    /// Kind of service the string points at
    #[serde(rename = "type")]
    pub kind: ConnectionStringType,
}

impl ConnectionString {
    /// Create a connection string entry.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        kind: ConnectionStringType,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind,
        }
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .field("kind", &self.kind)
            .finish()
    }
}

/// External service kinds a connection string may point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConnectionStringType {
    /// API Hub
    ApiHub,
    /// Arbitrary connection string
    Custom,
    /// Cosmos DB (`DocumentDB`)
    DocDb,
    /// Event Hubs
    EventHub,
    /// `MySQL`
    MySql,
    /// Notification Hubs
    NotificationHub,
    /// `PostgreSQL`
    PostgreSql,
    /// Azure Cache for Redis
    RedisCache,
    /// Service Bus
    ServiceBus,
    /// Azure SQL Database
    SqlAzure,
    /// SQL Server
    SqlServer,
}

impl ConnectionStringType {
    /// Every supported type.
    pub const ALL: [Self; 11] = [
        Self::ApiHub,
        Self::Custom,
        Self::DocDb,
        Self::EventHub,
        Self::MySql,
        Self::NotificationHub,
        Self::PostgreSql,
        Self::RedisCache,
        Self::ServiceBus,
        Self::SqlAzure,
        Self::SqlServer,
    ];

    /// Name used on the wire by the management API.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiHub => "ApiHub",
            Self::Custom => "Custom",
            Self::DocDb => "DocDb",
            Self::EventHub => "EventHub",
            Self::MySql => "MySql",
            Self::NotificationHub => "NotificationHub",
            Self::PostgreSql => "PostgreSQL",
            Self::RedisCache => "RedisCache",
            Self::ServiceBus => "ServiceBus",
            Self::SqlAzure => "SQLAzure",
            Self::SqlServer => "SQLServer",
        }
    }
}

impl fmt::Display for ConnectionStringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionStringType {
    type Err = ValidationError;

    /// Case-insensitive, so `sqlazure` and `SQLAzure` name the same type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::UnsupportedConnectionStringType(s.to_string()))
    }
}

impl Serialize for ConnectionStringType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ConnectionStringType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
