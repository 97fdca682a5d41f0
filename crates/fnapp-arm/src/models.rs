//! Wire models of the `Microsoft.Web` management API (2016-09-01).
//!
//! Only the fields the Function App resource reads or writes are modelled;
//! everything else the server returns is ignored.

use fnapp_core::ConnectionStringType;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Resource type used for name availability checks of sites.
pub const SITES_RESOURCE_TYPE: &str = "Microsoft.Web/sites";

/// A site envelope (`Microsoft.Web/sites`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    /// ARM resource ID (server-assigned)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Site name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Site kind, `functionapp` for Function Apps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Azure region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Resource tags
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: BTreeMap<String, String>,
    /// Site properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<SiteProperties>,
}

/// Properties of a site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteProperties {
    /// Hosting plan resource ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_farm_id: Option<String>,
    /// Whether the site is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// ARR affinity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_affinity_enabled: Option<bool>,
    /// HTTPS-only redirect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https_only: Option<bool>,
    /// Default hostname (read-only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_host_name: Option<String>,
    /// Outbound IP addresses (read-only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound_ip_addresses: Option<String>,
    /// Runtime state, e.g. `Running` (read-only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Site configuration sent along on create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_config: Option<SiteConfig>,
}

/// Site configuration (`config/web`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    /// Keep the app loaded even when idle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_on: Option<bool>,
    /// Run the worker as a 32-bit process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_32_bit_worker_process: Option<bool>,
    /// Web sockets
    #[serde(
        default,
        rename = "webSocketsEnabled",
        skip_serializing_if = "Option::is_none"
    )]
    pub websockets_enabled: Option<bool>,
    /// App settings; only honoured on site creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_settings: Option<Vec<NameValuePair>>,
}

/// A name/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameValuePair {
    /// Setting name
    pub name: String,
    /// Setting value
    pub value: String,
}

impl NameValuePair {
    /// Create a pair.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// `config/web` wrapped as a resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteConfigResource {
    /// ARM resource ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Site configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<SiteConfig>,
}

/// App settings (`config/appsettings`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringDictionary {
    /// ARM resource ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Settings; `null` values read back as empty strings
    #[serde(default, deserialize_with = "nullable_values")]
    pub properties: BTreeMap<String, String>,
}

impl StringDictionary {
    /// Wrap a settings map for an update request.
    #[must_use]
    pub fn new(properties: BTreeMap<String, String>) -> Self {
        Self {
            id: None,
            properties,
        }
    }
}

/// Connection strings (`config/connectionstrings`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStringDictionary {
    /// ARM resource ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Connection strings by name
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: BTreeMap<String, ConnStringValueTypePair>,
}

impl ConnectionStringDictionary {
    /// Wrap a connection string map for an update request.
    #[must_use]
    pub fn new(properties: BTreeMap<String, ConnStringValueTypePair>) -> Self {
        Self {
            id: None,
            properties,
        }
    }
}

/// Value and type of one connection string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnStringValueTypePair {
    /// Connection string value
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
    /// Service type
    #[serde(rename = "type")]
    pub kind: ConnectionStringType,
}

/// Body of a name availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceNameAvailabilityRequest {
    /// Name to check
    pub name: String,
    /// Resource type, see [`SITES_RESOURCE_TYPE`]
    #[serde(rename = "type")]
    pub kind: String,
}

impl ResourceNameAvailabilityRequest {
    /// Availability request for a site name.
    #[must_use]
    pub fn site(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SITES_RESOURCE_TYPE.to_string(),
        }
    }
}

/// Result of a name availability check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNameAvailability {
    /// Whether the name can be used
    #[serde(default)]
    pub name_available: bool,
    /// Machine-readable reason, e.g. `AlreadyExists`
    #[serde(default)]
    pub reason: Option<String>,
    /// Human-readable explanation
    #[serde(default)]
    pub message: Option<String>,
}

/// Error envelope returned by ARM.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CloudError {
    /// Error details
    #[serde(default)]
    pub error: Option<CloudErrorBody>,
}

/// Code and message of an ARM error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CloudErrorBody {
    /// Error code, e.g. `ResourceNotFound`
    #[serde(default)]
    pub code: Option<String>,
    /// Error message
    #[serde(default)]
    pub message: Option<String>,
}

/// Body returned by an `Azure-AsyncOperation` status URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OperationStatus {
    /// `InProgress`, `Succeeded`, `Failed` or `Canceled`
    #[serde(default)]
    pub status: String,
    /// Failure details
    #[serde(default)]
    pub error: Option<CloudErrorBody>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_values<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<String>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k, v.unwrap_or_default()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn site_wire_names() {
        let site = Site {
            kind: Some("functionapp".to_string()),
            location: Some("westeurope".to_string()),
            properties: Some(SiteProperties {
                server_farm_id: Some("plan".to_string()),
                https_only: Some(true),
                site_config: Some(SiteConfig {
                    use_32_bit_worker_process: Some(true),
                    websockets_enabled: Some(false),
                    ..SiteConfig::default()
                }),
                ..SiteProperties::default()
            }),
            ..Site::default()
        };

        let json = serde_json::to_value(&site).unwrap();
        assert_eq!(json["properties"]["serverFarmId"], "plan");
        assert_eq!(json["properties"]["httpsOnly"], true);
        assert_eq!(
            json["properties"]["siteConfig"]["use32BitWorkerProcess"],
            true
        );
        assert_eq!(json["properties"]["siteConfig"]["webSocketsEnabled"], false);
        assert!(json.get("id").is_none());
    }

    #[test]
    fn site_read_back() {
        let site: Site = serde_json::from_value(json!({
            "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Web/sites/app",
            "name": "app",
            "kind": "functionapp",
            "location": "West Europe",
            "tags": null,
            "properties": {
                "defaultHostName": "app.azurewebsites.net",
                "outboundIpAddresses": "1.2.3.4,5.6.7.8",
                "enabled": true,
                "hostNames": ["app.azurewebsites.net"]
            }
        }))
        .unwrap();

        let props = site.properties.unwrap();
        assert!(site.tags.is_empty());
        assert_eq!(props.default_host_name.as_deref(), Some("app.azurewebsites.net"));
        assert_eq!(props.outbound_ip_addresses.as_deref(), Some("1.2.3.4,5.6.7.8"));
    }

    #[test]
    fn null_app_setting_reads_as_empty() {
        let settings: StringDictionary =
            serde_json::from_value(json!({"properties": {"A": "1", "B": null}})).unwrap();
        assert_eq!(settings.properties["A"], "1");
        assert_eq!(settings.properties["B"], "");
    }

    #[test]
    fn connection_string_types_parse() {
        let dict: ConnectionStringDictionary = serde_json::from_value(json!({
            "properties": {
                "db": {"value": "Server=x", "type": "SQLAzure"},
                "cache": {"value": "redis", "type": "RedisCache"}
            }
        }))
        .unwrap();
        assert_eq!(dict.properties["db"].kind, ConnectionStringType::SqlAzure);
        assert_eq!(dict.properties["cache"].kind, ConnectionStringType::RedisCache);
    }

    #[test]
    fn name_availability_request_body() {
        let body = serde_json::to_value(ResourceNameAvailabilityRequest::site("app")).unwrap();
        assert_eq!(body, json!({"name": "app", "type": "Microsoft.Web/sites"}));
    }
}
