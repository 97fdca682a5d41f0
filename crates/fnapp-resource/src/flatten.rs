//! ARM responses back to resource data.

use fnapp_arm::models::{ConnectionStringDictionary, Site, SiteConfigResource, StringDictionary};
use fnapp_core::config::DEFAULT_VERSION;
use fnapp_core::settings::split_app_settings;
use fnapp_core::{
    normalize_location, ComputedAttributes, ConnectionString, FunctionAppConfig, FunctionAppId,
    ResourceData, SiteConfig,
};

/// Everything a read fetches for one site.
#[derive(Debug, Clone, Default)]
pub struct RemoteSite {
    /// Site envelope
    pub site: Site,
    /// `config/appsettings`
    pub app_settings: StringDictionary,
    /// `config/connectionstrings`
    pub connection_strings: ConnectionStringDictionary,
    /// `config/web`
    pub configuration: SiteConfigResource,
}

/// Rebuild resource data from a remote site.
///
/// Name and resource group come from the ID; attributes the server leaves
/// out fall back to `prior`.
#[must_use]
pub fn resource_data(
    id: &str,
    app_id: &FunctionAppId,
    remote: RemoteSite,
    prior: &FunctionAppConfig,
) -> ResourceData {
    let RemoteSite {
        site,
        app_settings,
        connection_strings,
        configuration,
    } = remote;

    let props = site.properties.unwrap_or_default();
    let (user_settings, implicit) = split_app_settings(app_settings.properties);

    let config = FunctionAppConfig {
        name: app_id.name.clone(),
        resource_group_name: app_id.resource_group.clone(),
        location: site
            .location
            .as_deref()
            .map_or_else(|| prior.location.clone(), normalize_location),
        app_service_plan_id: props
            .server_farm_id
            .unwrap_or_else(|| prior.app_service_plan_id.clone()),
        enabled: props.enabled.unwrap_or(prior.enabled),
        version: implicit
            .version
            .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        storage_connection_string: implicit.storage_connection_string.unwrap_or_default(),
        app_settings: user_settings,
        connection_strings: Some(flatten_connection_strings(connection_strings)),
        tags: site.tags,
        client_affinity_enabled: props.client_affinity_enabled,
        https_only: props.https_only.unwrap_or(false),
        site_config: configuration.properties.as_ref().map(flatten_site_config),
    };

    ResourceData {
        id: Some(id.to_string()),
        config,
        computed: ComputedAttributes {
            default_hostname: props.default_host_name,
            outbound_ip_addresses: props.outbound_ip_addresses,
        },
    }
}

/// Read a `config/web` body into a `site_config` block, filling defaults.
#[must_use]
pub fn flatten_site_config(remote: &fnapp_arm::SiteConfig) -> SiteConfig {
    let defaults = SiteConfig::default();
    SiteConfig {
        always_on: remote.always_on.unwrap_or(defaults.always_on),
        use_32_bit_worker_process: remote
            .use_32_bit_worker_process
            .unwrap_or(defaults.use_32_bit_worker_process),
        websockets_enabled: remote
            .websockets_enabled
            .unwrap_or(defaults.websockets_enabled),
    }
}

/// Connection strings, ordered by name.
#[must_use]
pub fn flatten_connection_strings(remote: ConnectionStringDictionary) -> Vec<ConnectionString> {
    remote
        .properties
        .into_iter()
        .map(|(name, pair)| ConnectionString::new(name, pair.value, pair.kind))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnapp_arm::models::{ConnStringValueTypePair, SiteProperties};
    use fnapp_core::{ConnectionStringType, IMPLICIT_APP_SETTING_KEYS};
    use std::collections::BTreeMap;

    const ID: &str = "/subscriptions/s/resourceGroups/rg-orders/providers/Microsoft.Web/sites/orders-fn";

    fn remote() -> RemoteSite {
        let mut settings = BTreeMap::new();
        for key in IMPLICIT_APP_SETTING_KEYS {
            settings.insert(key.to_string(), "implicit".to_string());
        }
        settings.insert("AzureWebJobsStorage".to_string(), "storage-conn".to_string());
        settings.insert("FUNCTIONS_EXTENSION_VERSION".to_string(), "beta".to_string());
        settings.insert("FEATURE_FLAG".to_string(), "on".to_string());

        let mut connections = BTreeMap::new();
        connections.insert(
            "orders-db".to_string(),
            ConnStringValueTypePair {
                value: "Server=tcp:db".to_string(),
                kind: ConnectionStringType::SqlAzure,
            },
        );

        RemoteSite {
            site: Site {
                id: Some(ID.to_string()),
                location: Some("West Europe".to_string()),
                properties: Some(SiteProperties {
                    server_farm_id: Some("plan-id".to_string()),
                    enabled: Some(false),
                    https_only: Some(true),
                    default_host_name: Some("orders-fn.azurewebsites.net".to_string()),
                    outbound_ip_addresses: Some("10.0.0.1".to_string()),
                    ..SiteProperties::default()
                }),
                ..Site::default()
            },
            app_settings: StringDictionary::new(settings),
            connection_strings: ConnectionStringDictionary::new(connections),
            configuration: SiteConfigResource {
                id: None,
                properties: Some(fnapp_arm::SiteConfig {
                    always_on: Some(true),
                    ..fnapp_arm::SiteConfig::default()
                }),
            },
        }
    }

    #[test]
    fn rebuilds_configuration() {
        let app_id = FunctionAppId::parse(ID).unwrap();
        let prior = FunctionAppConfig::new("orders-fn", "rg-orders", "westeurope", "plan-id", "");
        let data = resource_data(ID, &app_id, remote(), &prior);

        assert_eq!(data.id.as_deref(), Some(ID));
        let config = &data.config;
        assert_eq!(config.location, "westeurope");
        assert_eq!(config.storage_connection_string, "storage-conn");
        assert_eq!(config.version, "beta");
        assert!(!config.enabled);
        assert!(config.https_only);
        assert_eq!(config.app_settings.len(), 1);
        assert_eq!(config.app_settings["FEATURE_FLAG"], "on");
        let connections = config.connection_strings.as_deref().unwrap();
        assert_eq!(connections[0].name, "orders-db");
        assert_eq!(
            config.site_config,
            Some(SiteConfig {
                always_on: true,
                use_32_bit_worker_process: true,
                websockets_enabled: false,
            })
        );
        assert_eq!(
            data.computed.default_hostname.as_deref(),
            Some("orders-fn.azurewebsites.net")
        );
    }

    #[test]
    fn missing_fields_fall_back() {
        let app_id = FunctionAppId::parse(ID).unwrap();
        let mut prior =
            FunctionAppConfig::new("orders-fn", "rg-orders", "northeurope", "plan-b", "");
        prior.enabled = false;
        let data = resource_data(ID, &app_id, RemoteSite::default(), &prior);

        assert_eq!(data.config.location, "northeurope");
        assert_eq!(data.config.app_service_plan_id, "plan-b");
        assert_eq!(data.config.version, "~1");
        assert!(!data.config.enabled);
        assert_eq!(data.config.connection_strings, Some(Vec::new()));
        assert!(data.config.site_config.is_none());
    }
}
