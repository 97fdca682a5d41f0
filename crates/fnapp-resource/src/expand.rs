//! Desired configuration to ARM request bodies.

use fnapp_arm::models::{
    ConnStringValueTypePair, ConnectionStringDictionary, NameValuePair, Site, SiteConfig,
    SiteConfigResource, SiteProperties, StringDictionary,
};
use fnapp_core::settings::{basic_app_settings, merged_app_settings};
use fnapp_core::{normalize_location, ConnectionString, FunctionAppConfig};

/// Site kind of a Function App.
pub const FUNCTION_APP_KIND: &str = "functionapp";

/// Site envelope submitted on creation.
///
/// The site configuration carries the implicit app settings so the runtime
/// can start before the full settings map is pushed.
#[must_use]
pub fn site_envelope(config: &FunctionAppConfig) -> Site {
    let mut web_config = config
        .site_config
        .as_ref()
        .map(site_config)
        .unwrap_or_default();
    web_config.app_settings = Some(
        basic_app_settings(config)
            .into_iter()
            .map(|(name, value)| NameValuePair::new(name, value))
            .collect(),
    );

    Site {
        kind: Some(FUNCTION_APP_KIND.to_string()),
        location: Some(normalize_location(&config.location)),
        tags: config.tags.clone(),
        properties: Some(SiteProperties {
            server_farm_id: Some(config.app_service_plan_id.clone()),
            enabled: Some(config.enabled),
            client_affinity_enabled: config.client_affinity_enabled,
            https_only: Some(config.https_only),
            site_config: Some(web_config),
            ..SiteProperties::default()
        }),
        ..Site::default()
    }
}

/// Full app settings map: user settings overlaid with the implicit keys.
#[must_use]
pub fn app_settings(config: &FunctionAppConfig) -> StringDictionary {
    StringDictionary::new(merged_app_settings(config))
}

/// Wire form of a `site_config` block.
#[must_use]
pub fn site_config(block: &fnapp_core::SiteConfig) -> SiteConfig {
    SiteConfig {
        always_on: Some(block.always_on),
        use_32_bit_worker_process: Some(block.use_32_bit_worker_process),
        websockets_enabled: Some(block.websockets_enabled),
        app_settings: None,
    }
}

/// `config/web` body; an undeclared block sends the defaults.
#[must_use]
pub fn site_config_resource(config: &FunctionAppConfig) -> SiteConfigResource {
    SiteConfigResource {
        id: None,
        properties: Some(site_config(&config.site_config.unwrap_or_default())),
    }
}

/// Connection strings keyed by name.
#[must_use]
pub fn connection_strings(entries: &[ConnectionString]) -> ConnectionStringDictionary {
    ConnectionStringDictionary::new(
        entries
            .iter()
            .map(|entry| {
                (
                    entry.name.clone(),
                    ConnStringValueTypePair {
                        value: entry.value.clone(),
                        kind: entry.kind,
                    },
                )
            })
            .collect(),
    )
}
