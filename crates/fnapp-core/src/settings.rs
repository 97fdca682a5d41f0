//! Implicitly managed app settings.
//!
//! The Functions runtime needs a handful of app settings derived from the
//! configuration. They are always sent to the management API and always
//! stripped from what is surfaced back, otherwise every read would report
//! a change to `app_settings`.

use crate::config::FunctionAppConfig;
use std::collections::BTreeMap;

/// Dashboard storage connection.
pub const DASHBOARD_KEY: &str = "AzureWebJobsDashboard";
/// Runtime storage connection.
pub const STORAGE_KEY: &str = "AzureWebJobsStorage";
/// Functions runtime version.
pub const VERSION_KEY: &str = "FUNCTIONS_EXTENSION_VERSION";
/// Azure Files share holding the function content.
pub const CONTENT_SHARE_KEY: &str = "WEBSITE_CONTENTSHARE";
/// Connection string for the content share.
pub const CONTENT_CONNECTION_KEY: &str = "WEBSITE_CONTENTAZUREFILECONNECTIONSTRING";

/// All implicit keys, in the order they are sent.
pub const IMPLICIT_APP_SETTING_KEYS: [&str; 5] = [
    DASHBOARD_KEY,
    STORAGE_KEY,
    VERSION_KEY,
    CONTENT_SHARE_KEY,
    CONTENT_CONNECTION_KEY,
];

/// Whether `key` is managed by the adapter rather than the user.
#[must_use]
pub fn is_implicit(key: &str) -> bool {
    IMPLICIT_APP_SETTING_KEYS.contains(&key)
}

/// The implicit settings for a configuration, as ordered name/value pairs.
#[must_use]
pub fn basic_app_settings(config: &FunctionAppConfig) -> Vec<(String, String)> {
    let storage = &config.storage_connection_string;

    vec![
        (DASHBOARD_KEY.to_string(), storage.clone()),
        (STORAGE_KEY.to_string(), storage.clone()),
        (VERSION_KEY.to_string(), config.version.clone()),
        (CONTENT_SHARE_KEY.to_string(), config.content_share_name()),
        (CONTENT_CONNECTION_KEY.to_string(), storage.clone()),
    ]
}

/// User settings merged with the implicit ones; implicit values win.
#[must_use]
pub fn merged_app_settings(config: &FunctionAppConfig) -> BTreeMap<String, String> {
    let mut merged = config.app_settings.clone();
    merged.extend(basic_app_settings(config));
    merged
}

/// Values recovered from the implicit keys of a remote settings map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImplicitSettings {
    /// `AzureWebJobsStorage`
    pub storage_connection_string: Option<String>,
    /// `FUNCTIONS_EXTENSION_VERSION`
    pub version: Option<String>,
}

/// Split a remote settings map into user settings and implicit values.
///
/// The returned user map never contains an implicit key.
#[must_use]
pub fn split_app_settings(
    mut remote: BTreeMap<String, String>,
) -> (BTreeMap<String, String>, ImplicitSettings) {
    let implicit = ImplicitSettings {
        storage_connection_string: remote.get(STORAGE_KEY).cloned(),
        version: remote.get(VERSION_KEY).cloned(),
    };

    remote.retain(|key, _| !is_implicit(key));

    (remote, implicit)
}
