//! Change detection between two configurations.

use crate::config::{ConnectionString, FunctionAppConfig};
use crate::schema;
use crate::validation::normalize_location;
use std::collections::BTreeSet;

/// The set of attributes that differ between a prior and a desired
/// configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changed: BTreeSet<&'static str>,
}

impl ChangeSet {
    /// Compare `prior` against `desired`.
    ///
    /// Optional+computed attributes (`site_config`, `client_affinity_enabled`,
    /// `connection_string`) only count as changed when `desired` declares them. Locations compare
    /// after normalisation and connection strings compare as a set.
    #[must_use]
    pub fn between(prior: &FunctionAppConfig, desired: &FunctionAppConfig) -> Self {
        let mut changes = Self::default();

        changes.mark_if("name", prior.name != desired.name);
        changes.mark_if(
            "resource_group_name",
            prior.resource_group_name != desired.resource_group_name,
        );
        changes.mark_if(
            "location",
            normalize_location(&prior.location) != normalize_location(&desired.location),
        );
        changes.mark_if(
            "app_service_plan_id",
            prior.app_service_plan_id != desired.app_service_plan_id,
        );
        changes.mark_if("enabled", prior.enabled != desired.enabled);
        changes.mark_if("version", prior.version != desired.version);
        changes.mark_if(
            "storage_connection_string",
            prior.storage_connection_string != desired.storage_connection_string,
        );
        changes.mark_if("app_settings", prior.app_settings != desired.app_settings);
        changes.mark_if(
            "connection_string",
            desired.connection_strings.is_some()
                && sorted(prior.connection_strings.as_deref())
                    != sorted(desired.connection_strings.as_deref()),
        );
        changes.mark_if("tags", prior.tags != desired.tags);
        changes.mark_if(
            "client_affinity_enabled",
            desired.client_affinity_enabled.is_some()
                && prior.client_affinity_enabled != desired.client_affinity_enabled,
        );
        changes.mark_if("https_only", prior.https_only != desired.https_only);
        changes.mark_if(
            "site_config",
            desired.site_config.is_some() && prior.site_config != desired.site_config,
        );

        tracing::debug!(name = %desired.name, changed = ?changes.changed, "Computed change set");

        changes
    }

    /// Changes implied by creating `desired` from nothing.
    ///
    /// App settings are always pushed since the implicit keys must exist;
    /// the optional blocks only when declared.
    #[must_use]
    pub fn for_create(desired: &FunctionAppConfig) -> Self {
        let mut changes = Self::default();
        changes.mark_if("app_settings", true);
        changes.mark_if("version", true);
        changes.mark_if("site_config", desired.site_config.is_some());
        changes.mark_if(
            "connection_string",
            desired
                .connection_strings
                .as_ref()
                .is_some_and(|entries| !entries.is_empty()),
        );
        changes
    }

    fn mark_if(&mut self, attribute: &'static str, changed: bool) {
        if changed {
            self.changed.insert(attribute);
        }
    }

    /// Whether `attribute` changed.
    #[must_use]
    pub fn has_change(&self, attribute: &str) -> bool {
        self.changed.contains(attribute)
    }

    /// Whether the application settings must be pushed again.
    #[must_use]
    pub fn app_settings_changed(&self) -> bool {
        self.has_change("app_settings") || self.has_change("version")
    }

    /// Whether the site configuration must be pushed again.
    #[must_use]
    pub fn site_config_changed(&self) -> bool {
        self.has_change("site_config")
    }

    /// Whether the connection strings must be pushed again.
    #[must_use]
    pub fn connection_strings_changed(&self) -> bool {
        self.has_change("connection_string")
    }

    /// Changed attributes that cannot be updated in place.
    #[must_use]
    pub fn replacement_attributes(&self) -> Vec<&'static str> {
        self.changed
            .iter()
            .copied()
            .filter(|attr| schema::is_force_new(attr))
            .collect()
    }

    /// Whether the resource must be destroyed and recreated.
    #[must_use]
    pub fn requires_replacement(&self) -> bool {
        self.changed.iter().any(|attr| schema::is_force_new(attr))
    }

    /// Whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    /// Changed attribute names in alphabetical order.
    pub fn attributes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.changed.iter().copied()
    }
}

fn sorted(entries: Option<&[ConnectionString]>) -> Vec<&ConnectionString> {
    let mut sorted: Vec<_> = entries.unwrap_or_default().iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectionStringType, SiteConfig};

    fn config() -> FunctionAppConfig {
        FunctionAppConfig::new("orders-fn", "rg", "West Europe", "plan", "conn")
    }

    #[test]
    fn identical_configs_have_no_changes() {
        assert!(ChangeSet::between(&config(), &config()).is_empty());
    }

    #[test]
    fn location_compares_normalised() {
        let mut desired = config();
        desired.location = "westeurope".to_string();
        assert!(ChangeSet::between(&config(), &desired).is_empty());
    }

    #[test]
    fn version_change_pushes_app_settings() {
        let mut desired = config();
        desired.version = "beta".to_string();
        let changes = ChangeSet::between(&config(), &desired);
        assert!(changes.app_settings_changed());
        assert!(!changes.requires_replacement());
    }

    #[test]
    fn force_new_attributes_require_replacement() {
        let mut desired = config();
        desired.app_service_plan_id = "other-plan".to_string();
        desired.tags.insert("env".to_string(), "prod".to_string());
        desired
            .app_settings
            .insert("KEY".to_string(), "value".to_string());

        let changes = ChangeSet::between(&config(), &desired);
        assert!(changes.requires_replacement());
        assert_eq!(changes.replacement_attributes(), ["app_service_plan_id", "tags"]);
        assert!(changes.app_settings_changed());
    }

    #[test]
    fn undeclared_computed_blocks_are_not_changes() {
        let mut prior = config();
        prior.site_config = Some(SiteConfig {
            always_on: true,
            ..SiteConfig::default()
        });
        prior.client_affinity_enabled = Some(true);

        let changes = ChangeSet::between(&prior, &config());
        assert!(changes.is_empty());
    }

    #[test]
    fn declared_site_config_change_detected() {
        let mut desired = config();
        desired.site_config = Some(SiteConfig::default());
        let changes = ChangeSet::between(&config(), &desired);
        assert!(changes.site_config_changed());
        assert_eq!(changes.attributes().collect::<Vec<_>>(), ["site_config"]);
    }

    #[test]
    fn connection_string_order_is_irrelevant() {
        let a = ConnectionString::new("a", "1", ConnectionStringType::Custom);
        let b = ConnectionString::new("b", "2", ConnectionStringType::SqlAzure);

        let mut prior = config();
        prior.connection_strings = Some(vec![a.clone(), b.clone()]);
        let mut desired = config();
        desired.connection_strings = Some(vec![b, a]);

        assert!(!ChangeSet::between(&prior, &desired).connection_strings_changed());
    }

    #[test]
    fn undeclared_connection_strings_are_not_changes() {
        let mut prior = config();
        prior.connection_strings = Some(vec![ConnectionString::new(
            "db",
            "Server=tcp:orders",
            ConnectionStringType::SqlAzure,
        )]);

        assert!(ChangeSet::between(&prior, &config()).is_empty());

        let mut cleared = config();
        cleared.connection_strings = Some(Vec::new());
        assert!(ChangeSet::between(&prior, &cleared).connection_strings_changed());
    }

    #[test]
    fn create_changes() {
        let changes = ChangeSet::for_create(&config());
        assert!(changes.app_settings_changed());
        assert!(!changes.site_config_changed());
        assert!(!changes.connection_strings_changed());

        let mut desired = config();
        desired.site_config = Some(SiteConfig::default());
        desired.connection_strings = Some(vec![ConnectionString::new(
            "db",
            "x",
            ConnectionStringType::MySql,
        )]);
        let changes = ChangeSet::for_create(&desired);
        assert!(changes.site_config_changed());
        assert!(changes.connection_strings_changed());
    }
}
