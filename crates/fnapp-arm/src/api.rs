//! The management operations the Function App resource needs.

use crate::client::ClientError;
use crate::models::{
    ConnectionStringDictionary, ResourceNameAvailability, Site, SiteConfigResource,
    StringDictionary,
};
use async_trait::async_trait;

/// App Service site operations, scoped to one subscription.
///
/// [`crate::ArmClient`] talks to Azure Resource Manager; tests substitute an
/// in-memory implementation.
#[async_trait]
pub trait WebAppsApi: Send + Sync {
    /// Check whether a site name is globally available.
    async fn check_name_availability(
        &self,
        name: &str,
    ) -> Result<ResourceNameAvailability, ClientError>;

    /// Create or replace a site, blocking until the long-running operation
    /// completes.
    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        site: &Site,
    ) -> Result<Site, ClientError>;

    /// Get a site.
    async fn get(&self, resource_group: &str, name: &str) -> Result<Site, ClientError>;

    /// Delete a site.
    async fn delete(
        &self,
        resource_group: &str,
        name: &str,
        delete_metrics: bool,
        delete_empty_server_farm: bool,
    ) -> Result<(), ClientError>;

    /// List the app settings of a site.
    async fn list_application_settings(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<StringDictionary, ClientError>;

    /// Replace the app settings of a site.
    async fn update_application_settings(
        &self,
        resource_group: &str,
        name: &str,
        settings: &StringDictionary,
    ) -> Result<StringDictionary, ClientError>;

    /// List the connection strings of a site.
    async fn list_connection_strings(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<ConnectionStringDictionary, ClientError>;

    /// Replace the connection strings of a site.
    async fn update_connection_strings(
        &self,
        resource_group: &str,
        name: &str,
        connection_strings: &ConnectionStringDictionary,
    ) -> Result<ConnectionStringDictionary, ClientError>;

    /// Get the site configuration.
    async fn get_configuration(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<SiteConfigResource, ClientError>;

    /// Create or update the site configuration.
    async fn update_configuration(
        &self,
        resource_group: &str,
        name: &str,
        config: &SiteConfigResource,
    ) -> Result<SiteConfigResource, ClientError>;
}
