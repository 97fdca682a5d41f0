//! Create, read, update, delete and import of one Function App.

use crate::error::ResourceError;
use crate::expand;
use crate::flatten::{self, RemoteSite};
use fnapp_arm::WebAppsApi;
use fnapp_core::{ChangeSet, FunctionAppConfig, FunctionAppId, ResourceData};

/// `deleteMetrics` sent on delete.
pub const DELETE_METRICS: bool = true;

/// `deleteEmptyServerFarm` sent on delete; the plan outlives its apps.
pub const DELETE_EMPTY_SERVER_FARM: bool = false;

/// Lifecycle of Function Apps against a [`WebAppsApi`].
pub struct FunctionAppResource<A> {
    api: A,
}

impl<A: WebAppsApi> FunctionAppResource<A> {
    /// Create a lifecycle adapter over `api`.
    #[must_use]
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// The underlying API.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Create the Function App described by `config`.
    ///
    /// Blocks until the site exists, then pushes app settings, site
    /// configuration and connection strings and reads the result back.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid, the name is taken,
    /// or any remote call fails.
    pub async fn create(&self, config: FunctionAppConfig) -> Result<ResourceData, ResourceError> {
        config.validate()?;

        let name = config.name.as_str();
        let resource_group = config.resource_group_name.as_str();

        tracing::info!(name, resource_group, "Creating Function App");

        let availability = self
            .api
            .check_name_availability(name)
            .await
            .map_err(ResourceError::remote("checking name availability", name))?;

        if !availability.name_available {
            return Err(ResourceError::NameUnavailable {
                name: name.to_string(),
                message: availability
                    .message
                    .or(availability.reason)
                    .unwrap_or_default(),
            });
        }

        let envelope = expand::site_envelope(&config);
        self.api
            .create_or_update(resource_group, name, &envelope)
            .await
            .map_err(ResourceError::remote("creating", name))?;

        let site = self
            .api
            .get(resource_group, name)
            .await
            .map_err(ResourceError::remote("reading after create", name))?;

        let id = site
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ResourceError::MissingId {
                name: name.to_string(),
                resource_group: resource_group.to_string(),
            })?;

        tracing::info!(name, %id, "Function App created");

        let changes = ChangeSet::for_create(&config);
        let data = ResourceData::with_id(id, config);
        self.apply(&data, &changes).await?;
        self.read(&data).await
    }

    /// Update a Function App in place.
    ///
    /// Each sub-resource is pushed independently; a failure aborts the
    /// remaining ones and leaves earlier ones applied.
    ///
    /// # Errors
    ///
    /// Returns error if `prior` has no valid identity, a replace-only
    /// attribute changed, the configuration is invalid, or a remote call
    /// fails.
    pub async fn update(
        &self,
        prior: &ResourceData,
        desired: FunctionAppConfig,
    ) -> Result<ResourceData, ResourceError> {
        desired.validate()?;
        let id = prior.function_app_id()?;

        let changes = ChangeSet::between(&prior.config, &desired);
        if changes.requires_replacement() {
            return Err(ResourceError::RequiresReplacement {
                attributes: changes.replacement_attributes(),
            });
        }

        let data = ResourceData {
            id: prior.id.clone(),
            config: desired,
            computed: prior.computed.clone(),
        };

        if changes.is_empty() {
            tracing::debug!(name = %id.name, "No changes to apply");
        } else {
            self.apply(&data, &changes).await?;
        }

        self.read(&data).await
    }

    async fn apply(&self, data: &ResourceData, changes: &ChangeSet) -> Result<(), ResourceError> {
        let id = data.function_app_id()?;
        let (resource_group, name) = (id.resource_group.as_str(), id.name.as_str());
        let config = &data.config;

        if changes.app_settings_changed() {
            tracing::info!(name, "Updating application settings");
            self.api
                .update_application_settings(resource_group, name, &expand::app_settings(config))
                .await
                .map_err(ResourceError::remote("updating application settings", name))?;
        }

        if changes.site_config_changed() {
            tracing::info!(name, "Updating site configuration");
            self.api
                .update_configuration(
                    resource_group,
                    name,
                    &expand::site_config_resource(config),
                )
                .await
                .map_err(ResourceError::remote("updating configuration", name))?;
        }

        if changes.connection_strings_changed() {
            tracing::info!(name, "Updating connection strings");
            self.api
                .update_connection_strings(
                    resource_group,
                    name,
                    &expand::connection_strings(
                        config.connection_strings.as_deref().unwrap_or_default(),
                    ),
                )
                .await
                .map_err(ResourceError::remote("updating connection strings", name))?;
        }

        Ok(())
    }

    /// Refresh resource data from the server.
    ///
    /// A site that no longer exists yields data with no identity.
    ///
    /// # Errors
    ///
    /// Returns error if `data` has no valid identity or a remote call fails.
    pub async fn read(&self, data: &ResourceData) -> Result<ResourceData, ResourceError> {
        let app_id = data.function_app_id()?;
        let (resource_group, name) = (app_id.resource_group.as_str(), app_id.name.as_str());

        let site = match self.api.get(resource_group, name).await {
            Ok(site) => site,
            Err(e) if e.is_not_found() => {
                tracing::debug!(
                    name,
                    resource_group,
                    "Function App was not found, removing from state"
                );
                let mut gone = data.clone();
                gone.clear_id();
                return Ok(gone);
            }
            Err(e) => return Err(ResourceError::remote("reading", name)(e)),
        };

        let app_settings = self
            .api
            .list_application_settings(resource_group, name)
            .await
            .map_err(ResourceError::remote("reading application settings", name))?;

        let connection_strings = self
            .api
            .list_connection_strings(resource_group, name)
            .await
            .map_err(ResourceError::remote("reading connection strings", name))?;

        let configuration = self
            .api
            .get_configuration(resource_group, name)
            .await
            .map_err(ResourceError::remote("reading configuration", name))?;

        let id = data.id.as_deref().unwrap_or_default();
        Ok(flatten::resource_data(
            id,
            &app_id,
            RemoteSite {
                site,
                app_settings,
                connection_strings,
                configuration,
            },
            &data.config,
        ))
    }

    /// Delete the Function App; a missing site counts as deleted.
    ///
    /// # Errors
    ///
    /// Returns error if `data` has no valid identity or the delete call
    /// fails for another reason than not-found.
    pub async fn delete(&self, data: &ResourceData) -> Result<(), ResourceError> {
        let id = data.function_app_id()?;
        let (resource_group, name) = (id.resource_group.as_str(), id.name.as_str());

        tracing::info!(name, resource_group, "Deleting Function App");

        match self
            .api
            .delete(
                resource_group,
                name,
                DELETE_METRICS,
                DELETE_EMPTY_SERVER_FARM,
            )
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                tracing::debug!(name, "Function App already gone");
                Ok(())
            }
            Err(e) => Err(ResourceError::remote("deleting", name)(e)),
        }
    }

    /// Bring an existing Function App under management by resource ID.
    ///
    /// # Errors
    ///
    /// Returns error if the ID is not a site ID, the site does not exist,
    /// or a remote call fails.
    pub async fn import(&self, id: &str) -> Result<ResourceData, ResourceError> {
        let app_id = FunctionAppId::parse(id)?;

        tracing::info!(name = %app_id.name, resource_group = %app_id.resource_group, "Importing Function App");

        let placeholder =
            FunctionAppConfig::new(&app_id.name, &app_id.resource_group, "", "", "");
        let data = self.read(&ResourceData::with_id(id, placeholder)).await?;

        if data.exists() {
            Ok(data)
        } else {
            Err(ResourceError::NotFound(id.to_string()))
        }
    }
}
