//! Agent runtime orchestration.

use crate::config::AgentConfig;
use crate::persistence::{ApplyRun, SqliteStore};
use crate::plan::{plan, Action, Plan};
use anyhow::{Context, Result};
use chrono::Utc;
use fnapp_arm::WebAppsApi;
use fnapp_core::ResourceData;
use fnapp_resource::FunctionAppResource;

/// The reconciliation agent.
pub struct Agent<A> {
    config: AgentConfig,
    resource: FunctionAppResource<A>,
    store: SqliteStore,
}

impl<A: WebAppsApi> Agent<A> {
    /// Create a new agent, opening the configured store.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be opened.
    pub fn new(config: AgentConfig, api: A) -> Result<Self> {
        let store = if config.persistence.store_type == "sqlite" {
            SqliteStore::open(&config.persistence.db_path)
                .context("Failed to open SQLite database")?
        } else {
            SqliteStore::in_memory().context("Failed to create in-memory store")?
        };

        Ok(Self::with_store(config, api, store))
    }

    /// Create an agent over an already opened store.
    #[must_use]
    pub fn with_store(config: AgentConfig, api: A, store: SqliteStore) -> Self {
        Self {
            config,
            resource: FunctionAppResource::new(api),
            store,
        }
    }

    /// The state store.
    #[must_use]
    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// Reconcile once and record the run.
    ///
    /// # Errors
    ///
    /// Returns error if the desired configuration or the state cannot be
    /// loaded, the refresh fails, or the planned action fails.
    pub async fn reconcile(&self) -> Result<Action> {
        let address = self.config.address.as_str();

        let desired = self.config.load_desired()?;
        let prior = self
            .store
            .load_resource(address)
            .context("Failed to load resource state")?;

        let current = match prior {
            Some(prior) if prior.exists() => Some(
                self.resource
                    .read(&prior)
                    .await
                    .context("Failed to refresh resource state")?,
            ),
            other => other,
        };

        let plan = plan(current, desired);
        let action = plan.action();
        tracing::info!(address, action = action.as_str(), "Planned reconcile");

        let started_at = Utc::now();
        let outcome = self.execute(plan).await;
        let run = ApplyRun {
            address: address.to_string(),
            action: action.as_str().to_string(),
            succeeded: outcome.is_ok(),
            error: outcome.as_ref().err().map(|e| format!("{e:#}")),
            started_at,
            finished_at: Utc::now(),
        };
        if let Err(err) = self.store.record_run(&run) {
            tracing::warn!(error = %err, address, "Failed to record apply run");
        }

        outcome.map(|()| action)
    }

    async fn execute(&self, plan: Plan) -> Result<()> {
        let address = self.config.address.as_str();

        match plan {
            Plan::Noop => {
                if self.store.remove_resource(address)? {
                    tracing::info!(address, "Dropped state of a resource that no longer exists");
                }
            }
            Plan::Create { desired } => {
                let data = self.resource.create(desired).await?;
                self.persist(&data)?;
            }
            Plan::Update { current, desired } => {
                let data = self.resource.update(&current, desired).await?;
                self.persist(&data)?;
            }
            Plan::Replace {
                current,
                desired,
                attributes,
            } => {
                tracing::info!(address, ?attributes, "Replacing resource");
                self.resource.delete(&current).await?;
                self.store.remove_resource(address)?;
                let data = self.resource.create(desired).await?;
                self.persist(&data)?;
            }
            Plan::Delete { current } => {
                self.resource.delete(&current).await?;
                self.store.remove_resource(address)?;
            }
        }

        Ok(())
    }

    fn persist(&self, data: &ResourceData) -> Result<()> {
        self.store
            .save_resource(&self.config.address, data)
            .context("Failed to save resource state")
    }

    /// Run once, or until Ctrl+C when an interval is configured.
    ///
    /// # Errors
    ///
    /// Returns error if a single run fails; periodic runs only log failures.
    pub async fn run(self) -> Result<()> {
        let Some(interval) = self.config.reconcile_interval else {
            let action = self.reconcile().await?;
            tracing::info!(action = action.as_str(), "Reconcile finished");
            return Ok(());
        };

        tracing::info!(
            interval_secs = interval.as_secs(),
            "Agent running, press Ctrl+C to stop"
        );

        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.reconcile().await {
                        Ok(action) => tracing::info!(action = action.as_str(), "Reconcile finished"),
                        Err(err) => tracing::error!(error = %format!("{err:#}"), "Reconcile failed"),
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
            }
        }

        tracing::info!("Agent stopped");
        Ok(())
    }
}
