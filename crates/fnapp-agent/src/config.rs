//! Agent configuration.

use anyhow::{bail, Context, Result};
use fnapp_arm::client::{DEFAULT_API_VERSION, DEFAULT_ENDPOINT};
use fnapp_arm::ArmClientConfig;
use fnapp_core::FunctionAppConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Management API connection
    pub arm: ArmConfig,

    /// Path of the desired configuration (JSON)
    pub desired_path: PathBuf,

    /// Key the resource is stored under
    pub address: String,

    /// Persistence configuration
    pub persistence: PersistenceConfig,

    /// Re-run every interval; run once when unset
    pub reconcile_interval: Option<Duration>,

    /// Destroy the resource regardless of the desired configuration
    pub destroy: bool,
}

/// Management API configuration.
#[derive(Clone)]
pub struct ArmConfig {
    /// Management endpoint
    pub endpoint: String,

    /// Subscription ID
    pub subscription_id: String,

    /// `api-version` of the sites API
    pub api_version: String,

    /// Bearer token for authentication
    pub bearer_token: Option<String>,

    /// Delay between long-running operation polls
    pub poll_interval: Duration,

    /// Upper bound on a long-running operation
    pub operation_timeout: Duration,

    /// Custom CA certificate path
    pub ca_cert_path: Option<PathBuf>,
}

impl std::fmt::Debug for ArmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmConfig")
            .field("endpoint", &self.endpoint)
            .field("subscription_id", &self.subscription_id)
            .field("api_version", &self.api_version)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .field("poll_interval", &self.poll_interval)
            .field("operation_timeout", &self.operation_timeout)
            .field("ca_cert_path", &self.ca_cert_path)
            .finish()
    }
}

/// Persistence configuration.
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// Store type: "sqlite" or "memory"
    pub store_type: String,

    /// Database path (for `SQLite`)
    pub db_path: PathBuf,
}

impl Default for AgentConfig {
    fn default() -> Self {
        let client = ArmClientConfig::default();
        Self {
            arm: ArmConfig {
                endpoint: DEFAULT_ENDPOINT.to_string(),
                subscription_id: String::new(),
                api_version: DEFAULT_API_VERSION.to_string(),
                bearer_token: None,
                poll_interval: client.poll_interval,
                operation_timeout: client.operation_timeout,
                ca_cert_path: None,
            },
            desired_path: PathBuf::from("./function-app.json"),
            address: "function_app.main".to_string(),
            persistence: PersistenceConfig {
                store_type: "sqlite".to_string(),
                db_path: PathBuf::from("./fnapp-state.db"),
            },
            reconcile_interval: None,
            destroy: false,
        }
    }
}

impl AgentConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FNAPP_SUBSCRIPTION_ID`: Subscription ID (required)
    /// - `FNAPP_ARM_ENDPOINT`: Management endpoint
    /// - `FNAPP_BEARER_TOKEN`: Bearer token
    /// - `FNAPP_API_VERSION`: `api-version` override
    /// - `FNAPP_POLL_INTERVAL_SECS`: Long-running operation poll interval
    /// - `FNAPP_OPERATION_TIMEOUT_SECS`: Long-running operation timeout
    /// - `FNAPP_CA_CERT_PATH`: PEM CA certificate
    /// - `FNAPP_DESIRED_PATH`: Desired configuration JSON
    /// - `FNAPP_ADDRESS`: State address of the resource
    /// - `FNAPP_STORE_TYPE`: "sqlite" or "memory"
    /// - `FNAPP_DB_PATH`: `SQLite` database path
    /// - `FNAPP_RECONCILE_INTERVAL_SECS`: Reconcile periodically
    /// - `FNAPP_DESTROY`: "true" to delete the resource
    ///
    /// # Errors
    ///
    /// Returns error if a required variable is missing or a value is invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns error if a required variable is missing or a value is invalid.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        config.arm.subscription_id =
            var("FNAPP_SUBSCRIPTION_ID").context("FNAPP_SUBSCRIPTION_ID is required")?;

        if let Some(endpoint) = var("FNAPP_ARM_ENDPOINT") {
            config.arm.endpoint = endpoint;
        }

        if let Some(token) = var("FNAPP_BEARER_TOKEN") {
            config.arm.bearer_token = Some(token);
        }

        if let Some(version) = var("FNAPP_API_VERSION") {
            config.arm.api_version = version;
        }

        if let Some(secs) = var("FNAPP_POLL_INTERVAL_SECS") {
            config.arm.poll_interval = parse_secs("FNAPP_POLL_INTERVAL_SECS", &secs)?;
        }

        if let Some(secs) = var("FNAPP_OPERATION_TIMEOUT_SECS") {
            config.arm.operation_timeout = parse_secs("FNAPP_OPERATION_TIMEOUT_SECS", &secs)?;
        }

        if let Some(path) = var("FNAPP_CA_CERT_PATH") {
            config.arm.ca_cert_path = Some(PathBuf::from(path));
        }

        if let Some(path) = var("FNAPP_DESIRED_PATH") {
            config.desired_path = PathBuf::from(path);
        }

        if let Some(address) = var("FNAPP_ADDRESS") {
            config.address = address;
        }

        if let Some(store_type) = var("FNAPP_STORE_TYPE") {
            if store_type != "sqlite" && store_type != "memory" {
                bail!("Invalid FNAPP_STORE_TYPE {store_type:?}, expected \"sqlite\" or \"memory\"");
            }
            config.persistence.store_type = store_type;
        }

        if let Some(path) = var("FNAPP_DB_PATH") {
            config.persistence.db_path = PathBuf::from(path);
        }

        if let Some(secs) = var("FNAPP_RECONCILE_INTERVAL_SECS") {
            config.reconcile_interval =
                Some(parse_secs("FNAPP_RECONCILE_INTERVAL_SECS", &secs)?);
        }

        if let Some(destroy) = var("FNAPP_DESTROY") {
            config.destroy = matches!(destroy.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }

    /// ARM client configuration derived from this configuration.
    #[must_use]
    pub fn arm_client_config(&self) -> ArmClientConfig {
        ArmClientConfig {
            endpoint: self.arm.endpoint.clone(),
            subscription_id: self.arm.subscription_id.clone(),
            api_version: self.arm.api_version.clone(),
            bearer_token: self.arm.bearer_token.clone(),
            poll_interval: self.arm.poll_interval,
            operation_timeout: self.arm.operation_timeout,
            ca_cert_path: self.arm.ca_cert_path.clone(),
            ..ArmClientConfig::default()
        }
    }

    /// Load the desired configuration.
    ///
    /// `None` means the resource should not exist: destroy was requested or
    /// there is no configuration file.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load_desired(&self) -> Result<Option<FunctionAppConfig>> {
        if self.destroy {
            return Ok(None);
        }

        if !self.desired_path.exists() {
            tracing::info!(path = %self.desired_path.display(), "No desired configuration file");
            return Ok(None);
        }

        let json = std::fs::read_to_string(&self.desired_path).with_context(|| {
            format!("Failed to read {}", self.desired_path.display())
        })?;
        let desired = FunctionAppConfig::from_json(&json).with_context(|| {
            format!("Invalid desired configuration {}", self.desired_path.display())
        })?;

        Ok(Some(desired))
    }
}

fn parse_secs(name: &str, value: &str) -> Result<Duration> {
    let secs: u64 = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid {name}: {value:?}"))?;
    Ok(Duration::from_secs(secs))
}
