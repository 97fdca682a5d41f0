//! # Function App Agent
//!
//! Reconciles one Azure Function App against its declared configuration.

use anyhow::{Context, Result};
use fnapp_agent::{Agent, AgentConfig};
use fnapp_arm::ArmClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Function App agent"
    );

    let config = AgentConfig::from_env()?;
    tracing::info!(
        address = %config.address,
        desired = %config.desired_path.display(),
        "Configuration loaded"
    );

    let client = ArmClient::new(config.arm_client_config()).context("Failed to create ARM client")?;
    let agent = Agent::new(config, client)?;

    agent.run().await
}
