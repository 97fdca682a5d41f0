//! # Function App CLI
//!
//! Command-line utilities for inspecting resource IDs, names and the
//! attribute schema.

use anyhow::{Context, Result};
use fnapp_arm::{ArmClient, ArmClientConfig, WebAppsApi};
use fnapp_core::validation::validate_app_service_name;
use fnapp_core::{normalize_location, FunctionAppId, ResourceId, SCHEMA};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "parse-id" => {
            if args.len() < 3 {
                eprintln!("Usage: fnapp parse-id <resource-id>");
                std::process::exit(1);
            }
            let id = ResourceId::parse(&args[2]).context("Failed to parse resource ID")?;
            println!("{}", serde_json::to_string_pretty(&id)?);
            if let Ok(site) = FunctionAppId::parse(&args[2]) {
                println!("canonical: {site}");
            }
        }
        "check-name" => {
            if args.len() < 3 {
                eprintln!("Usage: fnapp check-name <name>");
                std::process::exit(1);
            }
            check_name(&args[2]).await?;
        }
        "location" => {
            if args.len() < 3 {
                eprintln!("Usage: fnapp location <name>");
                std::process::exit(1);
            }
            println!("{}", normalize_location(&args[2..].join(" ")));
        }
        "schema" => {
            println!("{}", serde_json::to_string_pretty(SCHEMA)?);
        }
        "help" | "--help" | "-h" => {
            print_help();
        }
        cmd => {
            eprintln!("Unknown command: {cmd}");
            print_help();
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Validate a site name locally, then ask ARM when a subscription is set.
async fn check_name(name: &str) -> Result<()> {
    validate_app_service_name(name).context("Invalid name")?;

    let Ok(subscription_id) = env::var("FNAPP_SUBSCRIPTION_ID") else {
        println!("{name}: valid (set FNAPP_SUBSCRIPTION_ID to check global availability)");
        return Ok(());
    };

    let mut config = ArmClientConfig {
        subscription_id,
        bearer_token: env::var("FNAPP_BEARER_TOKEN").ok(),
        ..ArmClientConfig::default()
    };
    if let Ok(endpoint) = env::var("FNAPP_ARM_ENDPOINT") {
        config.endpoint = endpoint;
    }

    let client = ArmClient::new(config).context("Failed to create ARM client")?;
    let availability = client
        .check_name_availability(name)
        .await
        .context("Failed to check name availability")?;

    if availability.name_available {
        println!("{name}: available");
    } else {
        println!(
            "{name}: unavailable ({})",
            availability
                .message
                .or(availability.reason)
                .unwrap_or_else(|| "no reason given".to_string())
        );
        std::process::exit(2);
    }

    Ok(())
}

fn print_help() {
    println!(
        r#"Function App CLI

USAGE:
    fnapp <COMMAND> [OPTIONS]

COMMANDS:
    parse-id <id>      Parse an ARM resource ID and print its parts as JSON
    check-name <name>  Validate a site name; checks global availability
                       when FNAPP_SUBSCRIPTION_ID is set
    location <name>    Normalize an Azure region name
    schema             Print the attribute schema as JSON
    help               Show this help message

EXAMPLES:
    fnapp parse-id "/subscriptions/0000/resourceGroups/rg/providers/Microsoft.Web/sites/orders-fn"
    fnapp check-name orders-fn
    fnapp location "West Europe"
"#
    );
}
