//! # Function App Agent
//!
//! Keeps one Function App in the state declared by a JSON file.
//!
//! Each run refreshes the stored state, plans one of create, update,
//! replace or delete, applies it through [`fnapp_resource`] and records
//! the outcome in a `SQLite` apply log.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod persistence;
pub mod plan;
pub mod runtime;

pub use config::AgentConfig;
pub use persistence::SqliteStore;
pub use plan::{Action, Plan};
pub use runtime::Agent;
