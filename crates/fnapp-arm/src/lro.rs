//! Long-running operation tracking.
//!
//! ARM answers slow writes with `201 Created` or `202 Accepted` and a
//! header pointing at a status resource:
//!
//! - `Azure-AsyncOperation`: poll until the body's `status` is terminal
//! - `Location`: poll until the response is no longer `202`
//!
//! `Retry-After` (seconds) on any of these responses sets the next delay.

use crate::models::OperationStatus;
use reqwest::header::{HeaderMap, LOCATION, RETRY_AFTER};
use std::time::Duration;
use url::Url;

/// Header carrying the async operation status URL.
pub const ASYNC_OPERATION_HEADER: &str = "Azure-AsyncOperation";

/// Where to poll for completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollTarget {
    /// Status resource with a `status` field
    AsyncOperation(Url),
    /// Resource location answering `202` while in progress
    Location(Url),
}

impl PollTarget {
    /// Pick a poll target from an initial response.
    ///
    /// Returns `None` when the response is already final (anything other
    /// than `201`/`202`, or no usable header).
    #[must_use]
    pub fn from_response(status: u16, headers: &HeaderMap) -> Option<Self> {
        if status != 201 && status != 202 {
            return None;
        }

        if let Some(url) = header_url(headers, ASYNC_OPERATION_HEADER) {
            return Some(Self::AsyncOperation(url));
        }

        header_url(headers, LOCATION.as_str()).map(Self::Location)
    }

    /// URL to poll.
    #[must_use]
    pub fn url(&self) -> &Url {
        match self {
            Self::AsyncOperation(url) | Self::Location(url) => url,
        }
    }
}

fn header_url(headers: &HeaderMap, name: &str) -> Option<Url> {
    let value = headers.get(name)?.to_str().ok()?;
    match Url::parse(value) {
        Ok(url) => Some(url),
        Err(err) => {
            tracing::warn!(header = name, value, error = %err, "Ignoring unparsable polling URL");
            None
        }
    }
}

/// Progress of a long-running operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationState {
    /// Still running
    InProgress,
    /// Finished successfully
    Succeeded,
    /// Finished with an error
    Failed(String),
    /// Cancelled before finishing
    Canceled,
}

impl OperationState {
    /// Interpret an `Azure-AsyncOperation` status body.
    #[must_use]
    pub fn from_status(body: &OperationStatus) -> Self {
        match body.status.to_ascii_lowercase().as_str() {
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed(
                body.error
                    .as_ref()
                    .and_then(|e| e.message.clone().or_else(|| e.code.clone()))
                    .unwrap_or_else(|| "operation failed".to_string()),
            ),
            "canceled" | "cancelled" => Self::Canceled,
            _ => Self::InProgress,
        }
    }

    /// Interpret the status code of a `Location` poll.
    #[must_use]
    pub fn from_location_status(status: u16) -> Self {
        if status == 202 {
            Self::InProgress
        } else {
            Self::Succeeded
        }
    }
}

/// Delay requested by `Retry-After`, in whole seconds.
#[must_use]
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
