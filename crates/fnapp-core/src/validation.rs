//! Attribute validation and normalisation.

use crate::config::SUPPORTED_VERSIONS;

/// Maximum length of an App Service site name.
pub const MAX_NAME_LEN: usize = 60;

/// Validate a site name: 1-60 ASCII alphanumerics or dashes.
///
/// # Errors
///
/// Returns error if the name is empty, too long, or contains other characters.
pub fn validate_app_service_name(name: &str) -> Result<(), ValidationError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');

    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidName(name.to_string()))
    }
}

/// Validate the Functions runtime version.
///
/// # Errors
///
/// Returns error if the version is not one of [`SUPPORTED_VERSIONS`].
pub fn validate_version(version: &str) -> Result<(), ValidationError> {
    if SUPPORTED_VERSIONS.contains(&version) {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedVersion(version.to_string()))
    }
}

/// Reject blank values for required attributes.
///
/// # Errors
///
/// Returns error if `value` is empty or only whitespace.
pub fn require_non_empty(attribute: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Missing(attribute))
    } else {
        Ok(())
    }
}

/// Normalise an Azure location: lowercase with spaces removed.
///
/// # Examples
///
/// ```
/// use fnapp_core::normalize_location;
///
/// assert_eq!(normalize_location("West Europe"), "westeurope");
/// assert_eq!(normalize_location("eastus2"), "eastus2");
/// ```
#[must_use]
pub fn normalize_location(location: &str) -> String {
    location.replace(' ', "").to_lowercase()
}

/// Errors raised while validating a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Site name breaks the naming rules
    #[error("{0:?} may only contain alphanumeric characters and dashes and up to 60 characters in length")]
    InvalidName(String),
    /// Runtime version is not supported
    #[error("version {0:?} is not supported (expected one of ~1, beta)")]
    UnsupportedVersion(String),
    /// Connection string type is not supported
    #[error("connection string type {0:?} is not supported")]
    UnsupportedConnectionStringType(String),
    /// Two connection strings share a name
    #[error("connection string {0:?} is declared more than once")]
    DuplicateConnectionString(String),
    /// Required attribute is blank
    #[error("{0} must not be empty")]
    Missing(&'static str),
}
