//! Resource lifecycle errors.

use fnapp_arm::ClientError;
use fnapp_core::{ResourceIdError, ValidationError};

/// Errors that can occur managing a Function App.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// The site name is taken
    #[error("the name {name:?} used for the Function App needs to be globally unique and isn't available: {message}")]
    NameUnavailable {
        /// Requested name
        name: String,
        /// Server explanation
        message: String,
    },
    /// Configuration rejected before any remote call
    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),
    /// Resource ID could not be parsed
    #[error("invalid resource ID: {0}")]
    InvalidId(#[from] ResourceIdError),
    /// The server returned a site without an ID
    #[error("cannot read Function App {name} (resource group {resource_group}) ID")]
    MissingId {
        /// Site name
        name: String,
        /// Resource group
        resource_group: String,
    },
    /// Replace-only attributes changed
    #[error("changing {} requires replacing the Function App", .attributes.join(", "))]
    RequiresReplacement {
        /// Changed replace-only attributes
        attributes: Vec<&'static str>,
    },
    /// Imported resource does not exist
    #[error("Function App {0} does not exist")]
    NotFound(String),
    /// A management API call failed
    #[error("error {operation} for Function App {name:?}: {source}")]
    Remote {
        /// What was being done
        operation: &'static str,
        /// Site name
        name: String,
        /// Underlying client error
        #[source]
        source: ClientError,
    },
}

impl ResourceError {
    /// Wrap a client error with the operation and site it belongs to.
    pub(crate) fn remote(operation: &'static str, name: &str) -> impl FnOnce(ClientError) -> Self {
        let name = name.to_string();
        move |source| Self::Remote {
            operation,
            name,
            source,
        }
    }

    /// Underlying client error, if this is a remote failure.
    #[must_use]
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::Remote { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_names_operation_and_site() {
        let err = ResourceError::remote("updating application settings", "orders-fn")(
            ClientError::Request("connection reset".to_string()),
        );
        let message = err.to_string();
        assert!(message.contains("updating application settings"));
        assert!(message.contains("orders-fn"));
        assert!(err.client_error().is_some());
    }

    #[test]
    fn replacement_lists_attributes() {
        let err = ResourceError::RequiresReplacement {
            attributes: vec!["location", "tags"],
        };
        assert_eq!(
            err.to_string(),
            "changing location, tags requires replacing the Function App"
        );
    }
}
