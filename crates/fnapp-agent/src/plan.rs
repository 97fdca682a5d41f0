//! Deciding what to do with a resource.

use fnapp_core::{ChangeSet, FunctionAppConfig, ResourceData};

/// Kind of action a plan takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Create the resource
    Create,
    /// Update in place
    Update,
    /// Delete and create again
    Replace,
    /// Delete the resource
    Delete,
    /// Nothing to do
    Noop,
}

impl Action {
    /// Stored name of the action.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::Delete => "delete",
            Self::Noop => "noop",
        }
    }
}

/// A planned action with the state it operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Create `desired`
    Create {
        /// Desired configuration
        desired: FunctionAppConfig,
    },
    /// Update `current` in place to `desired`
    Update {
        /// Refreshed state
        current: ResourceData,
        /// Desired configuration
        desired: FunctionAppConfig,
    },
    /// Delete `current`, then create `desired`
    Replace {
        /// Refreshed state
        current: ResourceData,
        /// Desired configuration
        desired: FunctionAppConfig,
        /// Replace-only attributes that changed
        attributes: Vec<&'static str>,
    },
    /// Delete `current`
    Delete {
        /// Refreshed state
        current: ResourceData,
    },
    /// Nothing to create or delete; stale state (no identity) is dropped
    Noop,
}

impl Plan {
    /// Kind of action.
    #[must_use]
    pub fn action(&self) -> Action {
        match self {
            Self::Create { .. } => Action::Create,
            Self::Update { .. } => Action::Update,
            Self::Replace { .. } => Action::Replace,
            Self::Delete { .. } => Action::Delete,
            Self::Noop => Action::Noop,
        }
    }
}

/// Decide what to do from refreshed state and the desired configuration.
///
/// State without an identity counts as absent.
#[must_use]
pub fn plan(current: Option<ResourceData>, desired: Option<FunctionAppConfig>) -> Plan {
    let current = current.filter(ResourceData::exists);

    match (current, desired) {
        (None, None) => Plan::Noop,
        (None, Some(desired)) => Plan::Create { desired },
        (Some(current), None) => Plan::Delete { current },
        (Some(current), Some(desired)) => {
            let changes = ChangeSet::between(&current.config, &desired);
            if changes.requires_replacement() {
                Plan::Replace {
                    current,
                    desired,
                    attributes: changes.replacement_attributes(),
                }
            } else {
                Plan::Update { current, desired }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Web/sites/app";

    fn config() -> FunctionAppConfig {
        FunctionAppConfig::new("app", "rg", "westeurope", "plan", "conn")
    }

    #[test]
    fn absent_resource() {
        assert_eq!(plan(None, None), Plan::Noop);
        assert_eq!(plan(None, Some(config())).action(), Action::Create);
    }

    #[test]
    fn cleared_identity_counts_as_absent() {
        let gone = ResourceData::new(config());
        assert_eq!(plan(Some(gone.clone()), Some(config())).action(), Action::Create);
        assert_eq!(plan(Some(gone), None), Plan::Noop);
    }

    #[test]
    fn existing_resource() {
        let current = ResourceData::with_id(ID, config());
        assert_eq!(plan(Some(current.clone()), None).action(), Action::Delete);
        assert_eq!(
            plan(Some(current.clone()), Some(config())).action(),
            Action::Update
        );

        let mut desired = config();
        desired
            .app_settings
            .insert("FEATURE".to_string(), "on".to_string());
        assert_eq!(
            plan(Some(current.clone()), Some(desired.clone())).action(),
            Action::Update
        );

        desired.app_service_plan_id = "other-plan".to_string();
        match plan(Some(current), Some(desired)) {
            Plan::Replace { attributes, .. } => assert_eq!(attributes, ["app_service_plan_id"]),
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn action_names() {
        assert_eq!(Action::Replace.as_str(), "replace");
        assert_eq!(Action::Noop.as_str(), "noop");
    }
}
