//! Declarative attribute schema of the Function App resource.
//!
//! | Attribute | Kind | Presence | Replace |
//! |-----------|------|----------|---------|
//! | name | string | required | yes |
//! | resource_group_name | string | required | yes |
//! | location | string | required | yes |
//! | app_service_plan_id | string | required | yes |
//! | enabled | bool | optional | yes |
//! | version | string | optional | no |
//! | storage_connection_string | string | required | yes |
//! | app_settings | map | optional | no |
//! | connection_string | list | optional+computed | no |
//! | tags | map | optional | yes |
//! | client_affinity_enabled | bool | optional+computed | yes |
//! | https_only | bool | optional | yes |
//! | site_config | block | optional+computed | no |
//! | default_hostname | string | computed | - |
//! | outbound_ip_addresses | string | computed | - |

use serde::Serialize;

/// Value kind of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// Plain string
    String,
    /// Boolean
    Bool,
    /// String-to-string map
    Map,
    /// List of nested blocks
    List,
    /// Single nested block
    Block,
}

/// Who supplies an attribute's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    /// Must be declared
    Required,
    /// May be declared; a default applies otherwise
    Optional,
    /// May be declared; the server decides otherwise
    OptionalComputed,
    /// Read-only, set by the server
    Computed,
}

/// One attribute of the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Attribute {
    /// Attribute name on the declarative surface
    pub name: &'static str,
    /// Value kind
    pub kind: AttributeKind,
    /// Presence rule
    pub presence: Presence,
    /// Changing the value requires destroying and recreating the resource
    pub force_new: bool,
    /// Value must not be shown in plans or logs
    pub sensitive: bool,
    /// Default applied when the attribute is omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
}

impl Attribute {
    const fn new(name: &'static str, kind: AttributeKind, presence: Presence) -> Self {
        Self {
            name,
            kind,
            presence,
            force_new: false,
            sensitive: false,
            default: None,
        }
    }

    const fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    const fn default(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }
}

/// Every attribute of the resource, in declaration order.
pub const SCHEMA: &[Attribute] = &[
    Attribute::new("name", AttributeKind::String, Presence::Required).force_new(),
    Attribute::new("resource_group_name", AttributeKind::String, Presence::Required).force_new(),
    Attribute::new("location", AttributeKind::String, Presence::Required).force_new(),
    Attribute::new("app_service_plan_id", AttributeKind::String, Presence::Required).force_new(),
    Attribute::new("enabled", AttributeKind::Bool, Presence::Optional)
        .force_new()
        .default("true"),
    Attribute::new("version", AttributeKind::String, Presence::Optional).default("~1"),
    Attribute::new("storage_connection_string", AttributeKind::String, Presence::Required)
        .force_new()
        .sensitive(),
    Attribute::new("app_settings", AttributeKind::Map, Presence::Optional),
    Attribute::new("connection_string", AttributeKind::List, Presence::OptionalComputed),
    Attribute::new("tags", AttributeKind::Map, Presence::Optional).force_new(),
    Attribute::new("client_affinity_enabled", AttributeKind::Bool, Presence::OptionalComputed)
        .force_new(),
    Attribute::new("https_only", AttributeKind::Bool, Presence::Optional)
        .force_new()
        .default("false"),
    Attribute::new("site_config", AttributeKind::Block, Presence::OptionalComputed),
    Attribute::new("default_hostname", AttributeKind::String, Presence::Computed),
    Attribute::new("outbound_ip_addresses", AttributeKind::String, Presence::Computed),
];

/// Look up an attribute by name.
#[must_use]
pub fn attribute(name: &str) -> Option<&'static Attribute> {
    SCHEMA.iter().find(|attr| attr.name == name)
}

/// Whether changing `name` forces replacement. Unknown names never do.
#[must_use]
pub fn is_force_new(name: &str) -> bool {
    attribute(name).is_some_and(|attr| attr.force_new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_attributes_force_new() {
        for name in ["name", "resource_group_name", "location", "app_service_plan_id"] {
            assert!(is_force_new(name), "{name} should force replacement");
        }
    }

    #[test]
    fn updatable_attributes_do_not_force_new() {
        for name in ["version", "app_settings", "connection_string", "site_config"] {
            assert!(!is_force_new(name), "{name} should update in place");
        }
    }

    #[test]
    fn only_storage_is_sensitive() {
        let sensitive: Vec<_> = SCHEMA.iter().filter(|a| a.sensitive).map(|a| a.name).collect();
        assert_eq!(sensitive, ["storage_connection_string"]);
    }

    #[test]
    fn schema_serializes() {
        let json = serde_json::to_value(SCHEMA).unwrap();
        assert_eq!(json[0]["name"], "name");
        assert_eq!(json[0]["presence"], "required");
        assert_eq!(json[5]["default"], "~1");
    }
}
