//! Request paths of the `Microsoft.Web` management API.
//!
//! Every user-supplied segment (subscription, resource group, site name) is
//! percent-encoded so a stray `/` or `?` cannot change the addressed
//! resource.

use fnapp_core::resource_id::WEB_PROVIDER;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left as-is in a path segment (RFC 3986 unreserved).
const SEGMENT_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a single path segment.
///
/// # Examples
///
/// ```
/// use fnapp_arm::paths::encode_segment;
///
/// assert_eq!(encode_segment("orders-fn"), "orders-fn");
/// assert_eq!(encode_segment("a/b"), "a%2Fb");
/// ```
#[must_use]
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT_ESCAPE).to_string()
}

/// Path of the subscription-level name availability check.
#[must_use]
pub fn name_availability(subscription_id: &str) -> String {
    format!(
        "/subscriptions/{}/providers/{WEB_PROVIDER}/checknameavailability",
        encode_segment(subscription_id)
    )
}

/// Path of a site.
#[must_use]
pub fn site(subscription_id: &str, resource_group: &str, name: &str) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}/providers/{WEB_PROVIDER}/sites/{}",
        encode_segment(subscription_id),
        encode_segment(resource_group),
        encode_segment(name)
    )
}

/// Path of a site configuration section, e.g. `appsettings` or `web`.
#[must_use]
pub fn site_config(subscription_id: &str, resource_group: &str, name: &str, section: &str) -> String {
    format!(
        "{}/config/{section}",
        site(subscription_id, resource_group, name)
    )
}

/// Path of a `list` action on a site configuration section.
#[must_use]
pub fn site_config_list(
    subscription_id: &str,
    resource_group: &str,
    name: &str,
    section: &str,
) -> String {
    format!(
        "{}/list",
        site_config(subscription_id, resource_group, name, section)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_path() {
        assert_eq!(
            site("sub", "rg-orders", "orders-fn"),
            "/subscriptions/sub/resourceGroups/rg-orders/providers/Microsoft.Web/sites/orders-fn"
        );
    }

    #[test]
    fn config_paths() {
        assert_eq!(
            site_config("sub", "rg", "app", "web"),
            "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Web/sites/app/config/web"
        );
        assert!(site_config_list("sub", "rg", "app", "appsettings")
            .ends_with("/sites/app/config/appsettings/list"));
    }

    #[test]
    fn availability_path() {
        assert_eq!(
            name_availability("sub"),
            "/subscriptions/sub/providers/Microsoft.Web/checknameavailability"
        );
    }

    #[test]
    fn segments_are_escaped() {
        assert_eq!(encode_segment("rg with space"), "rg%20with%20space");
        assert_eq!(encode_segment("x?y#z"), "x%3Fy%23z");
        assert_eq!(encode_segment("Rg_(1).v~2"), "Rg_%281%29.v~2");
    }
}
