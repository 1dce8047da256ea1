//! Element-level permission check used by templates.
//!
//! A template binds an element to the current route and a permission; the
//! element is kept only when the route's `has` check passes.

use crate::permissions::RoleGrant;
use crate::routes::NodeMeta;

/// Arguments bound to an element.
pub enum HasArgs<'a> {
    /// Check a permission with the default search.
    Permission(&'a str),
    /// Check a permission with a custom matcher over the session's grants.
    WithMatcher(&'a str, &'a dyn Fn(&RoleGrant) -> bool),
}

/// Whether the element bound with `args` stays in the document.
pub fn retain_element(meta: &NodeMeta, args: HasArgs<'_>) -> bool {
    match args {
        HasArgs::Permission(permission) => meta.has(permission),
        HasArgs::WithMatcher(permission, matcher) => meta.has_with(permission, matcher),
    }
}
