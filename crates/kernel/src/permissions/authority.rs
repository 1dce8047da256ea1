//! Authority values and the merge rule used by the bottom-up reduction.

use std::collections::BTreeSet;

use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

/// A role paired with the fine-grained permissions it grants on a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    pub role: String,
    pub permissions: Vec<String>,
}

impl RoleGrant {
    /// Create a grant from borrowed names.
    pub fn new(role: &str, permissions: &[&str]) -> Self {
        Self {
            role: role.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Whether this grant includes `permission`.
    pub fn grants(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

// Serialised back into the `[role, [permission, ...]]` shape it was read from.
impl Serialize for RoleGrant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.role, &self.permissions).serialize(serializer)
    }
}

/// One entry of a declared permission list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PermissionEntry {
    /// A bare role name.
    Bare(String),
    /// A role together with the permissions it grants.
    RoleScoped(RoleGrant),
}

impl PermissionEntry {
    /// Parse one raw entry.
    ///
    /// Accepts a string or a two-element `[role, [permission, ...]]` array.
    /// Anything else returns `None`; callers drop it.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(name) => Some(Self::Bare(name.clone())),
            Value::Array(pair) if pair.len() == 2 => {
                let role = pair[0].as_str()?;
                let permissions = pair[1]
                    .as_array()?
                    .iter()
                    .map(|p| p.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()?;

                Some(Self::RoleScoped(RoleGrant {
                    role: role.to_string(),
                    permissions,
                }))
            }
            _ => None,
        }
    }

    /// The role name this entry refers to.
    pub fn role_name(&self) -> &str {
        match self {
            Self::Bare(name) => name,
            Self::RoleScoped(grant) => &grant.role,
        }
    }

    /// The grant, if this entry carries one.
    pub fn as_grant(&self) -> Option<&RoleGrant> {
        match self {
            Self::Bare(_) => None,
            Self::RoleScoped(grant) => Some(grant),
        }
    }
}

/// Parse a raw permission list, dropping malformed entries.
///
/// `route` only labels the log line.
pub fn parse_entries(route: &str, raw: &[Value]) -> Vec<PermissionEntry> {
    raw.iter()
        .filter_map(|value| {
            let entry = PermissionEntry::from_value(value);
            if entry.is_none() {
                warn!(route = %route, entry = %value, "dropping malformed authority entry");
            }
            entry
        })
        .collect()
}

/// A route's permission requirement, declared or effective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authority {
    /// `true`: any session may pass.
    Granted,
    /// `false`: no permission gate. Navigation guards treat these routes as
    /// public; the reachability predicate answers `false` for them.
    Ungated,
    /// A permission list as written in the route configuration.
    Declared(Vec<PermissionEntry>),
    /// The union of role names produced by merging two or more lists.
    Merged(BTreeSet<String>),
}

impl Authority {
    /// Whether this authority gates navigation (anything but `Ungated`).
    pub fn is_checked(&self) -> bool {
        !matches!(self, Self::Ungated)
    }

    /// Whether this is a list of entries or role names.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::Declared(_) | Self::Merged(_))
    }

    /// Role names referenced by this authority.
    pub fn role_names(&self) -> BTreeSet<String> {
        match self {
            Self::Granted | Self::Ungated => BTreeSet::new(),
            Self::Declared(entries) => entries.iter().map(|e| e.role_name().to_string()).collect(),
            Self::Merged(roles) => roles.clone(),
        }
    }

    /// Whether any of `roles` is referenced by this authority.
    pub fn mentions_any<'a>(&self, mut roles: impl Iterator<Item = &'a str>) -> bool {
        match self {
            Self::Granted | Self::Ungated => false,
            Self::Declared(entries) => {
                roles.any(|role| entries.iter().any(|e| e.role_name() == role))
            }
            Self::Merged(names) => roles.any(|role| names.contains(role)),
        }
    }

    /// Role grants carried by this authority. Merged authorities carry none.
    pub fn grants(&self) -> impl Iterator<Item = &RoleGrant> {
        let entries: &[PermissionEntry] = match self {
            Self::Declared(entries) => entries,
            _ => &[],
        };
        entries.iter().filter_map(PermissionEntry::as_grant)
    }
}

impl Serialize for Authority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Granted => serializer.serialize_bool(true),
            Self::Ungated => serializer.serialize_bool(false),
            Self::Declared(entries) => entries.serialize(serializer),
            Self::Merged(roles) => roles.serialize(serializer),
        }
    }
}

/// Merge two authorities.
///
/// `Granted` absorbs everything, `Ungated` is the identity, and two lists
/// flatten to the union of their role names. The rule is commutative and
/// associative, so sibling folds may run in any order.
pub fn merge(a: &Authority, b: &Authority) -> Authority {
    match (a, b) {
        (Authority::Granted, _) | (_, Authority::Granted) => Authority::Granted,
        (Authority::Ungated, other) | (other, Authority::Ungated) => other.clone(),
        _ => {
            let mut roles = a.role_names();
            roles.extend(b.role_names());
            Authority::Merged(roles)
        }
    }
}

/// Merge a node's own authority with the folded authority of its children.
///
/// An absent fold (no children to fold) keeps the node's own value.
pub fn merge_optional(own: &Authority, folded: Option<&Authority>) -> Authority {
    match folded {
        Some(down) => merge(own, down),
        None => own.clone(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn declared(entries: Value) -> Authority {
        Authority::Declared(parse_entries("test", entries.as_array().unwrap()))
    }

    fn merged(roles: &[&str]) -> Authority {
        Authority::Merged(roles.iter().map(|r| r.to_string()).collect())
    }

    #[test]
    fn parse_accepts_bare_and_pairs() {
        let entries = parse_entries("r", json!(["guest", ["admin", ["edit", "view"]]]).as_array().unwrap());
        assert_eq!(
            entries,
            vec![
                PermissionEntry::Bare("guest".to_string()),
                PermissionEntry::RoleScoped(RoleGrant::new("admin", &["edit", "view"])),
            ]
        );
    }

    #[test]
    fn parse_drops_malformed_entries() {
        let raw = json!([["admin"], ["user", ["view"]], 42, ["a", "b"], ["x", [1]], ["a", ["b"], "c"]]);
        let entries = parse_entries("r", raw.as_array().unwrap());
        assert_eq!(
            entries,
            vec![PermissionEntry::RoleScoped(RoleGrant::new("user", &["view"]))]
        );
    }

    #[test]
    fn granted_absorbs() {
        let list = declared(json!([["admin", ["edit"]]]));
        for a in [Authority::Granted, Authority::Ungated, list.clone(), merged(&["x"])] {
            assert_eq!(merge(&a, &Authority::Granted), Authority::Granted);
            assert_eq!(merge(&Authority::Granted, &a), Authority::Granted);
        }
    }

    #[test]
    fn ungated_is_identity() {
        let list = declared(json!([["admin", ["edit"]]]));
        for a in [Authority::Granted, Authority::Ungated, list.clone(), merged(&["x"])] {
            assert_eq!(merge(&a, &Authority::Ungated), a);
            assert_eq!(merge(&Authority::Ungated, &a), a);
        }
    }

    #[test]
    fn lists_flatten_to_role_union() {
        let a = declared(json!([["admin", ["edit"]], "guest"]));
        let b = declared(json!([["guest", ["view"]], ["ops", []]]));
        assert_eq!(merge(&a, &b), merged(&["admin", "guest", "ops"]));
    }

    #[test]
    fn merge_is_commutative_and_associative() {
        let a = declared(json!([["admin", ["edit"]]]));
        let b = merged(&["guest", "ops"]);
        let c = declared(json!(["auditor", ["admin", ["view"]]]));

        assert_eq!(merge(&a, &b), merge(&b, &a));
        assert_eq!(
            merge(&merge(&a, &b), &c),
            merge(&a, &merge(&b, &c))
        );
    }

    #[test]
    fn absent_fold_keeps_own_value() {
        assert_eq!(merge_optional(&Authority::Ungated, None), Authority::Ungated);
        assert_eq!(
            merge_optional(&Authority::Ungated, Some(&Authority::Granted)),
            Authority::Granted
        );
    }

    #[test]
    fn serializes_to_config_shape() {
        let a = declared(json!(["guest", ["admin", ["edit"]]]));
        assert_eq!(serde_json::to_value(&a).unwrap(), json!(["guest", ["admin", ["edit"]]]));
        assert_eq!(serde_json::to_value(Authority::Granted).unwrap(), json!(true));
        assert_eq!(serde_json::to_value(merged(&["b", "a"])).unwrap(), json!(["a", "b"]));
    }
}
