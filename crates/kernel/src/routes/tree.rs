//! Route tree normalisation and bottom-up authority reduction.
//!
//! Route files are turned into a tree in three steps:
//!
//! 1. [`init_routes_meta`] fills in metadata defaults and parses authority.
//! 2. [`add_fallback_routes`] optionally appends `403` / `*` routes to every
//!    sibling level.
//! 3. [`reduce_authority`] folds authority from the leaves up and binds the
//!    `has` / `has_route` predicates to every node.
//!
//! After reduction a node's authority is never stricter than the union of
//! itself and its descendants: an open leaf opens every ancestor, and an
//! ungated node takes on whatever its subtree requires.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::{RawAuthority, RouteConfig};
use crate::permissions::{
    Authority, PermissionPredicate, RoleGrant, RoutePredicate, merge_optional, parse_entries,
};
use crate::session::SessionSource;

/// Path of the per-level permission-denied route.
pub const FORBIDDEN_SEGMENT: &str = "403";

/// Path of the per-level catch-all route.
pub const CATCH_ALL_SEGMENT: &str = "*";

/// Normalised route metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMeta {
    pub authority: Authority,
    pub hide_in_menu: bool,
    pub hide_children_in_menu: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl RouteMeta {
    /// Metadata for a route with the given authority and no other settings.
    pub fn with_authority(authority: Authority) -> Self {
        Self {
            authority,
            hide_in_menu: false,
            hide_children_in_menu: false,
            title: None,
            label: None,
        }
    }
}

/// A route with normalised metadata, before reduction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteDefinition {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    pub meta: RouteMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<RouteDefinition>>,
}

impl RouteDefinition {
    fn fallback(path: &str, component: &str) -> Self {
        Self {
            path: path.to_string(),
            name: None,
            redirect: None,
            alias: None,
            component: Some(component.to_string()),
            meta: RouteMeta::with_authority(Authority::Ungated),
            children: None,
        }
    }
}

/// Metadata of a reduced node: effective authority plus live predicates.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMeta {
    pub authority: Authority,
    pub hide_in_menu: bool,
    pub hide_children_in_menu: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip)]
    permission: PermissionPredicate,
    #[serde(skip)]
    reachability: RoutePredicate,
}

impl NodeMeta {
    fn bind(meta: RouteMeta, authority: Authority, session: &Arc<dyn SessionSource>) -> Self {
        Self {
            permission: PermissionPredicate::new(authority.clone(), Arc::clone(session)),
            reachability: RoutePredicate::new(authority.clone(), Arc::clone(session)),
            authority,
            hide_in_menu: meta.hide_in_menu,
            hide_children_in_menu: meta.hide_children_in_menu,
            title: meta.title,
            label: meta.label,
        }
    }

    /// Does the session hold `permission` on this route.
    pub fn has(&self, permission: &str) -> bool {
        self.permission.has(permission)
    }

    /// Like [`has`](Self::has), searching the session's grants with `matcher`.
    pub fn has_with<F>(&self, permission: &str, matcher: F) -> bool
    where
        F: Fn(&RoleGrant) -> bool,
    {
        self.permission.has_with(permission, matcher)
    }

    /// May the session enter this route at all.
    pub fn has_route(&self) -> bool {
        self.reachability.has_route()
    }

    /// The permission predicate itself (for cache diagnostics).
    pub fn permission_predicate(&self) -> &PermissionPredicate {
        &self.permission
    }
}

/// A reduced route node.
#[derive(Debug, Serialize)]
pub struct RouteNode {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    pub meta: NodeMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<RouteNode>>,
}

impl RouteNode {
    /// Child nodes, empty for a leaf.
    pub fn children(&self) -> &[RouteNode] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Name, or the empty string.
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// Normalise raw route metadata, recursively.
///
/// Missing authority becomes [`Authority::Ungated`], missing flags become
/// `false`, and an empty permission list becomes [`Authority::Granted`].
pub fn init_routes_meta(routes: Vec<RouteConfig>) -> Vec<RouteDefinition> {
    routes.into_iter().map(init_route).collect()
}

fn init_route(route: RouteConfig) -> RouteDefinition {
    let ident = route.name.as_deref().unwrap_or(route.path.as_str()).to_string();
    let authority = match route.meta.authority {
        None | Some(RawAuthority::Flag(false)) => Authority::Ungated,
        Some(RawAuthority::Flag(true)) => Authority::Granted,
        Some(RawAuthority::List(raw)) if raw.is_empty() => Authority::Granted,
        Some(RawAuthority::List(raw)) => Authority::Declared(parse_entries(&ident, &raw)),
        Some(RawAuthority::Other(value)) => {
            warn!(route = %ident, authority = %value, "unrecognised authority, denying all");
            Authority::Declared(Vec::new())
        }
    };

    RouteDefinition {
        path: route.path,
        name: route.name,
        redirect: route.redirect,
        alias: route.alias,
        component: route.component,
        meta: RouteMeta {
            authority,
            hide_in_menu: route.meta.hide_in_menu.unwrap_or(false),
            hide_children_in_menu: route.meta.hide_children_in_menu.unwrap_or(false),
            title: route.meta.title,
            label: route.meta.label,
        },
        children: route.children.map(init_routes_meta),
    }
}

/// Append a `403` and a `*` route to the end of every non-empty sibling
/// level, recursively. Both are ungated.
pub fn add_fallback_routes(
    routes: Vec<RouteDefinition>,
    forbidden_component: &str,
    not_found_component: &str,
) -> Vec<RouteDefinition> {
    if routes.is_empty() {
        return routes;
    }

    let mut level: Vec<RouteDefinition> = routes
        .into_iter()
        .map(|mut route| {
            route.children = route
                .children
                .map(|c| add_fallback_routes(c, forbidden_component, not_found_component));
            route
        })
        .collect();

    level.push(RouteDefinition::fallback(FORBIDDEN_SEGMENT, forbidden_component));
    level.push(RouteDefinition::fallback(CATCH_ALL_SEGMENT, not_found_component));
    level
}

/// Reduce authority from the leaves up and bind predicates to every node.
///
/// Each node's effective authority is its own declared authority merged
/// with the fold of its children's effective authorities. A node whose
/// `children` is present but empty keeps its own authority.
pub fn reduce_authority(
    routes: Vec<RouteDefinition>,
    session: &Arc<dyn SessionSource>,
) -> Vec<RouteNode> {
    let (nodes, root) = reduce_level(routes, session);
    info!(routes = nodes.len(), authority = ?root, "route authority reduced");
    nodes
}

/// Reduce one sibling level, returning the nodes and the fold of their
/// effective authorities (`None` for an empty level).
fn reduce_level(
    routes: Vec<RouteDefinition>,
    session: &Arc<dyn SessionSource>,
) -> (Vec<RouteNode>, Option<Authority>) {
    let mut nodes = Vec::with_capacity(routes.len());
    let mut folded: Option<Authority> = None;

    for route in routes {
        let (node, authority) = reduce_node(route, session);
        folded = Some(merge_optional(&authority, folded.as_ref()));
        nodes.push(node);
    }

    (nodes, folded)
}

fn reduce_node(route: RouteDefinition, session: &Arc<dyn SessionSource>) -> (RouteNode, Authority) {
    let RouteDefinition {
        path,
        name,
        redirect,
        alias,
        component,
        meta,
        children,
    } = route;

    let (children, authority) = match children {
        Some(children) => {
            let (nodes, down) = reduce_level(children, session);
            let authority = merge_optional(&meta.authority, down.as_ref());
            (Some(nodes), authority)
        }
        None => (None, meta.authority.clone()),
    };

    debug!(path = %path, authority = ?authority, "reduced route");

    let node = RouteNode {
        path,
        name,
        redirect,
        alias,
        component,
        meta: NodeMeta::bind(meta, authority.clone(), session),
        children,
    };

    (node, authority)
}
