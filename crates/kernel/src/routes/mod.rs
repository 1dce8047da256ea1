//! Route tree, route table and navigation guard.

pub mod guard;
pub mod matcher;
pub mod tree;

pub use guard::{
    DenyReason, GuardMode, NavigationDecision, NavigationGuard, document_title, needs_check,
};
pub use matcher::{RouteMatch, RouteTable, WILDCARD_PARAM};
pub use tree::{
    NodeMeta, RouteDefinition, RouteMeta, RouteNode, add_fallback_routes, init_routes_meta,
    reduce_authority,
};
