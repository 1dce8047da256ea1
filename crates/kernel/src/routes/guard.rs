//! Navigation guard run before every route change, and the title hook run
//! after it.

use serde::Serialize;
use tracing::{info, warn};

use super::matcher::RouteMatch;
use super::tree::RouteNode;
use crate::session::SessionStore;

/// How strictly the guard enforces reachability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardMode {
    /// Unreachable routes redirect to the permission-denied page.
    Production,
    /// Unreachable routes are logged and allowed.
    Development,
}

impl GuardMode {
    /// Development only when asked for and not running in production.
    pub fn select(dev_mode: bool, environment: &str) -> Self {
        if dev_mode && environment != "production" {
            Self::Development
        } else {
            Self::Production
        }
    }
}

/// Why a navigation was redirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// A checked route was requested before any user data was loaded.
    NotLoaded,
    /// The session may not enter the route.
    Forbidden,
}

/// Outcome of the guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum NavigationDecision {
    Allow,
    Redirect { to: String, reason: DenyReason },
}

/// The before-each navigation guard.
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    mode: GuardMode,
    login_path: String,
    forbidden_path: String,
}

impl NavigationGuard {
    /// Create a guard.
    pub fn new(mode: GuardMode, login_path: &str, forbidden_path: &str) -> Self {
        Self {
            mode,
            login_path: login_path.to_string(),
            forbidden_path: forbidden_path.to_string(),
        }
    }

    /// The enforcement mode.
    pub fn mode(&self) -> GuardMode {
        self.mode
    }

    /// Decide whether the navigation to `to` may proceed.
    pub fn before_each(&self, to: &RouteMatch<'_>, session: &SessionStore) -> NavigationDecision {
        let leaf = to.leaf();

        match self.mode {
            GuardMode::Development => {
                if !leaf_reachable(leaf) {
                    warn!(
                        route = %leaf.name_or_empty(),
                        pattern = %to.pattern,
                        "no permission for route, allowed in development mode"
                    );
                }
                NavigationDecision::Allow
            }
            GuardMode::Production => {
                if !needs_check(&to.matched) {
                    return NavigationDecision::Allow;
                }

                if !session.is_loaded() {
                    return NavigationDecision::Redirect {
                        to: self.login_path.clone(),
                        reason: DenyReason::NotLoaded,
                    };
                }

                if leaf_reachable(leaf) {
                    NavigationDecision::Allow
                } else {
                    info!(
                        route = %leaf.name_or_empty(),
                        pattern = %to.pattern,
                        "navigation denied"
                    );
                    NavigationDecision::Redirect {
                        to: self.forbidden_path.clone(),
                        reason: DenyReason::Forbidden,
                    }
                }
            }
        }
    }
}

/// A public leaf stays open even under a gated parent.
fn leaf_reachable(leaf: &RouteNode) -> bool {
    !leaf.meta.authority.is_checked() || leaf.meta.has_route()
}

/// A navigation is checked when any matched route carries a gate.
pub fn needs_check(matched: &[&RouteNode]) -> bool {
    matched.iter().any(|node| node.meta.authority.is_checked())
}

/// Document title for a matched chain: the deepest title, prefixed with
/// the system name, or the system name alone.
pub fn document_title(matched: &[&RouteNode], system_name: &str) -> String {
    match matched.iter().rev().find_map(|node| node.meta.title.as_deref()) {
        Some(title) => format!("{system_name}-{title}"),
        None => system_name.to_string(),
    }
}
