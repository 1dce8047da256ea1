//! Memoised permission and reachability predicates bound to one route.
//!
//! Each predicate owns its cache and remembers the session timestamp the
//! cache was filled under. A different timestamp on the next call means the
//! identity changed, so the cache is dropped before answering.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::authority::{Authority, RoleGrant};
use crate::session::SessionSource;

/// Answers "does the session have permission X on this route".
pub struct PermissionPredicate {
    authority: Authority,
    session: Arc<dyn SessionSource>,
    /// Timestamp the decisions below were computed under.
    seen: Mutex<Option<String>>,
    decisions: DashMap<String, bool>,
}

impl PermissionPredicate {
    /// Create a predicate for an effective authority.
    pub fn new(authority: Authority, session: Arc<dyn SessionSource>) -> Self {
        Self {
            authority,
            session,
            seen: Mutex::new(None),
            decisions: DashMap::new(),
        }
    }

    /// Check a permission against the grants of the session's roles.
    pub fn has(&self, permission: &str) -> bool {
        self.evaluate(permission, |grant| grant.grants(permission))
    }

    /// Check a permission with a custom matcher over the session's grants.
    ///
    /// The result is still cached under `permission`.
    pub fn has_with<F>(&self, permission: &str, matcher: F) -> bool
    where
        F: Fn(&RoleGrant) -> bool,
    {
        self.evaluate(permission, matcher)
    }

    fn evaluate<F>(&self, permission: &str, matcher: F) -> bool
    where
        F: Fn(&RoleGrant) -> bool,
    {
        // Held for the whole evaluation so an invalidation can't interleave.
        let mut seen = self.seen.lock();
        let timestamp = self.session.timestamp();

        if seen.as_deref() != Some(timestamp.as_str()) {
            if !self.decisions.is_empty() {
                debug!(entries = self.decisions.len(), "session changed, dropping permission cache");
            }
            self.decisions.clear();
            *seen = Some(timestamp);
        }

        if let Some(cached) = self.decisions.get(permission) {
            trace!(permission = %permission, "permission cache hit");
            return *cached;
        }

        if permission.is_empty() || !self.authority.is_list() {
            return false;
        }

        let roles = self.session.roles();
        if roles.is_empty() {
            return false;
        }

        let allowed = self
            .authority
            .grants()
            .filter(|grant| roles.iter().any(|role| role.name == grant.role))
            .any(matcher);

        self.decisions.insert(permission.to_string(), allowed);
        allowed
    }

    /// The effective authority this predicate was built from.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Number of cached decisions (for diagnostics).
    pub fn cache_size(&self) -> usize {
        self.decisions.len()
    }

    /// Drop all cached decisions.
    pub fn invalidate(&self) {
        *self.seen.lock() = None;
        self.decisions.clear();
    }
}

impl std::fmt::Debug for PermissionPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionPredicate")
            .field("authority", &self.authority)
            .field("cached", &self.decisions.len())
            .finish()
    }
}

/// Cached reachability answer.
#[derive(Debug, Default)]
struct RouteCache {
    seen: Option<String>,
    reachable: Option<bool>,
}

/// Answers "may the session enter this route at all".
pub struct RoutePredicate {
    authority: Authority,
    session: Arc<dyn SessionSource>,
    cache: Mutex<RouteCache>,
}

impl RoutePredicate {
    /// Create a predicate for an effective authority.
    pub fn new(authority: Authority, session: Arc<dyn SessionSource>) -> Self {
        Self {
            authority,
            session,
            cache: Mutex::new(RouteCache::default()),
        }
    }

    /// Whether the current session may enter the route.
    pub fn has_route(&self) -> bool {
        let mut cache = self.cache.lock();
        let timestamp = self.session.timestamp();

        if cache.seen.as_deref() != Some(timestamp.as_str()) {
            cache.reachable = None;
            cache.seen = Some(timestamp);
        }

        if let Some(reachable) = cache.reachable {
            trace!(reachable, "route cache hit");
            return reachable;
        }

        let reachable = match &self.authority {
            Authority::Granted => true,
            Authority::Ungated => false,
            list => {
                let roles = self.session.roles();
                list.mentions_any(roles.iter().map(|r| r.name.as_str()))
            }
        };

        cache.reachable = Some(reachable);
        reachable
    }

    /// The effective authority this predicate was built from.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Drop the cached answer.
    pub fn invalidate(&self) {
        *self.cache.lock() = RouteCache::default();
    }
}

impl std::fmt::Debug for RoutePredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutePredicate")
            .field("authority", &self.authority)
            .finish()
    }
}
