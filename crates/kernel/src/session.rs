//! Session state read by every permission predicate.
//!
//! The login and logout flows live outside the kernel; they only report
//! their outcome here. Every identity transition issues a new timestamp,
//! which is what predicate caches compare against.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::models::{Role, UserInfo};

/// Read-only view of the session consumed by predicates.
pub trait SessionSource: Send + Sync {
    /// Roles currently held, in session order.
    fn roles(&self) -> Vec<Role>;

    /// Opaque token that changes whenever the authenticated identity does.
    fn timestamp(&self) -> String;
}

#[derive(Debug, Default)]
struct SessionState {
    user: UserInfo,
    /// Whether user data has been loaded by a login flow.
    loaded: bool,
    timestamp: String,
}

/// In-process session store.
#[derive(Debug)]
pub struct SessionStore {
    state: RwLock<SessionState>,
    sequence: AtomicU64,
}

impl SessionStore {
    /// Create an empty, unloaded session.
    pub fn new() -> Self {
        let store = Self {
            state: RwLock::new(SessionState::default()),
            sequence: AtomicU64::new(0),
        };
        store.state.write().timestamp = store.next_timestamp();
        store
    }

    /// Record a successful login.
    pub fn login(&self, user: UserInfo) {
        let timestamp = self.next_timestamp();
        let mut state = self.state.write();

        info!(
            username = %user.username,
            roles = user.roles.len(),
            "session logged in"
        );

        state.user = user;
        state.loaded = true;
        state.timestamp = timestamp;
    }

    /// Clear the session (logout or expiry).
    pub fn clear(&self) {
        let timestamp = self.next_timestamp();
        let mut state = self.state.write();

        debug!(username = %state.user.username, "session cleared");

        state.user = UserInfo::default();
        state.loaded = false;
        state.timestamp = timestamp;
    }

    /// Whether a login flow has populated the session.
    pub fn is_loaded(&self) -> bool {
        self.state.read().loaded
    }

    fn next_timestamp(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{}-{seq}", Utc::now().timestamp_millis())
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionSource for SessionStore {
    fn roles(&self) -> Vec<Role> {
        self.state.read().user.roles.clone()
    }

    fn timestamp(&self) -> String {
        self.state.read().timestamp.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn user(roles: &[&str]) -> UserInfo {
        UserInfo {
            username: "tester".to_string(),
            roles: roles.iter().map(|r| Role::new(r)).collect(),
            ..UserInfo::default()
        }
    }

    #[test]
    fn new_session_is_unloaded_without_roles() {
        let store = SessionStore::new();
        assert!(!store.is_loaded());
        assert!(store.roles().is_empty());
        assert!(!store.timestamp().is_empty());
    }

    #[test]
    fn login_loads_roles_and_refreshes_timestamp() {
        let store = SessionStore::new();
        let before = store.timestamp();

        store.login(user(&["admin"]));

        assert!(store.is_loaded());
        assert_eq!(store.roles(), vec![Role::new("admin")]);
        assert_ne!(store.timestamp(), before);
    }

    #[test]
    fn clear_resets_and_refreshes_timestamp() {
        let store = SessionStore::new();
        store.login(user(&["admin"]));
        let logged_in = store.timestamp();

        store.clear();

        assert!(!store.is_loaded());
        assert!(store.roles().is_empty());
        assert_ne!(store.timestamp(), logged_in);
    }

    #[test]
    fn back_to_back_transitions_differ() {
        let store = SessionStore::new();
        store.clear();
        let first = store.timestamp();
        store.clear();
        assert_ne!(store.timestamp(), first);
    }
}
