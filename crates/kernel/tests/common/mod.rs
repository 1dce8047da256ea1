#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Fixtures are built with `routeward-test-utils` and pushed through the
//! same deserialisation and reduction path the binary uses.

#![allow(dead_code)]

use std::sync::Arc;

use routeward_kernel::models::{RouteFile, UserInfo};
use routeward_kernel::routes::{RouteNode, init_routes_meta, reduce_authority};
use routeward_kernel::{Config, Navigator, SessionSource, SessionStore};
use routeward_test_utils::{TestRoute, route_file, test_user};

/// A session plus the routes reduced against it.
pub struct TestApp {
    pub session: Arc<SessionStore>,
    pub routes: Vec<RouteNode>,
}

impl TestApp {
    /// Reduce the given fixtures against a fresh, logged-out session.
    pub fn new(routes: &[TestRoute]) -> Self {
        let session = Arc::new(SessionStore::new());
        let source: Arc<dyn SessionSource> = session.clone();
        let routes = reduce_authority(init_routes_meta(parse(routes).routes), &source);
        Self { session, routes }
    }

    /// Log in a user holding `roles`.
    pub fn login(&self, roles: &[&str]) {
        self.session.login(user(roles));
    }

    /// Node at an index path from the root level.
    pub fn node(&self, trail: &[usize]) -> &RouteNode {
        let mut level = self.routes.as_slice();
        let mut node = None;
        for &index in trail {
            let current = &level[index];
            level = current.children();
            node = Some(current);
        }
        node.expect("empty trail")
    }
}

/// Parse fixtures as a route file.
pub fn parse(routes: &[TestRoute]) -> RouteFile {
    serde_json::from_value(route_file(routes)).expect("fixture should deserialise")
}

/// A user holding `roles`, via the login payload shape.
pub fn user(roles: &[&str]) -> UserInfo {
    serde_json::from_value(test_user(roles)).expect("user payload should deserialise")
}

/// Navigator over fixtures with the given configuration.
pub fn navigator(routes: &[TestRoute], config: &Config) -> Navigator {
    Navigator::new(parse(routes).routes, config, Arc::new(SessionStore::new()))
}
