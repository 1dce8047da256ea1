//! Navigator: the reduced route table, the guard and the session together.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::error::RouteResult;
use crate::menu::{NavMenuItem, nav_menu_config};
use crate::models::{RouteConfig, RouteFile};
use crate::routes::{
    NavigationDecision, NavigationGuard, RouteTable, add_fallback_routes, document_title,
    init_routes_meta, reduce_authority,
};
use crate::session::{SessionSource, SessionStore};

/// Component names used for generated fallback routes.
const FORBIDDEN_COMPONENT: &str = "NoPermission";
const NOT_FOUND_COMPONENT: &str = "NotFound";

/// Result of one navigation.
#[derive(Debug, Clone, Serialize)]
pub struct Navigation {
    /// Path as requested.
    pub requested: String,
    /// Pattern the path resolved to, after redirects.
    pub pattern: String,
    /// Name of the resolved route, if it has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    pub params: BTreeMap<String, String>,
    #[serde(flatten)]
    pub decision: NavigationDecision,
    /// Document title of the page finally shown.
    pub title: String,
}

/// Resolves and guards navigations over a reduced route tree.
#[derive(Debug)]
pub struct Navigator {
    table: RouteTable,
    guard: NavigationGuard,
    session: Arc<SessionStore>,
    system_name: String,
}

impl Navigator {
    /// Build a navigator from raw route configuration.
    pub fn new(routes: Vec<RouteConfig>, config: &Config, session: Arc<SessionStore>) -> Self {
        let mut definitions = init_routes_meta(routes);
        if config.fallback_routes {
            definitions =
                add_fallback_routes(definitions, FORBIDDEN_COMPONENT, NOT_FOUND_COMPONENT);
        }

        let source: Arc<dyn SessionSource> = session.clone();
        let table = RouteTable::new(reduce_authority(definitions, &source));

        Self {
            table,
            guard: NavigationGuard::new(
                config.guard_mode(),
                &config.login_path,
                &config.forbidden_path,
            ),
            session,
            system_name: config.system_name.clone(),
        }
    }

    /// Build a navigator from the configured route file.
    pub fn from_config(config: &Config, session: Arc<SessionStore>) -> RouteResult<Self> {
        let file = RouteFile::load(&config.routes_file)?;
        Ok(Self::new(file.routes, config, session))
    }

    /// Resolve `path`, run the guard, and compute the resulting title.
    pub fn navigate(&self, path: &str) -> RouteResult<Navigation> {
        let to = self.table.resolve(path)?;
        let decision = self.guard.before_each(&to, &self.session);

        let title = match &decision {
            NavigationDecision::Allow => document_title(&to.matched, &self.system_name),
            NavigationDecision::Redirect { to: target, .. } => self
                .table
                .match_path(target)
                .map(|shown| document_title(&shown.matched, &self.system_name))
                .unwrap_or_else(|| self.system_name.clone()),
        };

        debug!(path = %path, pattern = %to.pattern, decision = ?decision, "navigation resolved");

        Ok(Navigation {
            requested: path.to_string(),
            pattern: to.pattern.clone(),
            route: to.leaf().name.clone(),
            params: to.params.clone(),
            decision,
            title,
        })
    }

    /// Navigation menu for the reduced tree.
    pub fn nav_menu(&self) -> Vec<NavMenuItem<'_>> {
        nav_menu_config(self.table.routes())
    }

    /// The route table.
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// The guard.
    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    /// The session the predicates read.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::UserInfo;
    use crate::routes::DenyReason;

    fn navigator(config: &Config) -> Navigator {
        let file: RouteFile = serde_json::from_value(json!({ "routes": [
            { "path": "/home", "meta": { "hideInMenu": true }, "children": [
                { "path": "", "name": "home", "meta": { "authority": true, "title": "Map" } },
            ]},
            { "path": "/login", "name": "login", "meta": { "title": "Sign in", "hideInMenu": true } },
            { "path": "/", "redirect": "/home", "meta": { "hideInMenu": true } },
        ]}))
        .unwrap();
        Navigator::new(file.routes, config, Arc::new(SessionStore::new()))
    }

    #[test]
    fn unauthenticated_home_redirects_to_login() {
        let nav = navigator(&Config::default());
        let result = nav.navigate("/").unwrap();

        assert_eq!(result.pattern, "/home");
        assert_eq!(result.route.as_deref(), Some("home"));
        assert_eq!(
            result.decision,
            NavigationDecision::Redirect {
                to: "/login".to_string(),
                reason: DenyReason::NotLoaded
            }
        );
        assert_eq!(result.title, "Routeward-Sign in");
    }

    #[test]
    fn logged_in_home_is_allowed() {
        let nav = navigator(&Config::default());
        nav.session().login(UserInfo::with_roles("li", &["guest"]));

        let result = nav.navigate("/home").unwrap();
        assert_eq!(result.decision, NavigationDecision::Allow);
        assert_eq!(result.title, "Routeward-Map");
    }

    #[test]
    fn fallback_routes_catch_unknown_paths() {
        let config = Config {
            fallback_routes: true,
            ..Config::default()
        };
        let nav = navigator(&config);

        let result = nav.navigate("/nowhere").unwrap();
        assert_eq!(result.pattern, "/*");
        assert_eq!(result.decision, NavigationDecision::Allow);

        let result = nav.navigate("/home/nowhere").unwrap();
        assert_eq!(result.pattern, "/home/*");
    }

    #[test]
    fn menu_splices_hidden_layout() {
        let nav = navigator(&Config::default());
        let names: Vec<&str> = nav.nav_menu().iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["home"]);
    }
}
