//! Routeward test utilities.
//!
//! Builders for route configuration fixtures and session payloads, plus
//! assertion helpers for JSON output. Fixtures are plain JSON so they can
//! be fed through the same deserialisation path as real route files.

use serde_json::{Map, Value as JsonValue, json};

/// Create a route fixture with the given path.
pub fn test_route(path: &str) -> TestRoute {
    TestRoute {
        path: path.to_string(),
        name: None,
        redirect: None,
        alias: None,
        meta: Map::new(),
        children: None,
    }
}

/// A route fixture builder.
#[derive(Debug, Clone)]
pub struct TestRoute {
    pub path: String,
    pub name: Option<String>,
    pub redirect: Option<String>,
    pub alias: Option<String>,
    pub meta: Map<String, JsonValue>,
    pub children: Option<Vec<TestRoute>>,
}

impl TestRoute {
    /// Set the route name.
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Set a redirect target.
    pub fn redirect(mut self, to: &str) -> Self {
        self.redirect = Some(to.to_string());
        self
    }

    /// Set an alias path.
    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    /// Declare `authority: true`.
    pub fn open(self) -> Self {
        self.with_meta("authority", json!(true))
    }

    /// Declare `authority: false`.
    pub fn ungated(self) -> Self {
        self.with_meta("authority", json!(false))
    }

    /// Declare a `[role, [permission...]]` authority entry.
    pub fn grant(self, role: &str, permissions: &[&str]) -> Self {
        self.push_authority(json!([role, permissions]))
    }

    /// Declare a bare role-name authority entry.
    pub fn role(self, role: &str) -> Self {
        self.push_authority(json!(role))
    }

    /// Declare an arbitrary raw authority entry (e.g. a malformed one).
    pub fn raw_entry(self, entry: JsonValue) -> Self {
        self.push_authority(entry)
    }

    /// Set `hideInMenu`.
    pub fn hidden(self) -> Self {
        self.with_meta("hideInMenu", json!(true))
    }

    /// Set `hideChildrenInMenu`.
    pub fn hide_children(self) -> Self {
        self.with_meta("hideChildrenInMenu", json!(true))
    }

    /// Set the page title.
    pub fn titled(self, title: &str) -> Self {
        self.with_meta("title", json!(title))
    }

    /// Set a metadata key.
    pub fn with_meta(mut self, key: &str, value: JsonValue) -> Self {
        self.meta.insert(key.to_string(), value);
        self
    }

    /// Append a child route.
    pub fn child(mut self, child: TestRoute) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child);
        self
    }

    /// Mark as having an empty (but present) children list.
    pub fn empty_children(mut self) -> Self {
        self.children = Some(Vec::new());
        self
    }

    /// Render as route configuration JSON.
    pub fn to_json(&self) -> JsonValue {
        let mut obj = Map::new();
        obj.insert("path".to_string(), json!(self.path));
        if let Some(name) = &self.name {
            obj.insert("name".to_string(), json!(name));
        }
        if let Some(redirect) = &self.redirect {
            obj.insert("redirect".to_string(), json!(redirect));
        }
        if let Some(alias) = &self.alias {
            obj.insert("alias".to_string(), json!(alias));
        }
        obj.insert("meta".to_string(), JsonValue::Object(self.meta.clone()));
        if let Some(children) = &self.children {
            obj.insert(
                "children".to_string(),
                JsonValue::Array(children.iter().map(TestRoute::to_json).collect()),
            );
        }
        JsonValue::Object(obj)
    }

    /// Append to the authority list, replacing a boolean authority.
    fn push_authority(mut self, entry: JsonValue) -> Self {
        let mut list = match self.meta.remove("authority") {
            Some(JsonValue::Array(list)) => list,
            _ => Vec::new(),
        };
        list.push(entry);
        self.meta.insert("authority".to_string(), JsonValue::Array(list));
        self
    }
}

/// Wrap route fixtures into a route-file JSON document.
pub fn route_file(routes: &[TestRoute]) -> JsonValue {
    json!({ "routes": routes.iter().map(TestRoute::to_json).collect::<Vec<_>>() })
}

/// Login payload for a user holding `roles`.
pub fn test_user(roles: &[&str]) -> JsonValue {
    json!({
        "id": "1",
        "username": "tester",
        "realname": "Test User",
        "roles": roles.iter().map(|r| json!({ "name": r })).collect::<Vec<_>>(),
    })
}

/// Assertion helpers for JSON output.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a JSON value lacks a specific key.
    pub fn lacks_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_none(),
            "Expected JSON not to have key '{key}', got: {value}"
        );
    }

    /// Assert that a JSON value equals expected.
    pub fn json_eq(actual: &Value, expected: &Value) {
        assert_eq!(
            actual,
            expected,
            "JSON mismatch:\nactual: {}\nexpected: {}",
            serde_json::to_string_pretty(actual).unwrap_or_default(),
            serde_json::to_string_pretty(expected).unwrap_or_default()
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn builder_renders_route_json() {
        let route = test_route("/admin")
            .named("admin")
            .grant("admin", &["edit"])
            .role("auditor")
            .hidden()
            .child(test_route("users").open());

        assert::json_eq(
            &route.to_json(),
            &json!({
                "path": "/admin",
                "name": "admin",
                "meta": { "authority": [["admin", ["edit"]], "auditor"], "hideInMenu": true },
                "children": [{ "path": "users", "meta": { "authority": true } }]
            }),
        );
    }

    #[test]
    fn grant_replaces_boolean_authority() {
        let route = test_route("/x").open().grant("a", &[]);
        assert_eq!(route.meta["authority"], json!([["a", []]]));
    }

    #[test]
    fn user_payload_has_role_objects() {
        let user = test_user(&["guest"]);
        assert::has_key(&user, "roles");
        assert::lacks_key(&user, "password");
        assert_eq!(user["roles"], json!([{ "name": "guest" }]));
    }
}
