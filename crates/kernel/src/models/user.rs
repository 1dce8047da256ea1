//! User identity injected into the session by a login flow.

use serde::{Deserialize, Serialize};

use super::Role;

/// User information returned by the login endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub realname: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl UserInfo {
    /// Build a user holding the given role names.
    pub fn with_roles(username: &str, roles: &[&str]) -> Self {
        Self {
            username: username.to_string(),
            roles: roles.iter().map(|r| Role::new(r)).collect(),
            ..Self::default()
        }
    }

    /// Check if the user holds a role.
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r.name == name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default() {
        let user: UserInfo =
            serde_json::from_str(r#"{"username": "li", "roles": [{"name": "guest"}]}"#).unwrap();
        assert_eq!(user.username, "li");
        assert!(user.id.is_empty());
        assert!(user.has_role("guest"));
        assert!(!user.has_role("admin"));
    }
}
