//! Role model.

use serde::{Deserialize, Serialize};

/// A role held by the current session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
}

impl Role {
    /// Create a role from its name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_from_name_object() {
        let role: Role = serde_json::from_str(r#"{"name": "admin"}"#).unwrap();
        assert_eq!(role, Role::new("admin"));
    }
}
