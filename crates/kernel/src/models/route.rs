//! Raw route configuration as read from route files.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{RouteError, RouteResult};

/// Authority exactly as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAuthority {
    Flag(bool),
    List(Vec<Value>),
    /// Any other shape. Treated as a gate nobody passes.
    Other(Value),
}

/// Route metadata as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRouteMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<RawAuthority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_in_menu: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_children_in_menu: Option<bool>,
    /// Page title used for the document title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Display label used by menus.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A route node as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Component identifier; opaque to the kernel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default)]
    pub meta: RawRouteMeta,
    /// `None` for a leaf; `Some(vec![])` is kept distinct.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<RouteConfig>>,
}

/// A route file: `routes` holds the top-level route list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteFile {
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

impl RouteFile {
    /// Load a route file. `.toml` files are read as TOML, anything else as
    /// YAML (which includes JSON).
    pub fn load(path: &Path) -> RouteResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| RouteError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let file = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&text)?,
            _ => Self::from_yaml(&text)?,
        };

        debug!(path = %path.display(), routes = file.routes.len(), "loaded route file");
        Ok(file)
    }

    /// Parse YAML (or JSON) text.
    pub fn from_yaml(text: &str) -> RouteResult<Self> {
        Ok(serde_yml::from_str(text)?)
    }

    /// Parse TOML text.
    pub fn from_toml(text: &str) -> RouteResult<Self> {
        Ok(toml::from_str(text)?)
    }
}
