//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::routes::GuardMode;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Route file to load (default: ./routes.yml).
    pub routes_file: PathBuf,

    /// Relax the navigation guard outside production (default: false).
    pub dev_mode: bool,

    /// Deployment environment name (default: "production").
    pub environment: String,

    /// System name used as the document title prefix.
    pub system_name: String,

    /// Login page path (default: /login).
    pub login_path: String,

    /// Home page path (default: /home).
    pub home_path: String,

    /// Permission-denied page path (default: /403).
    pub forbidden_path: String,

    /// Append `403` / `*` fallback routes to every route level (default: false).
    pub fallback_routes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            routes_file: PathBuf::from("./routes.yml"),
            dev_mode: false,
            environment: "production".to_string(),
            system_name: "Routeward".to_string(),
            login_path: "/login".to_string(),
            home_path: "/home".to_string(),
            forbidden_path: "/403".to_string(),
            fallback_routes: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let routes_file = env::var("ROUTES_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.routes_file);

        let dev_mode = parse_bool("DEV_MODE", defaults.dev_mode)?;
        let fallback_routes = parse_bool("FALLBACK_ROUTES", defaults.fallback_routes)?;

        let environment = env::var("APP_ENV")
            .map(|v| v.to_lowercase())
            .unwrap_or(defaults.environment);

        let system_name = env::var("SYSTEM_NAME").unwrap_or(defaults.system_name);
        let login_path = env::var("LOGIN_PATH").unwrap_or(defaults.login_path);
        let home_path = env::var("HOME_PATH").unwrap_or(defaults.home_path);
        let forbidden_path = env::var("FORBIDDEN_PATH").unwrap_or(defaults.forbidden_path);

        for (key, value) in [
            ("LOGIN_PATH", &login_path),
            ("HOME_PATH", &home_path),
            ("FORBIDDEN_PATH", &forbidden_path),
        ] {
            if !value.starts_with('/') {
                anyhow::bail!("{key} must be an absolute path, got {value:?}");
            }
        }

        Ok(Self {
            routes_file,
            dev_mode,
            environment,
            system_name,
            login_path,
            home_path,
            forbidden_path,
            fallback_routes,
        })
    }

    /// Guard mode implied by `dev_mode` and `environment`.
    pub fn guard_mode(&self) -> GuardMode {
        GuardMode::select(self.dev_mode, &self.environment)
    }
}

fn parse_bool(key: &str, default: bool) -> Result<bool> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .to_lowercase()
            .parse()
            .with_context(|| format!("{key} must be true or false")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_select_production_guard() {
        let config = Config::default();
        assert_eq!(config.guard_mode(), GuardMode::Production);
        assert_eq!(config.login_path, "/login");
    }

    #[test]
    fn dev_mode_outside_production_selects_development() {
        let config = Config {
            dev_mode: true,
            environment: "development".to_string(),
            ..Config::default()
        };
        assert_eq!(config.guard_mode(), GuardMode::Development);
    }
}
