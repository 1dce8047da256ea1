//! Route loading and navigation error types.
//!
//! Permission and reachability checks never produce errors; anything
//! ambiguous there degrades to a deny. These errors cover the outer
//! surfaces: reading route files and resolving navigations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or resolving routes.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("failed to read route file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML route file: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("invalid TOML route file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("no route matches {0}")]
    NotFound(String),

    #[error("redirect loop while resolving {path} (after {hops} hops)")]
    RedirectLoop { path: String, hops: usize },
}

/// Result type alias using RouteError.
pub type RouteResult<T> = Result<T, RouteError>;
