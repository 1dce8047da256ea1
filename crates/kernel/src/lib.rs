//! Routeward Kernel Library
//!
//! Route-authority reduction and permission predicates for role-gated
//! navigation. The `routeward` binary wraps this library for inspecting
//! route files.

pub mod config;
pub mod directive;
pub mod error;
pub mod menu;
pub mod models;
pub mod navigator;
pub mod permissions;
pub mod routes;
pub mod session;

pub use config::Config;
pub use error::{RouteError, RouteResult};
pub use navigator::{Navigation, Navigator};
pub use session::{SessionSource, SessionStore};
