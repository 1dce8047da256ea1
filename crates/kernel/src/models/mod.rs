//! Session identity and route configuration models.

pub mod role;
pub mod route;
pub mod user;

pub use role::Role;
pub use route::{RawAuthority, RawRouteMeta, RouteConfig, RouteFile};
pub use user::UserInfo;
