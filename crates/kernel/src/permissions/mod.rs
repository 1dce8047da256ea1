//! Route authority values and the memoised predicates built from them.
//!
//! - [`authority`]: permission entries, authorities and the merge rule
//! - [`predicate`]: per-route `has` / `has_route` checks with session-aware caching

pub mod authority;
pub mod predicate;

pub use authority::{Authority, PermissionEntry, RoleGrant, merge, merge_optional, parse_entries};
pub use predicate::{PermissionPredicate, RoutePredicate};
