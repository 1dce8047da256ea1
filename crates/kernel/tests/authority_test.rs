#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Integration tests for authority reduction and the per-route predicates.

use serde_json::json;

mod common;
use common::TestApp;

use routeward_kernel::permissions::{Authority, RoleGrant};
use routeward_test_utils::test_route;

/// An open leaf opens its gated parent; the ungated sibling stays ungated.
#[test]
fn open_leaf_absorbs_parent_gate() {
    let app = TestApp::new(&[test_route("/p")
        .grant("admin", &["edit"])
        .child(test_route("a").ungated())
        .child(test_route("b").open())]);

    assert_eq!(app.node(&[0, 0]).meta.authority, Authority::Ungated);
    assert_eq!(app.node(&[0, 1]).meta.authority, Authority::Granted);
    assert_eq!(app.node(&[0]).meta.authority, Authority::Granted);
}

/// Guest holds `view` but not `edit`, and may enter the route.
#[test]
fn guest_permissions_on_mixed_grants() {
    let app = TestApp::new(&[test_route("/c")
        .grant("admin", &["edit", "view"])
        .grant("guest", &["view"])]);
    app.login(&["guest"]);

    let meta = &app.node(&[0]).meta;
    assert!(meta.has("view"));
    assert!(!meta.has("edit"));
    assert!(meta.has_route());
}

/// A session without roles is denied everything on a gated route.
#[test]
fn empty_roles_are_denied() {
    let app = TestApp::new(&[test_route("/c").grant("admin", &["edit"])]);
    app.login(&[]);

    let meta = &app.node(&[0]).meta;
    assert!(!meta.has("anything"));
    assert!(!meta.has_route());
}

/// A malformed entry never grants anything.
#[test]
fn malformed_entry_is_excluded() {
    let app = TestApp::new(&[test_route("/c")
        .raw_entry(json!(["admin"]))
        .grant("user", &["view"])]);
    app.login(&["admin"]);

    let meta = &app.node(&[0]).meta;
    assert!(!meta.has("view"));
    assert!(!meta.has_route());
}

/// Login, logout and re-login each invalidate the cached answers.
#[test]
fn session_transitions_invalidate_predicates() {
    let app = TestApp::new(&[test_route("/c").grant("admin", &["edit"])]);
    let meta = &app.node(&[0]).meta;

    assert!(!meta.has_route());
    assert!(!meta.has("edit"));

    app.login(&["admin"]);
    assert!(meta.has_route());
    assert!(meta.has("edit"));
    assert!(meta.has("edit"));
    assert_eq!(meta.permission_predicate().cache_size(), 1);

    app.session.clear();
    assert!(!meta.has_route());
    assert!(!meta.has("edit"));
    assert_eq!(meta.permission_predicate().cache_size(), 0);
}

/// Sibling order never changes a parent's effective authority.
#[test]
fn reduction_is_order_independent() {
    let children = [
        test_route("a").grant("admin", &["edit"]),
        test_route("b").ungated(),
        test_route("c").role("guest").grant("ops", &["run"]),
        test_route("d").child(test_route("e").role("auditor")),
    ];

    let mut forward = test_route("/p");
    for child in children.iter().cloned() {
        forward = forward.child(child);
    }
    let mut backward = test_route("/p");
    for child in children.iter().rev().cloned() {
        backward = backward.child(child);
    }

    let forward = TestApp::new(&[forward]);
    let backward = TestApp::new(&[backward]);

    let expected = Authority::Merged(
        ["admin", "auditor", "guest", "ops"]
            .iter()
            .map(|r| r.to_string())
            .collect(),
    );
    assert_eq!(forward.node(&[0]).meta.authority, expected);
    assert_eq!(backward.node(&[0]).meta.authority, expected);
}

/// Custom matchers search the session's grants instead of permission names.
#[test]
fn custom_matcher() {
    let app = TestApp::new(&[test_route("/c").grant("admin", &["edit"]).grant("ops", &[])]);
    app.login(&["ops"]);

    let meta = &app.node(&[0]).meta;
    let no_permissions = |grant: &RoleGrant| grant.permissions.is_empty();
    assert!(meta.has_with("ops-console", no_permissions));
    assert!(!meta.has("edit"));
}

/// An empty authority list is treated as open.
#[test]
fn empty_authority_list_is_open() {
    let app = TestApp::new(&[test_route("/c").with_meta("authority", json!([]))]);
    assert_eq!(app.node(&[0]).meta.authority, Authority::Granted);
    assert!(app.node(&[0]).meta.has_route());
}
