//! Projection of the reduced route tree into navigation menu items.

use serde::Serialize;

use crate::routes::{NodeMeta, RouteNode};

/// One navigation menu entry.
///
/// Borrows the route's metadata so the item's predicates stay live.
#[derive(Debug, Serialize)]
pub struct NavMenuItem<'a> {
    pub name: &'a str,
    pub meta: &'a NodeMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NavMenuItem<'a>>>,
}

impl NavMenuItem<'_> {
    /// Child items, empty when the key is absent.
    pub fn children(&self) -> &[NavMenuItem<'_>] {
        self.children.as_deref().unwrap_or_default()
    }
}

/// Build the navigation menu from reduced routes.
///
/// | `hideInMenu` | `hideChildrenInMenu` | result                          |
/// |--------------|----------------------|---------------------------------|
/// | true         | false                | children spliced into this level |
/// | false        | true                 | self only                       |
/// | false        | false                | self with nested children       |
/// | true         | true                 | nothing                         |
pub fn nav_menu_config(routes: &[RouteNode]) -> Vec<NavMenuItem<'_>> {
    let mut items = Vec::new();

    for route in routes {
        let meta = &route.meta;
        let children = route.children();

        match (meta.hide_in_menu, meta.hide_children_in_menu) {
            (true, false) => items.extend(nav_menu_config(children)),
            (false, true) => items.push(NavMenuItem {
                name: route.name_or_empty(),
                meta,
                children: None,
            }),
            (false, false) => items.push(NavMenuItem {
                name: route.name_or_empty(),
                meta,
                children: (!children.is_empty()).then(|| nav_menu_config(children)),
            }),
            (true, true) => {}
        }
    }

    items
}
