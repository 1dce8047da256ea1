//! Navigation menu projection.
//!
//! Menus are derived from the reduced route tree and filtered only by the
//! visibility flags in route metadata. Permission filtering happens when the
//! menu is rendered, through each item's live `has` / `has_route` checks.

mod nav;

pub use nav::{NavMenuItem, nav_menu_config};
