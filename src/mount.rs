//! Header injection for the user menu.
//!
//! SYSTEM CONTEXT
//! ==============
//! The page header is owned by the static site, not by this crate. Its shape
//! (a logo area plus a right-aligned control cluster) is assumed, not
//! verified: when the cluster is missing, injection quietly does nothing.

#[cfg(test)]
#[path = "mount_test.rs"]
mod mount_test;

use crate::state::auth::BrowserStore;

/// Row inside the header `<nav>` holding the logo and the controls.
pub const NAV_ROW_SELECTOR: &str = "nav .container > .flex";
/// Right-aligned control cluster (theme toggle, language switcher) in that row.
pub const CONTROL_CLUSTER_SELECTOR: &str = ".flex.items-center.gap-2";

pub const CONTAINER_ID: &str = "user-menu-container";
pub const CONTAINER_CLASS: &str = "relative";
pub const WIDGET_ATTR: &str = "data-auth-widget";
pub const WIDGET_NAME: &str = "user-menu";

/// Selector matching a container this crate already created.
pub fn widget_selector() -> String {
    format!("[{WIDGET_ATTR}=\"{WIDGET_NAME}\"]")
}

/// Insert the user menu as the first child of the header's control cluster.
///
/// Returns `false` without touching the page when the cluster is missing or
/// the menu is already present.
pub fn inject_user_menu(store: BrowserStore) -> bool {
    #[cfg(feature = "csr")]
    {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return false;
        };
        if document.query_selector(&widget_selector()).ok().flatten().is_some() {
            log::debug!("user menu already injected");
            return false;
        }
        let cluster = document
            .query_selector(NAV_ROW_SELECTOR)
            .ok()
            .flatten()
            .and_then(|row| row.query_selector(CONTROL_CLUSTER_SELECTOR).ok().flatten());
        let Some(cluster) = cluster else {
            log::debug!("header control cluster not found; user menu not injected");
            return false;
        };
        let Some(container) = create_user_menu(store) else {
            return false;
        };
        if let Err(e) = cluster.insert_before(&container, cluster.first_child().as_ref()) {
            log::warn!("user menu insertion failed: {e:?}");
            return false;
        }
        true
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = store;
        false
    }
}

/// Build a detached container element with the user menu mounted in it.
#[cfg(feature = "csr")]
pub fn create_user_menu(store: BrowserStore) -> Option<web_sys::HtmlElement> {
    use leptos::prelude::*;
    use wasm_bindgen::JsCast;

    use crate::components::user_menu::UserMenu;

    let document = web_sys::window().and_then(|w| w.document())?;
    let container = document
        .create_element("div")
        .ok()?
        .dyn_into::<web_sys::HtmlElement>()
        .ok()?;
    container.set_id(CONTAINER_ID);
    container.set_class_name(CONTAINER_CLASS);
    container.set_attribute(WIDGET_ATTR, WIDGET_NAME).ok()?;

    leptos::mount::mount_to(container.clone(), move || view! { <UserMenu store=store/> }).forget();
    Some(container)
}
