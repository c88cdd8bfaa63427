//! # header-auth
//!
//! Leptos + WASM login/logout widget for the site header, backed by the
//! hosted auth gateway.
//!
//! The crate holds the gateway client and response schemas (`net`), the
//! page-session auth store (`state`), the user menu component
//! (`components`) and the header injection that mounts it (`mount`).
//! Browser-only code sits behind the `csr` feature; without it everything
//! compiles to inert stubs so the logic can be tested natively.

pub mod components;
pub mod config;
pub mod mount;
pub mod net;
pub mod state;
pub mod util;

pub use config::GatewayConfig;
pub use net::api::{Gateway, GatewayError, HttpGateway};
pub use net::types::{PublicSettings, User};
pub use state::auth::{AuthState, AuthStore, BrowserStore, Subscription};

/// WASM entry point: install logging, mount the menu, then resolve the
/// viewer's session.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);

    let store = BrowserStore::new(HttpGateway::new(GatewayConfig::from_document()));
    if !mount::inject_user_menu(store.clone()) {
        log::debug!("no header slot for the user menu on this page");
    }
    leptos::task::spawn_local(async move {
        store.init_auth().await;
    });
}
