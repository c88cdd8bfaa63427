//! Icon materialization for `<i data-lucide="...">` placeholders.
//!
//! The host page loads lucide globally. Rendered markup only carries the
//! placeholders, so `refresh` has to run again after each re-render.

/// Icons the user menu refers to by name.
pub const CHEVRON_DOWN: &str = "chevron-down";
pub const USER: &str = "user";
pub const LOG_OUT: &str = "log-out";

/// Ask the host page's lucide instance to replace any new placeholders.
/// Silently does nothing when lucide is not loaded.
pub fn refresh() {
    #[cfg(feature = "csr")]
    {
        use wasm_bindgen::{JsCast, JsValue};

        let Some(window) = web_sys::window() else {
            return;
        };
        let Ok(lucide) = js_sys::Reflect::get(&window, &JsValue::from_str("lucide")) else {
            return;
        };
        if lucide.is_undefined() || lucide.is_null() {
            log::debug!("lucide not loaded; skipping icon refresh");
            return;
        }
        let create = js_sys::Reflect::get(&lucide, &JsValue::from_str("createIcons"))
            .ok()
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok());
        if let Some(create) = create {
            if let Err(e) = create.call0(&lucide) {
                log::warn!("lucide createIcons failed: {e:?}");
            }
        }
    }
}
