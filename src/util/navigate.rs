//! Whole-page navigation helpers.
//!
//! Requires a browser environment; native builds get no-op stubs.
//! Navigation failures are logged, never raised.

#[cfg(test)]
#[path = "navigate_test.rs"]
mod navigate_test;

/// Current page URL, or an empty string outside the browser.
pub fn current_href() -> String {
    #[cfg(feature = "csr")]
    {
        web_sys::window()
            .and_then(|w| w.location().href().ok())
            .unwrap_or_default()
    }
    #[cfg(not(feature = "csr"))]
    {
        String::new()
    }
}

/// Send the whole page to `url`.
pub fn assign(url: &str) {
    #[cfg(feature = "csr")]
    {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().set_href(url) {
                log::warn!("navigation to {url} failed: {e:?}");
            }
        }
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = url;
    }
}

/// Reload the current page.
pub fn reload() {
    #[cfg(feature = "csr")]
    {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().reload() {
                log::warn!("page reload failed: {e:?}");
            }
        }
    }
}
