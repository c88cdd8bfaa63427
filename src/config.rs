//! Gateway location and URL builders.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every request and navigation target points at the hosted auth gateway.
//! `GatewayConfig` owns the base URL so the store, the HTTP client and the
//! view all build URLs the same way.
//!
//! RESOLUTION ORDER
//! ================
//! 1. `<meta name="auth-gateway" content="...">` in the host page.
//! 2. `AUTH_GATEWAY_URL` set at compile time.
//! 3. [`DEFAULT_GATEWAY_URL`].

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

/// Gateway used when neither the host page nor the build names one.
pub const DEFAULT_GATEWAY_URL: &str = "https://auth.aimod.cc";

/// Name of the `<meta>` tag a host page can use to point at another gateway.
pub const GATEWAY_META_NAME: &str = "auth-gateway";

/// Base URL of the remote auth gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayConfig {
    base_url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new(option_env!("AUTH_GATEWAY_URL").unwrap_or(DEFAULT_GATEWAY_URL))
    }
}

impl GatewayConfig {
    /// Build a config for `base_url`, dropping any trailing slashes.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Resolve the gateway from the host page's `<meta>` tag, falling back to
    /// [`GatewayConfig::default`].
    pub fn from_document() -> Self {
        #[cfg(feature = "csr")]
        {
            use wasm_bindgen::JsCast;

            let selector = format!("meta[name=\"{GATEWAY_META_NAME}\"]");
            let content = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|doc| doc.query_selector(&selector).ok().flatten())
                .and_then(|el| el.dyn_into::<web_sys::HtmlMetaElement>().ok())
                .map(|meta| meta.content())
                .filter(|content| !content.trim().is_empty());
            if let Some(content) = content {
                log::debug!("auth gateway from meta tag: {content}");
                return Self::new(content.trim());
            }
        }
        Self::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn status_url(&self) -> String {
        self.endpoint("/api/auth/status")
    }

    pub fn public_settings_url(&self) -> String {
        self.endpoint("/api/auth/public-settings")
    }

    pub fn logout_url(&self) -> String {
        self.endpoint("/api/auth/logout")
    }

    pub fn profile_url(&self) -> String {
        self.endpoint("/profile")
    }

    /// Hosted login page that sends the browser back to `return_to` afterwards.
    pub fn login_url(&self, return_to: &str) -> String {
        self.redirecting("/auth/login", return_to)
    }

    /// Hosted registration page that sends the browser back to `return_to`.
    pub fn register_url(&self, return_to: &str) -> String {
        self.redirecting("/auth/register", return_to)
    }

    /// Google OAuth entry point that sends the browser back to `return_to`.
    pub fn google_login_url(&self, return_to: &str) -> String {
        self.redirecting("/api/auth/oauth/google", return_to)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn redirecting(&self, path: &str, return_to: &str) -> String {
        format!(
            "{}{path}?redirect={}",
            self.base_url,
            urlencoding::encode(return_to)
        )
    }
}
