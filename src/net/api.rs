//! HTTP client for the remote auth gateway.
//!
//! Client-side (csr): real credentialed HTTP calls via `gloo-net`.
//! Native builds: stubs returning [`GatewayError::Unavailable`] since the
//! gateway is only reachable with the browser's session cookies.
//!
//! ERROR HANDLING
//! ==============
//! The trait surfaces transport and decode failures as [`GatewayError`]; the
//! store is the layer that turns them into "logged out" / default settings.
//! Bodies are decoded regardless of HTTP status because the envelope's
//! `success` flag is authoritative.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::future::Future;

use super::types::{LogoutEnvelope, PublicSettingsEnvelope, StatusEnvelope};
use crate::config::GatewayConfig;

/// Failure talking to the gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Transport(String),
    #[error("gateway response could not be decoded: {0}")]
    Decode(String),
    #[error("gateway is not reachable outside the browser")]
    Unavailable,
}

/// The three JSON endpoints the store consumes.
///
/// Futures are not required to be `Send`; they run on the single UI thread.
pub trait Gateway {
    fn config(&self) -> &GatewayConfig;

    /// `GET /api/auth/status`
    fn fetch_status(&self) -> impl Future<Output = Result<StatusEnvelope, GatewayError>>;

    /// `GET /api/auth/public-settings`
    fn fetch_public_settings(
        &self,
    ) -> impl Future<Output = Result<PublicSettingsEnvelope, GatewayError>>;

    /// `POST /api/auth/logout`
    fn post_logout(&self) -> impl Future<Output = Result<LogoutEnvelope, GatewayError>>;
}

/// Gateway client backed by the browser's `fetch` with `credentials: include`.
#[derive(Clone, Debug, Default)]
pub struct HttpGateway {
    config: GatewayConfig,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }
}

impl Gateway for HttpGateway {
    fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn fetch_status(&self) -> Result<StatusEnvelope, GatewayError> {
        #[cfg(feature = "csr")]
        {
            get_json(&self.config.status_url()).await
        }
        #[cfg(not(feature = "csr"))]
        {
            Err(GatewayError::Unavailable)
        }
    }

    async fn fetch_public_settings(&self) -> Result<PublicSettingsEnvelope, GatewayError> {
        #[cfg(feature = "csr")]
        {
            get_json(&self.config.public_settings_url()).await
        }
        #[cfg(not(feature = "csr"))]
        {
            Err(GatewayError::Unavailable)
        }
    }

    async fn post_logout(&self) -> Result<LogoutEnvelope, GatewayError> {
        #[cfg(feature = "csr")]
        {
            let resp = gloo_net::http::Request::post(&self.config.logout_url())
                .credentials(web_sys::RequestCredentials::Include)
                .send()
                .await
                .map_err(|e| GatewayError::Transport(e.to_string()))?;
            resp.json::<LogoutEnvelope>()
                .await
                .map_err(|e| GatewayError::Decode(e.to_string()))
        }
        #[cfg(not(feature = "csr"))]
        {
            Err(GatewayError::Unavailable)
        }
    }
}

#[cfg(feature = "csr")]
async fn get_json<T: serde::de::DeserializeOwned>(url: &str) -> Result<T, GatewayError> {
    let resp = gloo_net::http::Request::get(url)
        .credentials(web_sys::RequestCredentials::Include)
        .send()
        .await
        .map_err(|e| GatewayError::Transport(e.to_string()))?;
    resp.json::<T>()
        .await
        .map_err(|e| GatewayError::Decode(e.to_string()))
}
