//! Gateway response schemas and the domain values narrowed out of them.
//!
//! DESIGN
//! ======
//! Each endpoint gets an explicit envelope type. Envelopes are lenient on the
//! way in (every field optional or defaulted) and strict on the way out: the
//! `into_*` methods only yield a value for a well-formed success response and
//! fall back to "logged out" / "not allowed" otherwise.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::Deserialize;
use serde_json::Value;

/// Account as reported by the gateway. Never mutated locally.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl User {
    /// Human name when the account has one, otherwise the username.
    pub fn display_name(&self) -> &str {
        non_empty(self.name.as_deref()).unwrap_or(&self.username)
    }

    /// Secondary line under the name: email when known, otherwise the username.
    pub fn contact_line(&self) -> &str {
        non_empty(self.email.as_deref()).unwrap_or(&self.username)
    }

    /// Avatar URL supplied by the gateway, if any.
    pub fn avatar_url(&self) -> Option<&str> {
        non_empty(self.avatar.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Which auth affordances the gateway currently permits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicSettings {
    pub allow_register: bool,
    pub allow_google_login: bool,
    /// Fetched and typed, but no affordance renders it.
    pub allow_github_login: bool,
}

impl PublicSettings {
    /// Settings assumed when the gateway cannot be asked: registration open,
    /// OAuth off.
    pub const FALLBACK: Self = Self {
        allow_register: true,
        allow_google_login: false,
        allow_github_login: false,
    };
}

// =============================================================================
// GET /api/auth/status
// =============================================================================

/// `{success, data: {loggedIn, user}}`
#[derive(Debug, Default, Deserialize)]
pub struct StatusEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<StatusData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusData {
    #[serde(default, rename = "loggedIn")]
    pub logged_in: bool,
    #[serde(default)]
    pub user: Option<User>,
}

impl StatusEnvelope {
    /// The logged-in user, or `None` for any other outcome.
    pub fn into_user(self) -> Option<User> {
        if !self.success {
            return None;
        }
        let data = self.data?;
        if data.logged_in { data.user } else { None }
    }
}

// =============================================================================
// GET /api/auth/public-settings
// =============================================================================

/// `{success, data: {allow_register, allow_google_login, allow_github_login}}`
///
/// Flags arrive as strings (`"1"` / `"0"`), so they are kept as raw JSON
/// until narrowed.
#[derive(Debug, Default, Deserialize)]
pub struct PublicSettingsEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<PublicSettingsData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PublicSettingsData {
    #[serde(default)]
    pub allow_register: Value,
    #[serde(default)]
    pub allow_google_login: Value,
    #[serde(default)]
    pub allow_github_login: Value,
}

impl PublicSettingsEnvelope {
    /// Settings from a successful response, `None` otherwise.
    pub fn into_settings(self) -> Option<PublicSettings> {
        if !self.success {
            return None;
        }
        let data = self.data?;
        Some(PublicSettings {
            allow_register: flag_enabled(&data.allow_register),
            allow_google_login: flag_enabled(&data.allow_google_login),
            allow_github_login: flag_enabled(&data.allow_github_login),
        })
    }
}

/// `"1"`, `1` and `true` enable a flag; anything else leaves it off.
pub fn flag_enabled(value: &Value) -> bool {
    match value {
        Value::String(s) => s == "1",
        Value::Number(n) => n.as_i64() == Some(1),
        Value::Bool(b) => *b,
        _ => false,
    }
}

// =============================================================================
// POST /api/auth/logout
// =============================================================================

/// `{success}`
#[derive(Debug, Default, Deserialize)]
pub struct LogoutEnvelope {
    #[serde(default)]
    pub success: bool,
}
