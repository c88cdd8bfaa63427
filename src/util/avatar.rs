//! Generated placeholder avatars.

#[cfg(test)]
#[path = "avatar_test.rs"]
mod avatar_test;

const AVATAR_SERVICE_URL: &str = "https://ui-avatars.com/api/";

/// Placeholder avatar image keyed by `name`.
pub fn default_avatar_url(name: &str) -> String {
    format!(
        "{AVATAR_SERVICE_URL}?name={}&background=6366f1&color=fff&size=64",
        urlencoding::encode(name)
    )
}
