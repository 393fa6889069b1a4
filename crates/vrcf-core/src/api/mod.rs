//! VRChat web API client.
//!
//! One [`VrchatClient`] per session: it owns the HTTP client whose cookie
//! jar carries the auth cookie, so every call made through it (including
//! avatar asset fetches) rides the same session.

use anyhow::{Context, Result};

mod client;
mod decode;
mod error;
mod types;

pub use client::VrchatClient;
pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use types::{CurrentUser, Friend, PresenceStatus};

/// Default base URL for the VRChat API.
pub const DEFAULT_BASE_URL: &str = "https://api.vrchat.cloud/api/1";

/// Environment variable that overrides the API base URL.
pub const BASE_URL_ENV: &str = "VRCHAT_BASE_URL";

/// Standard User-Agent header for vrcf API requests.
///
/// VRChat rejects clients that do not identify themselves.
pub const USER_AGENT: &str = concat!("vrcf/", env!("CARGO_PKG_VERSION"));

/// Resolves the API base URL with precedence: env > config > default.
///
/// # Errors
/// Returns an error if an override is not a well-formed URL.
pub fn resolve_base_url(config_base_url: Option<&str>) -> Result<String> {
    let env_base_url = std::env::var(BASE_URL_ENV).ok();
    resolve_base_url_from(config_base_url, env_base_url.as_deref())
}

fn resolve_base_url_from(
    config_base_url: Option<&str>,
    env_base_url: Option<&str>,
) -> Result<String> {
    // Try env var first
    if let Some(env_url) = env_base_url {
        let trimmed = env_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed)?;
            return Ok(trimmed.to_string());
        }
    }

    // Try config value
    if let Some(config_url) = config_base_url {
        let trimmed = config_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed)?;
            return Ok(trimmed.to_string());
        }
    }

    // Default
    Ok(DEFAULT_BASE_URL.to_string())
}

/// Validates that a URL is well-formed.
fn validate_url(url: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid VRChat base URL: {url}"))?;
    Ok(())
}
