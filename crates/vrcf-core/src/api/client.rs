use anyhow::{Context, Result};
use bytes::Bytes;
use tracing::debug;

use super::decode::{MASKED_USER_FIELDS, decode_masked};
use super::error::{ApiError, ApiErrorKind, ApiResult};
use super::types::{CurrentUser, Friend, TwoFactorCode, TwoFactorRequired, TwoFactorVerified};
use super::{DEFAULT_BASE_URL, USER_AGENT};

/// VRChat API client.
///
/// Holds the one `reqwest::Client` whose cookie jar carries the session:
/// the login call stores the auth cookie, and every later call (including
/// [`VrchatClient::fetch_asset`]) sends it back.
pub struct VrchatClient {
    http: reqwest::Client,
    base_url: String,
}

impl VrchatClient {
    /// Creates a new client for the given base URL.
    ///
    /// # Panics
    /// - In test builds (`#[cfg(test)]`), panics if `base_url` is the production API.
    /// - At runtime, panics if `VRCF_BLOCK_REAL_API=1` and `base_url` is the production API.
    ///
    /// This prevents tests from accidentally making real network requests.
    /// Use `VRCHAT_BASE_URL` or config to point to a mock server.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        // Compile-time guard for unit tests
        #[cfg(test)]
        if base_url == DEFAULT_BASE_URL {
            panic!(
                "Tests must not use the production VRChat API!\n\
                 Set VRCHAT_BASE_URL to a mock server (e.g., wiremock).\n\
                 Found base_url: {base_url}"
            );
        }

        // Runtime guard for integration tests (set VRCF_BLOCK_REAL_API=1 in test harness)
        #[cfg(not(test))]
        if std::env::var("VRCF_BLOCK_REAL_API").is_ok_and(|v| v == "1")
            && base_url == DEFAULT_BASE_URL
        {
            panic!(
                "VRCF_BLOCK_REAL_API=1 but trying to use the production VRChat API!\n\
                 Set VRCHAT_BASE_URL to a mock server.\n\
                 Found base_url: {base_url}"
            );
        }

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .build()
            .context("build HTTP client")?;

        Ok(Self { http, base_url })
    }

    /// Logs in with credentials (HTTP basic auth on `GET /auth/user`).
    ///
    /// The credentials travel on this one request only; afterwards the
    /// session lives in the auth cookie. A pending second factor surfaces
    /// as [`ApiErrorKind::EmailOtpRequired`] / [`ApiErrorKind::TotpRequired`].
    ///
    /// # Errors
    /// Returns an error if the login is refused or the transport fails.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<CurrentUser> {
        debug!("logging in with basic auth");
        self.fetch_user(Some((username, password))).await
    }

    /// Fetches the authenticated account over the session cookie.
    ///
    /// # Errors
    /// Returns an error if the session is not (yet) authenticated.
    pub async fn current_user(&self) -> ApiResult<CurrentUser> {
        debug!("fetching current user");
        self.fetch_user(None).await
    }

    async fn fetch_user(&self, basic_auth: Option<(&str, &str)>) -> ApiResult<CurrentUser> {
        let url = format!("{}/auth/user", self.base_url);
        let mut request = self.http.get(&url);
        if let Some((username, password)) = basic_auth {
            request = request.basic_auth(username, Some(password));
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::from_error_body(status.as_u16(), &body));
        }

        // A 200 can still mean "second factor pending" rather than a user.
        if let Ok(pending) = serde_json::from_str::<TwoFactorRequired>(&body)
            && !pending.requires_two_factor_auth.is_empty()
        {
            debug!(
                methods = ?pending.requires_two_factor_auth,
                "login pending second factor"
            );
            return Err(ApiError::two_factor(&pending.requires_two_factor_auth));
        }

        decode_masked(&body, MASKED_USER_FIELDS)
    }

    /// Verifies the code sent to the account's email.
    ///
    /// # Errors
    /// Returns an error if the code is refused or the transport fails.
    pub async fn verify_email_otp(&self, code: &str) -> ApiResult<()> {
        self.verify_two_factor("emailotp", code).await
    }

    /// Verifies a code from the authenticator app.
    ///
    /// # Errors
    /// Returns an error if the code is refused or the transport fails.
    pub async fn verify_totp(&self, code: &str) -> ApiResult<()> {
        self.verify_two_factor("totp", code).await
    }

    async fn verify_two_factor(&self, method: &str, code: &str) -> ApiResult<()> {
        debug!(method, "verifying second factor");
        let url = format!("{}/auth/twofactorauth/{method}/verify", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&TwoFactorCode { code })
            .send()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::from_error_body(status.as_u16(), &body));
        }

        let ack: TwoFactorVerified = serde_json::from_str(&body)
            .map_err(|e| ApiError::parse(format!("unexpected verify response: {e}")))?;
        if !ack.verified {
            return Err(ApiError::new(ApiErrorKind::Api, "two-factor code rejected"));
        }
        Ok(())
    }

    /// Lists friends, `n` at a time from `offset`.
    ///
    /// # Errors
    /// Returns an error if the request fails or the body does not parse.
    pub async fn list_friends(
        &self,
        offset: u32,
        n: u32,
        include_offline: bool,
    ) -> ApiResult<Vec<Friend>> {
        debug!(offset, n, include_offline, "listing friends");
        let url = format!("{}/auth/user/friends", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("offset", offset.to_string()),
                ("n", n.to_string()),
                ("offline", include_offline.to_string()),
            ])
            .send()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::from_error_body(status.as_u16(), &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| ApiError::parse(format!("unexpected friends response: {e}")))
    }

    /// Fetches an authenticated asset (e.g. an avatar image).
    ///
    /// Goes through the same HTTP client as the API calls, so the session
    /// cookie and User-Agent travel with the request.
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn fetch_asset(&self, url: &str) -> ApiResult<Bytes> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_error_body(status.as_u16(), &body));
        }

        response
            .bytes()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))
    }
}
