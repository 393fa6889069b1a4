//! Structured errors for the VRChat API boundary.

use std::fmt;

use serde_json::Value;

/// Categories of API errors for consistent error handling.
///
/// The two `*Required` kinds are not failures: they are the login
/// endpoint's way of asking for a second factor, and callers route them
/// as state transitions rather than error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Login pending the code sent to the account's email
    EmailOtpRequired,
    /// Login pending a code from the authenticator app
    TotpRequired,
    /// HTTP status error (4xx, 5xx)
    HttpStatus,
    /// API-level rejection in a 200 response (e.g. a refused code)
    Api,
    /// Connection-level failure (DNS, TLS, socket)
    Transport,
    /// Failed to parse a response body
    Parse,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::EmailOtpRequired => write!(f, "email_otp_required"),
            ApiErrorKind::TotpRequired => write!(f, "totp_required"),
            ApiErrorKind::HttpStatus => write!(f, "http_status"),
            ApiErrorKind::Api => write!(f, "api_error"),
            ApiErrorKind::Transport => write!(f, "transport"),
            ApiErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// Structured error from the API with kind and details.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Error category
    pub kind: ApiErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw response body)
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an error from an HTTP error response.
    ///
    /// Mines the VRChat `{"error":{"message":...}}` envelope for a cleaner
    /// display message, keeping the raw body in `details`. Bodies carrying
    /// one of the known two-factor sentinels are classified as
    /// verification-required even when the structured field is absent.
    pub fn from_error_body(status: u16, body: &str) -> Self {
        if let Some(kind) = classify_two_factor(body) {
            return Self {
                kind,
                message: format!("HTTP {status}"),
                details: Some(body.to_string()),
            };
        }

        let message = format!("HTTP {status}");
        let details = if body.is_empty() {
            None
        } else {
            if let Ok(json) = serde_json::from_str::<Value>(body)
                && let Some(error_obj) = json.get("error")
                && let Some(msg) = error_obj.get("message").and_then(|v| v.as_str())
            {
                return Self {
                    kind: ApiErrorKind::HttpStatus,
                    message: format!("HTTP {status}: {msg}"),
                    details: Some(body.to_string()),
                };
            }
            Some(body.to_string())
        };
        Self {
            kind: ApiErrorKind::HttpStatus,
            message,
            details,
        }
    }

    /// Creates an error for a pending second factor.
    ///
    /// The login endpoint names the accepted methods; the email variant
    /// takes precedence when listed, matching how accounts without an
    /// authenticator app are verified.
    pub fn two_factor(methods: &[String]) -> Self {
        if methods.iter().any(|m| m == "emailOtp") {
            Self::new(
                ApiErrorKind::EmailOtpRequired,
                "email one-time password required",
            )
        } else {
            Self::new(ApiErrorKind::TotpRequired, "two-factor code required")
        }
    }

    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transport, message)
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Parse, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Fallback classifier for opaque error text.
///
/// The login endpoint normally reports a pending second factor through a
/// structured `requiresTwoFactorAuth` field; this sniffs the two known
/// sentinel substrings out of bodies where that field is missing.
pub(crate) fn classify_two_factor(text: &str) -> Option<ApiErrorKind> {
    if text.contains("emailOtp") {
        Some(ApiErrorKind::EmailOtpRequired)
    } else if text.contains("requiresTwoFactorAuth") {
        Some(ApiErrorKind::TotpRequired)
    } else {
        None
    }
}
