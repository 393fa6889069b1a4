//! Wire types for the VRChat API.
//!
//! Only the fields the client reads are modeled; VRChat sends many more
//! and serde ignores them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated account, from `GET /auth/user`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub current_avatar_thumbnail_image_url: Option<String>,
}

/// A friend entry, from `GET /auth/user/friends` (the API's "limited user").
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub status: PresenceStatus,
    #[serde(default)]
    pub status_description: String,
    /// Last time the account was seen; the basis for "N minutes ago"
    /// lines on offline friends.
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub current_avatar_thumbnail_image_url: String,
}

/// Presence status values VRChat uses for friend entries.
///
/// The wire format is a plain string; unknown values are kept verbatim in
/// [`PresenceStatus::Other`] so display fallbacks can echo them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PresenceStatus {
    #[default]
    Offline,
    AskMe,
    JoinMe,
    Active,
    Busy,
    Other(String),
}

impl PresenceStatus {
    /// The raw wire value.
    pub fn as_str(&self) -> &str {
        match self {
            PresenceStatus::Offline => "offline",
            PresenceStatus::AskMe => "ask me",
            PresenceStatus::JoinMe => "join me",
            PresenceStatus::Active => "active",
            PresenceStatus::Busy => "busy",
            PresenceStatus::Other(raw) => raw,
        }
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, PresenceStatus::Offline)
    }
}

impl From<String> for PresenceStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "offline" => PresenceStatus::Offline,
            "ask me" => PresenceStatus::AskMe,
            "join me" => PresenceStatus::JoinMe,
            "active" => PresenceStatus::Active,
            "busy" => PresenceStatus::Busy,
            _ => PresenceStatus::Other(raw),
        }
    }
}

impl From<PresenceStatus> for String {
    fn from(status: PresenceStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Pending second-factor methods, reported by the login endpoint in an
/// otherwise-successful response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TwoFactorRequired {
    #[serde(default)]
    pub requires_two_factor_auth: Vec<String>,
}

/// Code submission body for the two-factor verify endpoints.
#[derive(Debug, Serialize)]
pub(crate) struct TwoFactorCode<'a> {
    pub code: &'a str,
}

/// Acknowledgement from the two-factor verify endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct TwoFactorVerified {
    pub verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_status_known_values() {
        assert_eq!(PresenceStatus::from("offline".to_string()), PresenceStatus::Offline);
        assert_eq!(PresenceStatus::from("ask me".to_string()), PresenceStatus::AskMe);
        assert_eq!(PresenceStatus::from("join me".to_string()), PresenceStatus::JoinMe);
        assert_eq!(PresenceStatus::from("active".to_string()), PresenceStatus::Active);
        assert_eq!(PresenceStatus::from("busy".to_string()), PresenceStatus::Busy);
    }

    #[test]
    fn test_presence_status_keeps_unknown_values() {
        let status = PresenceStatus::from("available".to_string());
        assert_eq!(status, PresenceStatus::Other("available".to_string()));
        assert_eq!(status.as_str(), "available");
    }

    #[test]
    fn test_friend_decodes_from_wire_shape() {
        let friend: Friend = serde_json::from_str(
            r#"{
                "id": "usr_5b9e6688-a27e-4566-92f2-8e3f5c27b222",
                "displayName": "aki",
                "status": "join me",
                "statusDescription": "come hang out",
                "lastActivity": "2026-08-06T10:00:00.000Z",
                "location": "wrld_4432ea9b-729c-46e3-8eaf-846aa0a37fdd:12345",
                "isFriend": true
            }"#,
        )
        .unwrap();

        assert_eq!(friend.display_name, "aki");
        assert_eq!(friend.status, PresenceStatus::JoinMe);
        assert!(friend.last_activity.is_some());
    }
}
