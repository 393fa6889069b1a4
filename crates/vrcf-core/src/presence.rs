//! Friend presentation rules.
//!
//! Pure functions over [`Friend`] values; the session controller owns the
//! state, these only label it.

use chrono::{DateTime, Utc};

use crate::api::{Friend, PresenceStatus};

/// Display label for a presence status.
///
/// Anything that is not one of the three special cases reads as online:
/// VRChat keeps adding availability flavors and they all mean reachable.
pub fn status_label(status: &PresenceStatus) -> &'static str {
    match status {
        PresenceStatus::Offline => "Offline",
        PresenceStatus::AskMe => "Ask Me",
        PresenceStatus::JoinMe => "Join Me",
        _ => "Online",
    }
}

/// Secondary line for a friend entry.
///
/// Offline friends show how long ago they were last seen; online friends
/// show their status message when they set one, their raw status value
/// otherwise.
pub fn status_description(friend: &Friend, now: DateTime<Utc>) -> String {
    if friend.status.is_offline() {
        if let Some(last_activity) = friend.last_activity {
            return format_relative(last_activity, now);
        }
        return friend.status.as_str().to_string();
    }

    if !friend.status_description.is_empty() {
        return friend.status_description.clone();
    }

    friend.status.as_str().to_string()
}

/// Formats the gap between two instants at one-minute granularity.
///
/// Anything under a minute (including clock skew into the future) reads
/// as "just now".
pub fn format_relative(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return pluralize(minutes, "minute");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return pluralize(hours, "hour");
    }

    let days = hours / 24;
    if days < 7 {
        return pluralize(days, "day");
    }

    pluralize(days / 7, "week")
}

fn pluralize(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

/// Splits friends into (online, offline) groups, preserving order.
pub fn partition(friends: &[Friend]) -> (Vec<&Friend>, Vec<&Friend>) {
    friends.iter().partition(|friend| !friend.status.is_offline())
}
