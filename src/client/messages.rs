//! Human-readable lock messages
//!
//! Text shown to an editor when a section cannot be opened for editing or
//! an open session loses its lock.

use crate::client::error::ClientError;
use crate::shared::{LockErrorCode, LockStatus};

/// "4 minutes and 50 seconds", "1 minute", "12 seconds"
pub fn format_remaining(seconds: i64) -> String {
    if seconds <= 0 {
        return "a moment".to_string();
    }
    let minutes = seconds / 60;
    let seconds = seconds % 60;
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {}", unit)
        } else {
            format!("{} {}s", n, unit)
        }
    };
    match (minutes, seconds) {
        (0, s) => plural(s, "second"),
        (m, 0) => plural(m, "minute"),
        (m, s) => format!("{} and {}", plural(m, "minute"), plural(s, "second")),
    }
}

/// Message for a section held by another editor
pub fn describe_conflict(status: &LockStatus) -> String {
    let holder = match (status.locked_by_name.as_deref(), status.locked_by.as_deref()) {
        (Some(name), Some(contact)) => format!("{} ({})", name, contact),
        (Some(name), None) => name.to_string(),
        (None, Some(contact)) => contact.to_string(),
        (None, None) => "another editor".to_string(),
    };
    match status.remaining_seconds {
        Some(seconds) => format!(
            "This section is being edited by {}. It will become available in {} unless they keep working.",
            holder,
            format_remaining(seconds)
        ),
        None => format!("This section is being edited by {}.", holder),
    }
}

/// Message for a section the requester already holds from another session
pub fn describe_self_conflict(status: &LockStatus) -> String {
    let mut message = String::from("You already have this section open in another window or session.");
    if let Some(seconds) = status.remaining_seconds {
        message.push_str(&format!(" That lock runs for another {}.", format_remaining(seconds)));
    }
    message.push_str(" Continue here? The other session will no longer be able to save.");
    message
}

/// Message for an edit session whose lock is gone
pub fn describe_lost_lock(error: &ClientError) -> String {
    match error.code() {
        Some(LockErrorCode::NotOwner) => match error.lock_status() {
            Some(status) if status.is_locked => format!(
                "Your editing lock was taken over. {}",
                describe_conflict(status)
            ),
            _ => "Your editing lock is no longer yours. Reopen the section to continue.".to_string(),
        },
        Some(LockErrorCode::Expired) => {
            "Your editing lock expired. Reopen the section to continue.".to_string()
        }
        Some(LockErrorCode::NotLocked) => {
            "Your editing lock was released. Reopen the section to continue.".to_string()
        }
        _ => format!("Your editing lock could not be kept: {}", error),
    }
}
