//! Toast notifications.

use std::fmt;

use secretly_application::ApplicationError;

/// Shown when a reload fails.
pub const LOAD_FAILED: &str = "Error loading environments";
/// Shown when a create or update fails.
pub const SAVE_FAILED: &str = "Error saving environment";
/// Shown when deleting an environment fails.
pub const DELETE_ENVIRONMENT_FAILED: &str = "Error deleting environment";
/// Shown when deleting a variable fails.
pub const DELETE_VARIABLE_FAILED: &str = "Error deleting variable";

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// An operation completed.
    Success,
    /// An operation failed.
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Text shown to the user.
    pub message: String,
}

impl Notification {
    /// Creates a success notification.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    /// Creates an error notification.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    /// Maps a failed operation to its generic user-facing text.
    ///
    /// Backend failures collapse to one text per kind; `delete_text`
    /// tells environment deletes from variable deletes. Local errors keep
    /// their own message.
    #[must_use]
    pub fn for_failure(error: &ApplicationError, delete_text: &str) -> Self {
        match error {
            ApplicationError::Fetch(_) => Self::error(LOAD_FAILED),
            ApplicationError::Save(_) => Self::error(SAVE_FAILED),
            ApplicationError::Delete(_) => Self::error(delete_text),
            ApplicationError::NotFound(_) => Self::error(error.to_string()),
        }
    }

    /// Returns true for error notifications.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.level, NotificationLevel::Error)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
