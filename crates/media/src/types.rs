//! Shared value types for the article image domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! several fields and travel between components: image records persisted in the
//! local index, results of remote writes, and notification requests handed to
//! the [`crate::NotificationPort`].

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::identifiers::{CommitSha, ContentSha};

// ---------------------------------------------------------------------------
// Image records
// ---------------------------------------------------------------------------

/// One image attached to an article, as mirrored in the local index.
///
/// Identity within an article's list is `filename`; uniqueness is not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// File name inside the article's image directory.
    pub filename: String,
    /// Remote revision identifier; required to delete the image.
    pub sha: String,
    /// Public URL of the stored content.
    pub url: String,
}

impl ImageRecord {
    /// Creates a record from its three fields.
    pub fn new(filename: impl Into<String>, sha: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            sha: sha.into(),
            url: url.into(),
        }
    }
}

/// Result of a successful upload to the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Revision identifier of the new blob.
    pub sha: ContentSha,
    /// Public download URL of the new blob.
    pub url: String,
    /// Commit that introduced the blob.
    pub commit: CommitSha,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Class name of the affirmative button on a confirmation request.
pub const CONFIRM_BUTTON_CLASS: &str = "btn-confirm";

/// Class name of the negative button on a confirmation request.
pub const CANCEL_BUTTON_CLASS: &str = "btn-cancel";

/// Kind of a [`NotificationRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// An operation completed.
    Success,
    /// An operation failed.
    Error,
    /// A yes/no question; resolved when one of the request's buttons is invoked.
    Confirm,
}

/// Zero-argument callback attached to a notification button.
pub type ButtonAction = Arc<dyn Fn() + Send + Sync>;

/// A button shown alongside a notification.
#[derive(Clone)]
pub struct NotificationButton {
    /// Presentation tag (see [`CONFIRM_BUTTON_CLASS`], [`CANCEL_BUTTON_CLASS`]).
    pub class_name: String,
    /// Text shown on the button.
    pub label: String,
    /// Invoked by the presentation layer when the button is pressed.
    pub action: ButtonAction,
}

impl NotificationButton {
    /// Creates a button.
    pub fn new(
        class_name: impl Into<String>,
        label: impl Into<String>,
        action: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            label: label.into(),
            action: Arc::new(action),
        }
    }

    /// Runs the button's action.
    pub fn press(&self) {
        (self.action)();
    }
}

impl std::fmt::Debug for NotificationButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationButton")
            .field("class_name", &self.class_name)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// A message handed to the [`crate::NotificationPort`].
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    /// Text shown to the user.
    pub message: String,
    /// Kind of message.
    pub kind: NotificationKind,
    /// How long the message stays visible; `None` leaves it to the presentation layer.
    pub duration: Option<Duration>,
    /// Buttons offered with the message. Empty unless `kind` is `Confirm`.
    pub buttons: Vec<NotificationButton>,
}

impl NotificationRequest {
    /// Creates a `success` notification.
    pub fn success(message: impl Into<String>) -> Self {
        Self::plain(message, NotificationKind::Success)
    }

    /// Creates an `error` notification.
    pub fn error(message: impl Into<String>) -> Self {
        Self::plain(message, NotificationKind::Error)
    }

    /// Creates a `confirm` notification carrying `buttons`.
    pub fn confirm(message: impl Into<String>, buttons: Vec<NotificationButton>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Confirm,
            duration: None,
            buttons,
        }
    }

    /// Sets how long the notification stays visible.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Returns the first button tagged with `class_name`.
    pub fn button(&self, class_name: &str) -> Option<&NotificationButton> {
        self.buttons.iter().find(|b| b.class_name == class_name)
    }

    fn plain(message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            message: message.into(),
            kind,
            duration: None,
            buttons: Vec::new(),
        }
    }
}

/// Opaque handle identifying a loading indicator shown by the [`crate::NotificationPort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadingHandle(u64);

impl LoadingHandle {
    /// Creates a handle from a port-assigned integer.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn image_records_use_flat_field_names_on_disk() {
        let record = ImageRecord::new("image1.jpg", "sha123", "https://example.test/image1.jpg");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["filename"], "image1.jpg");
        assert_eq!(json["sha"], "sha123");
        assert_eq!(json["url"], "https://example.test/image1.jpg");
    }

    #[test]
    fn buttons_are_found_by_class_and_pressed() {
        let presses = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&presses);
        let request = NotificationRequest::confirm(
            "Delete?",
            vec![NotificationButton::new(CONFIRM_BUTTON_CLASS, "Yes", move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })],
        );

        assert!(request.button(CANCEL_BUTTON_CLASS).is_none());
        request.button(CONFIRM_BUTTON_CLASS).unwrap().press();
        assert_eq!(presses.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn plain_notifications_have_no_buttons() {
        let request = NotificationRequest::error("boom").with_duration(Duration::from_secs(3));
        assert_eq!(request.kind, NotificationKind::Error);
        assert!(request.buttons.is_empty());
        assert_eq!(request.duration, Some(Duration::from_secs(3)));
    }
}
