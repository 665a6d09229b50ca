//! Port traits: what the domain needs from the outside world.
//!
//! Infrastructure crates implement these; the domain only ever holds them as
//! `Arc<dyn Trait>`. The remote and storage ports are async because every call
//! suspends on I/O. The presentation ports are synchronous: they hand a request
//! to the UI and return immediately.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::GithubConfig;
use crate::errors::{RemoteError, StoreError};
use crate::identifiers::{CommitSha, ContentPath, ContentSha};
use crate::types::{LoadingHandle, NotificationRequest, UploadedImage};

// ---------------------------------------------------------------------------
// Remote content store
// ---------------------------------------------------------------------------

/// The remote, Git-hosted content repository.
///
/// Every method receives the configuration snapshot to use; implementations
/// authenticate with `config.token` and target `config.branch`. No method
/// retries.
#[async_trait]
pub trait RemoteImageStore: Send + Sync {
    /// Confirms the repository `config.owner/config.repo` is reachable with `config.token`.
    ///
    /// Maps HTTP 401 to [`RemoteError::Auth`] and 404 to [`RemoteError::NotFound`].
    async fn check_repository(&self, config: &GithubConfig) -> Result<(), RemoteError>;

    /// Returns the revision of the object at `path`, or `None` if there is none.
    async fn find_image(
        &self,
        config: &GithubConfig,
        path: &ContentPath,
    ) -> Result<Option<ContentSha>, RemoteError>;

    /// Writes `content` to `path`, replacing the revision `existing` when given.
    ///
    /// Maps HTTP 401 to [`RemoteError::Auth`]; every other failure, a 404 for a
    /// missing branch included, is a [`RemoteError::Api`].
    async fn upload_image(
        &self,
        config: &GithubConfig,
        path: &ContentPath,
        content: &[u8],
        message: &str,
        existing: Option<&ContentSha>,
    ) -> Result<UploadedImage, RemoteError>;

    /// Deletes revision `sha` of the object at `path` and returns the new commit.
    ///
    /// Every non-success status is a [`RemoteError::Api`].
    async fn delete_image(
        &self,
        config: &GithubConfig,
        path: &ContentPath,
        sha: &ContentSha,
        message: &str,
    ) -> Result<CommitSha, RemoteError>;
}

// ---------------------------------------------------------------------------
// Local key-value store
// ---------------------------------------------------------------------------

/// Persistent string key-value storage that survives process restarts.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

/// Displays transient messages, confirmations, and loading indicators.
pub trait NotificationPort: Send + Sync {
    /// Displays `request`. For `confirm` requests the presentation layer later
    /// invokes exactly one of the request's button actions.
    fn notify(&self, request: NotificationRequest);

    /// Shows a loading indicator. The default shows nothing.
    fn show_loading(&self, _message: &str) -> LoadingHandle {
        LoadingHandle::new(0)
    }

    /// Hides the indicator identified by `handle`.
    fn hide_loading(&self, _handle: LoadingHandle) {}
}

/// Visibility of the "manage images" affordance in the editor.
pub trait ImageManagerVisibility: Send + Sync {
    /// Shows (`true`) or hides (`false`) the affordance.
    fn set_visible(&self, visible: bool);
}

/// Supplies the title currently displayed in the editor.
pub trait TitleSource: Send + Sync {
    /// Returns the current title, or `None` if no title field is available.
    fn current_title(&self) -> Option<String>;
}

// ---------------------------------------------------------------------------
// Loading guard
// ---------------------------------------------------------------------------

/// Shows a loading indicator for as long as it is alive.
///
/// `hide_loading` runs on drop, so every exit path (success, `?`, early return)
/// hides the indicator exactly once.
pub struct LoadingGuard {
    port: Arc<dyn NotificationPort>,
    handle: LoadingHandle,
}

impl LoadingGuard {
    /// Shows `message` on `port` and returns the guard that will hide it.
    pub fn show(port: &Arc<dyn NotificationPort>, message: &str) -> Self {
        let handle = port.show_loading(message);
        Self {
            port: Arc::clone(port),
            handle,
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.port.hide_loading(self.handle);
    }
}
