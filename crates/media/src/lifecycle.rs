//! Keeps the remote repository and the local image index in step.
//!
//! Ordering contract for every single-image write: the remote call completes
//! successfully before the local index is touched. A failed remote call leaves
//! the index exactly as it was and propagates the error to the caller.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::{ConfigStore, GithubConfig};
use crate::confirm::ConfirmationGate;
use crate::errors::{ImageError, RemoteError};
use crate::identifiers::{ArticleId, CommitSha, ContentSha};
use crate::index::LocalImageIndex;
use crate::ports::{LoadingGuard, NotificationPort, RemoteImageStore};
use crate::types::{ImageRecord, NotificationRequest};

/// What [`ImageLifecycleManager::delete_article_images`] does with records whose
/// remote delete failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartialFailurePolicy {
    /// Keep failed records in the index so they can be retried; drop the rest.
    #[default]
    RetainFailed,
    /// Clear the article's entry regardless of failures.
    ClearAll,
}

/// Outcome of deleting every image of an article.
#[derive(Debug, Default)]
pub struct DeleteSummary {
    /// Number of images removed from the remote repository.
    pub deleted: usize,
    /// Records whose remote delete failed, with the reason.
    pub failed: Vec<(ImageRecord, RemoteError)>,
}

impl DeleteSummary {
    /// Returns `true` if every attempted delete succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Uploads and deletes article images, mirroring each change in the local index.
#[derive(Clone)]
pub struct ImageLifecycleManager {
    config: ConfigStore,
    remote: Arc<dyn RemoteImageStore>,
    index: LocalImageIndex,
    notifier: Arc<dyn NotificationPort>,
    gate: ConfirmationGate,
    policy: PartialFailurePolicy,
}

impl ImageLifecycleManager {
    /// Creates a manager with the default [`PartialFailurePolicy`].
    pub fn new(
        config: ConfigStore,
        remote: Arc<dyn RemoteImageStore>,
        index: LocalImageIndex,
        notifier: Arc<dyn NotificationPort>,
    ) -> Self {
        let gate = ConfirmationGate::new(Arc::clone(&notifier));
        Self {
            config,
            remote,
            index,
            notifier,
            gate,
            policy: PartialFailurePolicy::default(),
        }
    }

    /// Sets what happens to records whose remote delete failed.
    #[must_use]
    pub fn with_partial_failure_policy(mut self, policy: PartialFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The index this manager keeps in step.
    pub fn index(&self) -> &LocalImageIndex {
        &self.index
    }

    /// Deletes one image remotely, then forgets it locally.
    ///
    /// On failure the local index is unchanged and the error is returned as-is
    /// (for API failures its message reads `"GitHub API: {message}"`).
    #[instrument(skip(self), fields(article = %article_id))]
    pub async fn delete_single_image_from_github(
        &self,
        article_id: &ArticleId,
        filename: &str,
        sha: &str,
    ) -> Result<CommitSha, ImageError> {
        let config = self.config.snapshot();
        let commit = self.delete_remote(&config, article_id, filename, sha).await?;
        self.index.remove_image_info(article_id, filename).await?;
        info!(filename, %commit, "Image deleted");
        Ok(commit)
    }

    /// Deletes every indexed image of `article_id`.
    ///
    /// The Contents API rejects concurrent writes to one branch, so deletes are
    /// issued one at a time; every one is awaited before the index is updated
    /// and a failure never stops the rest. A `success` notification reports how
    /// many images were removed and an `error` notification how many were not.
    /// An article with no indexed images is a no-op.
    #[instrument(skip(self), fields(article = %article_id))]
    pub async fn delete_article_images(&self, article_id: &ArticleId) -> Result<DeleteSummary, ImageError> {
        let images = self.index.list_images(article_id).await?;
        if images.is_empty() {
            return Ok(DeleteSummary::default());
        }

        let config = self.config.snapshot();
        let mut summary = DeleteSummary::default();
        {
            let _loading = LoadingGuard::show(&self.notifier, "Deleting images...");
            for record in images {
                let outcome = self
                    .delete_remote(&config, article_id, &record.filename, &record.sha)
                    .await;
                match outcome {
                    Ok(_) => summary.deleted += 1,
                    Err(err) => {
                        warn!(filename = %record.filename, error = %err, "Image delete failed");
                        summary.failed.push((record, err));
                    }
                }
            }
        }

        match self.policy {
            PartialFailurePolicy::ClearAll => self.index.clear_article_images(article_id).await?,
            PartialFailurePolicy::RetainFailed => {
                let retained: Vec<ImageRecord> =
                    summary.failed.iter().map(|(record, _)| record.clone()).collect();
                self.index.replace_images(article_id, &retained).await?;
            }
        }

        info!(deleted = summary.deleted, failed = summary.failed.len(), "Article images deleted");
        self.notifier.notify(NotificationRequest::success(format!(
            "Deleted {}",
            images_phrase(summary.deleted)
        )));
        if !summary.is_complete() {
            self.notifier.notify(NotificationRequest::error(format!(
                "Failed to delete {}",
                images_phrase(summary.failed.len())
            )));
        }
        Ok(summary)
    }

    /// Uploads `content` as `filename` in `article_id`'s image directory.
    ///
    /// An existing object at the same path is replaced. On success the index
    /// holds exactly one record for `filename`, pointing at the new revision.
    #[instrument(skip(self, content), fields(article = %article_id, bytes = content.len()))]
    pub async fn upload_image(
        &self,
        article_id: &ArticleId,
        filename: &str,
        content: &[u8],
    ) -> Result<ImageRecord, ImageError> {
        let config = self.config.snapshot();
        config.require_complete()?;
        check_filename(filename)?;

        let path = config.image_path(article_id, filename);
        let uploaded = {
            let _loading = LoadingGuard::show(&self.notifier, &format!("Uploading {filename}..."));
            let existing = self.remote.find_image(&config, &path).await?;
            self.remote
                .upload_image(
                    &config,
                    &path,
                    content,
                    &format!("Upload image {filename}"),
                    existing.as_ref(),
                )
                .await?
        };

        let record = ImageRecord::new(filename, uploaded.sha.as_str(), uploaded.url);
        self.index.upsert_image_info(article_id, record.clone()).await?;
        info!(filename, commit = %uploaded.commit, "Image uploaded");
        Ok(record)
    }

    /// Asks for confirmation, then deletes one image.
    ///
    /// Returns `Ok(false)` without touching either store if the user declines.
    pub async fn confirm_and_delete_image(
        &self,
        article_id: &ArticleId,
        filename: &str,
        sha: &str,
    ) -> Result<bool, ImageError> {
        if !self.gate.confirm(format!("Delete image {filename}?")).await {
            return Ok(false);
        }
        self.delete_single_image_from_github(article_id, filename, sha)
            .await
            .map(|_| true)
    }

    /// Asks for confirmation, then deletes every image of `article_id`.
    ///
    /// Returns `Ok(None)` without touching either store if the user declines.
    pub async fn confirm_and_delete_article_images(
        &self,
        article_id: &ArticleId,
    ) -> Result<Option<DeleteSummary>, ImageError> {
        if !self
            .gate
            .confirm(format!("Delete all images of article {article_id}?"))
            .await
        {
            return Ok(None);
        }
        self.delete_article_images(article_id).await.map(Some)
    }

    async fn delete_remote(
        &self,
        config: &GithubConfig,
        article_id: &ArticleId,
        filename: &str,
        sha: &str,
    ) -> Result<CommitSha, RemoteError> {
        config.require_complete()?;
        check_filename(filename)?;
        let sha = ContentSha::new(sha)
            .ok_or_else(|| RemoteError::InvalidRequest(format!("no revision sha for {filename}")))?;
        let path = config.image_path(article_id, filename);
        self.remote
            .delete_image(config, &path, &sha, &format!("Delete image {filename}"))
            .await
    }
}

fn check_filename(filename: &str) -> Result<(), RemoteError> {
    if filename.is_empty() || filename.contains('/') || filename == "." || filename == ".." {
        return Err(RemoteError::InvalidRequest(format!(
            "invalid image filename {filename:?}"
        )));
    }
    Ok(())
}

fn images_phrase(count: usize) -> String {
    if count == 1 {
        "1 image".to_string()
    } else {
        format!("{count} images")
    }
}
