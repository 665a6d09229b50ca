//! Checks that the configured credentials and repository are usable.
//!
//! Validation never fails from the caller's point of view: every problem is
//! reported through the [`NotificationPort`] and turns into `false`. The "manage
//! images" affordance is shown exactly when validation returns `true`.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::ConfigStore;
use crate::errors::RemoteError;
use crate::ports::{ImageManagerVisibility, LoadingGuard, NotificationPort, RemoteImageStore};
use crate::types::NotificationRequest;

const MSG_REPOSITORY_REQUIRED: &str = "GitHub username and repository are required";
const MSG_TOKEN_REQUIRED: &str = "GitHub access token not specified";
const MSG_CONNECTED: &str = "GitHub settings verified";
const MSG_INVALID_TOKEN: &str = "Invalid token: GitHub rejected the access token";
const MSG_REPOSITORY_NOT_FOUND: &str = "Repository not found: check the username and repository name";
const MSG_NETWORK_ERROR: &str = "Network error while contacting GitHub";

/// Validates the [`ConfigStore`] against the remote repository.
#[derive(Clone)]
pub struct ConfigValidator {
    config: ConfigStore,
    remote: Arc<dyn RemoteImageStore>,
    notifier: Arc<dyn NotificationPort>,
    visibility: Arc<dyn ImageManagerVisibility>,
}

impl ConfigValidator {
    /// Creates a validator.
    pub fn new(
        config: ConfigStore,
        remote: Arc<dyn RemoteImageStore>,
        notifier: Arc<dyn NotificationPort>,
        visibility: Arc<dyn ImageManagerVisibility>,
    ) -> Self {
        Self {
            config,
            remote,
            notifier,
            visibility,
        }
    }

    /// Validates the current configuration with at most one remote request.
    ///
    /// Missing owner/repository or token is reported without contacting the
    /// remote store.
    #[instrument(skip(self))]
    pub async fn validate(&self) -> bool {
        let config = self.config.snapshot();

        if !config.has_repository() {
            return self.reject(MSG_REPOSITORY_REQUIRED.to_string());
        }
        if !config.has_token() {
            return self.reject(MSG_TOKEN_REQUIRED.to_string());
        }

        let result = {
            let _loading = LoadingGuard::show(&self.notifier, "Checking GitHub settings...");
            self.remote.check_repository(&config).await
        };

        match result {
            Ok(()) => {
                info!(owner = %config.owner, repo = %config.repo, "GitHub configuration verified");
                self.notifier.notify(NotificationRequest::success(MSG_CONNECTED));
                self.visibility.set_visible(true);
                true
            }
            Err(err) => {
                warn!(error = %err, "GitHub configuration rejected");
                self.reject(failure_message(&err))
            }
        }
    }

    fn reject(&self, message: String) -> bool {
        self.notifier.notify(NotificationRequest::error(message));
        self.visibility.set_visible(false);
        false
    }
}

fn failure_message(err: &RemoteError) -> String {
    match err {
        RemoteError::Auth => MSG_INVALID_TOKEN.to_string(),
        RemoteError::NotFound => MSG_REPOSITORY_NOT_FOUND.to_string(),
        RemoteError::Network(detail) => format!("{MSG_NETWORK_ERROR}: {detail}"),
        RemoteError::Api { message, .. } => format!("GitHub API error: {message}"),
        other => format!("GitHub check failed: {other}"),
    }
}
