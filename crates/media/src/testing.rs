//! Hand-written port fakes shared by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::config::GithubConfig;
use crate::errors::RemoteError;
use crate::identifiers::{CommitSha, ContentPath, ContentSha};
use crate::ports::{ImageManagerVisibility, NotificationPort, RemoteImageStore, TitleSource};
use crate::types::{LoadingHandle, NotificationKind, NotificationRequest, UploadedImage};

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingNotifier {
    requests: Mutex<Vec<NotificationRequest>>,
    shown: Mutex<Vec<LoadingHandle>>,
    hidden: Mutex<Vec<LoadingHandle>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn requests(&self) -> Vec<NotificationRequest> {
        self.requests.lock().clone()
    }

    pub fn last(&self) -> NotificationRequest {
        self.requests
            .lock()
            .last()
            .cloned()
            .expect("no notification was emitted")
    }

    pub fn messages_of(&self, kind: NotificationKind) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.message.clone())
            .collect()
    }

    pub fn loading_balanced(&self) -> bool {
        *self.shown.lock() == *self.hidden.lock()
    }

    pub fn loading_shown(&self) -> usize {
        self.shown.lock().len()
    }
}

impl NotificationPort for RecordingNotifier {
    fn notify(&self, request: NotificationRequest) {
        self.requests.lock().push(request);
    }

    fn show_loading(&self, _message: &str) -> LoadingHandle {
        let mut shown = self.shown.lock();
        let handle = LoadingHandle::new(shown.len() as u64 + 1);
        shown.push(handle);
        handle
    }

    fn hide_loading(&self, handle: LoadingHandle) {
        self.hidden.lock().push(handle);
    }
}

#[derive(Default)]
pub struct RecordingVisibility {
    history: Mutex<Vec<bool>>,
}

impl RecordingVisibility {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn current(&self) -> Option<bool> {
        self.history.lock().last().copied()
    }
}

impl ImageManagerVisibility for RecordingVisibility {
    fn set_visible(&self, visible: bool) {
        self.history.lock().push(visible);
    }
}

pub struct FixedTitle(pub Option<String>);

impl TitleSource for FixedTitle {
    fn current_title(&self) -> Option<String> {
        self.0.clone()
    }
}

// ---------------------------------------------------------------------------
// Remote store
// ---------------------------------------------------------------------------

/// Remote store whose answers are set up per test. Deletes succeed unless the
/// filename (last path segment) has a scripted failure.
pub struct ScriptedRemote {
    check: Mutex<Result<(), RemoteError>>,
    delete_failures: Mutex<HashMap<String, RemoteError>>,
    existing: Mutex<HashMap<String, ContentSha>>,
    upload_failure: Mutex<Option<RemoteError>>,
    calls: Mutex<Vec<String>>,
    deletes_in_flight: AtomicUsize,
    peak_deletes_in_flight: AtomicUsize,
}

impl ScriptedRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            check: Mutex::new(Ok(())),
            delete_failures: Mutex::new(HashMap::new()),
            existing: Mutex::new(HashMap::new()),
            upload_failure: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            deletes_in_flight: AtomicUsize::new(0),
            peak_deletes_in_flight: AtomicUsize::new(0),
        })
    }

    pub fn check_returns(&self, result: Result<(), RemoteError>) {
        *self.check.lock() = result;
    }

    pub fn fail_delete(&self, filename: &str, error: RemoteError) {
        self.delete_failures.lock().insert(filename.to_string(), error);
    }

    pub fn fail_upload(&self, error: RemoteError) {
        *self.upload_failure.lock() = Some(error);
    }

    pub fn with_existing(&self, path: &str, sha: &str) {
        self.existing
            .lock()
            .insert(path.to_string(), ContentSha::new(sha).expect("non-empty sha"));
    }

    /// Every call as `"{verb} {path}"`, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Highest number of deletes that were outstanding at the same time.
    pub fn peak_deletes_in_flight(&self) -> usize {
        self.peak_deletes_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, verb: &str, path: &str) {
        self.calls.lock().push(format!("{verb} {path}"));
    }
}

fn filename_of(path: &ContentPath) -> &str {
    path.as_str().rsplit('/').next().unwrap_or_default()
}

#[async_trait]
impl RemoteImageStore for ScriptedRemote {
    async fn check_repository(&self, config: &GithubConfig) -> Result<(), RemoteError> {
        self.record("GET", &format!("repos/{}/{}", config.owner, config.repo));
        self.check.lock().clone()
    }

    async fn find_image(
        &self,
        _config: &GithubConfig,
        path: &ContentPath,
    ) -> Result<Option<ContentSha>, RemoteError> {
        self.record("FIND", path.as_str());
        Ok(self.existing.lock().get(path.as_str()).cloned())
    }

    async fn upload_image(
        &self,
        _config: &GithubConfig,
        path: &ContentPath,
        content: &[u8],
        _message: &str,
        existing: Option<&ContentSha>,
    ) -> Result<UploadedImage, RemoteError> {
        let verb = if existing.is_some() { "REPLACE" } else { "PUT" };
        self.record(verb, path.as_str());
        if let Some(err) = self.upload_failure.lock().clone() {
            return Err(err);
        }
        Ok(UploadedImage {
            sha: ContentSha::new(format!("blob-{}", content.len())).expect("non-empty"),
            url: format!("https://raw.test/{path}"),
            commit: CommitSha::new("commit-upload").expect("non-empty"),
        })
    }

    async fn delete_image(
        &self,
        _config: &GithubConfig,
        path: &ContentPath,
        _sha: &ContentSha,
        _message: &str,
    ) -> Result<CommitSha, RemoteError> {
        self.record("DELETE", path.as_str());
        let outstanding = self.deletes_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_deletes_in_flight.fetch_max(outstanding, Ordering::SeqCst);
        // Yield so overlapping deletes would interleave.
        tokio::task::yield_now().await;
        self.deletes_in_flight.fetch_sub(1, Ordering::SeqCst);
        if let Some(err) = self.delete_failures.lock().get(filename_of(path)) {
            return Err(err.clone());
        }
        Ok(CommitSha::new("commit-delete").expect("non-empty"))
    }
}

pub fn complete_config() -> GithubConfig {
    GithubConfig {
        owner: "octo".into(),
        repo: "blog".into(),
        token: "ghp_test".into(),
        ..GithubConfig::default()
    }
}
