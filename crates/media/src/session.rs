//! Per-article editing session state.
//!
//! Caches that only make sense while one article is open in the editor live
//! here rather than in process-wide state: images uploaded during the session
//! and the last rendered content. A session is created when an article is
//! opened and reset (or dropped) when it is closed.

use std::collections::HashMap;

use crate::identifiers::ArticleId;
use crate::types::ImageRecord;

/// Session-scoped caches for the article currently being edited.
#[derive(Debug, Clone)]
pub struct EditingSession {
    article_id: ArticleId,
    uploaded: HashMap<String, ImageRecord>,
    processed_content: Option<String>,
}

impl EditingSession {
    /// Opens a session for `article_id` with empty caches.
    pub fn new(article_id: ArticleId) -> Self {
        Self {
            article_id,
            uploaded: HashMap::new(),
            processed_content: None,
        }
    }

    /// The article this session edits.
    pub fn article_id(&self) -> &ArticleId {
        &self.article_id
    }

    /// Remembers an image uploaded during this session, replacing any earlier
    /// upload with the same filename.
    pub fn record_upload(&mut self, record: ImageRecord) {
        self.uploaded.insert(record.filename.clone(), record);
    }

    /// Returns the URL of `filename` if it was uploaded during this session.
    pub fn uploaded_url(&self, filename: &str) -> Option<&str> {
        self.uploaded.get(filename).map(|r| r.url.as_str())
    }

    /// Returns `true` if `filename` was uploaded during this session.
    pub fn has_upload(&self, filename: &str) -> bool {
        self.uploaded.contains_key(filename)
    }

    /// Forgets `filename`, e.g. after it has been deleted.
    pub fn forget(&mut self, filename: &str) -> Option<ImageRecord> {
        self.uploaded.remove(filename)
    }

    /// Number of images uploaded during this session.
    pub fn upload_count(&self) -> usize {
        self.uploaded.len()
    }

    /// Caches the latest rendered form of the article.
    pub fn set_processed_content(&mut self, content: impl Into<String>) {
        self.processed_content = Some(content.into());
    }

    /// The latest rendered form of the article, if any.
    pub fn processed_content(&self) -> Option<&str> {
        self.processed_content.as_deref()
    }

    /// Clears every cache, keeping the article.
    pub fn reset(&mut self) {
        self.uploaded.clear();
        self.processed_content = None;
    }
}
