//! Local mirror of per-article image metadata.
//!
//! One entry per article under the key `article_{id}_images`; the value is the
//! JSON-serialised, insertion-ordered list of [`ImageRecord`]s. Every write
//! replaces the whole list. A missing key and a malformed value both read as an
//! empty list.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::StoreError;
use crate::identifiers::ArticleId;
use crate::ports::KeyValueStore;
use crate::types::ImageRecord;

/// Returns the storage key of `article_id`'s image list.
pub fn index_key(article_id: &ArticleId) -> String {
    format!("article_{article_id}_images")
}

/// Article-keyed image metadata over a [`KeyValueStore`].
#[derive(Clone)]
pub struct LocalImageIndex {
    store: Arc<dyn KeyValueStore>,
}

impl LocalImageIndex {
    /// Creates an index persisting into `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Appends a record to `article_id`'s list.
    ///
    /// Filenames are not deduplicated: saving the same filename twice stores two
    /// records. Use [`Self::upsert_image_info`] to replace instead.
    pub async fn save_image_info(
        &self,
        article_id: &ArticleId,
        filename: &str,
        sha: &str,
        url: &str,
    ) -> Result<(), StoreError> {
        let mut images = self.list_images(article_id).await?;
        images.push(ImageRecord::new(filename, sha, url));
        debug!(article = %article_id, filename, count = images.len(), "Image recorded");
        self.write(article_id, &images).await
    }

    /// Replaces every record named `record.filename` with `record`, appended at the end.
    pub async fn upsert_image_info(
        &self,
        article_id: &ArticleId,
        record: ImageRecord,
    ) -> Result<(), StoreError> {
        let mut images = self.list_images(article_id).await?;
        images.retain(|r| r.filename != record.filename);
        images.push(record);
        self.write(article_id, &images).await
    }

    /// Returns `article_id`'s records in insertion order.
    pub async fn list_images(&self, article_id: &ArticleId) -> Result<Vec<ImageRecord>, StoreError> {
        let key = index_key(article_id);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(images) => Ok(images),
            Err(err) => {
                warn!(key = %key, error = %err, "Malformed image index entry; treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Rewrites `article_id`'s list without any record named `filename`.
    pub async fn remove_image_info(
        &self,
        article_id: &ArticleId,
        filename: &str,
    ) -> Result<(), StoreError> {
        let mut images = self.list_images(article_id).await?;
        let before = images.len();
        images.retain(|r| r.filename != filename);
        debug!(article = %article_id, filename, removed = before - images.len(), "Image unrecorded");
        self.write(article_id, &images).await
    }

    /// Stores exactly `images` for `article_id`; an empty list removes the key.
    pub async fn replace_images(
        &self,
        article_id: &ArticleId,
        images: &[ImageRecord],
    ) -> Result<(), StoreError> {
        if images.is_empty() {
            self.clear_article_images(article_id).await
        } else {
            self.write(article_id, images).await
        }
    }

    /// Removes `article_id`'s entry entirely.
    pub async fn clear_article_images(&self, article_id: &ArticleId) -> Result<(), StoreError> {
        debug!(article = %article_id, "Image index cleared");
        self.store.remove(&index_key(article_id)).await
    }

    async fn write(&self, article_id: &ArticleId, images: &[ImageRecord]) -> Result<(), StoreError> {
        let value = serde_json::to_string(images)?;
        self.store.set(&index_key(article_id), value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn setup() -> (Arc<MemoryStore>, LocalImageIndex, ArticleId) {
        let store = Arc::new(MemoryStore::new());
        let index = LocalImageIndex::new(store.clone());
        (store, index, ArticleId::new("post-1").unwrap())
    }

    #[tokio::test]
    async fn save_on_empty_index_stores_single_record() {
        let (store, index, article) = setup();

        index
            .save_image_info(&article, "image1.jpg", "sha123", "https://cdn.test/image1.jpg")
            .await
            .unwrap();

        let raw = store.raw("article_post-1_images").unwrap();
        let stored: Vec<ImageRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].filename, "image1.jpg");
        assert_eq!(stored[0].sha, "sha123");
    }

    #[tokio::test]
    async fn save_keeps_duplicates_in_insertion_order() {
        let (_, index, article) = setup();
        index.save_image_info(&article, "a.png", "1", "u1").await.unwrap();
        index.save_image_info(&article, "b.png", "2", "u2").await.unwrap();
        index.save_image_info(&article, "a.png", "3", "u3").await.unwrap();

        let names: Vec<_> = index
            .list_images(&article)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.sha)
            .collect();
        assert_eq!(names, ["1", "2", "3"]);
    }

    #[tokio::test]
    async fn upsert_replaces_records_with_same_filename() {
        let (_, index, article) = setup();
        index.save_image_info(&article, "a.png", "1", "u1").await.unwrap();
        index.save_image_info(&article, "b.png", "2", "u2").await.unwrap();

        index
            .upsert_image_info(&article, ImageRecord::new("a.png", "9", "u9"))
            .await
            .unwrap();

        let images = index.list_images(&article).await.unwrap();
        assert_eq!(
            images,
            vec![ImageRecord::new("b.png", "2", "u2"), ImageRecord::new("a.png", "9", "u9")]
        );
    }

    #[tokio::test]
    async fn missing_and_malformed_entries_read_as_empty() {
        let (store, index, article) = setup();
        assert!(index.list_images(&article).await.unwrap().is_empty());

        store.insert_raw("article_post-1_images", "{not json");
        assert!(index.list_images(&article).await.unwrap().is_empty());

        // A malformed entry is overwritten by the next save.
        index.save_image_info(&article, "a.png", "1", "u1").await.unwrap();
        assert_eq!(index.list_images(&article).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn remove_drops_every_matching_record_only() {
        let (_, index, article) = setup();
        index.save_image_info(&article, "a.png", "1", "u1").await.unwrap();
        index.save_image_info(&article, "b.png", "2", "u2").await.unwrap();
        index.save_image_info(&article, "a.png", "3", "u3").await.unwrap();

        index.remove_image_info(&article, "a.png").await.unwrap();

        let images = index.list_images(&article).await.unwrap();
        assert_eq!(images, vec![ImageRecord::new("b.png", "2", "u2")]);
    }

    #[tokio::test]
    async fn clear_removes_the_key() {
        let (store, index, article) = setup();
        index.save_image_info(&article, "a.png", "1", "u1").await.unwrap();

        index.clear_article_images(&article).await.unwrap();

        assert!(store.raw("article_post-1_images").is_none());
    }

    #[tokio::test]
    async fn replace_with_empty_list_removes_the_key() {
        let (store, index, article) = setup();
        index.save_image_info(&article, "a.png", "1", "u1").await.unwrap();

        index.replace_images(&article, &[]).await.unwrap();

        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn articles_are_isolated() {
        let (_, index, article) = setup();
        let other = ArticleId::new("post-2").unwrap();
        index.save_image_info(&article, "a.png", "1", "u1").await.unwrap();

        assert!(index.list_images(&other).await.unwrap().is_empty());
    }
}
