//! Article identifier generation.
//!
//! An identifier is `{slug}-{suffix}`: the slugified editor title followed by
//! the creation time in milliseconds, base 36. The generator remembers the last
//! suffix it issued and never issues it twice, so identifiers stay distinct
//! even when two articles are created within the same millisecond.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::identifiers::ArticleId;
use crate::ports::TitleSource;

/// Slug used when the title is unavailable or has no alphanumeric characters.
pub const FALLBACK_SLUG: &str = "article";

/// Lowercases `title`, collapses every run of non-alphanumeric characters into a
/// single `-`, and trims leading and trailing separators.
///
/// Only ASCII letters and digits are kept, so the result is safe as a path segment.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.iter().rev().map(|&d| d as char).collect()
}

/// Derives identifiers for new articles from the current editor title.
pub struct ArticleIdGenerator {
    title: Option<Arc<dyn TitleSource>>,
    last_suffix: Mutex<u64>,
}

impl ArticleIdGenerator {
    /// Creates a generator reading titles from `title`.
    pub fn new(title: Arc<dyn TitleSource>) -> Self {
        Self {
            title: Some(title),
            last_suffix: Mutex::new(0),
        }
    }

    /// Creates a generator with no title source; every identifier uses [`FALLBACK_SLUG`].
    pub fn without_title() -> Self {
        Self {
            title: None,
            last_suffix: Mutex::new(0),
        }
    }

    /// Generates an identifier for an article created now.
    pub fn generate_article_id(&self) -> ArticleId {
        self.generate_at(Utc::now())
    }

    /// Generates an identifier for an article created at `now`.
    pub fn generate_at(&self, now: DateTime<Utc>) -> ArticleId {
        let title = self
            .title
            .as_ref()
            .and_then(|source| source.current_title())
            .unwrap_or_default();
        let mut slug = slugify(&title);
        if slug.is_empty() {
            slug = FALLBACK_SLUG.to_string();
        }

        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let suffix = {
            let mut last = self.last_suffix.lock();
            *last = if millis > *last { millis } else { *last + 1 };
            *last
        };

        let id = ArticleId::from_parts(&slug, &to_base36(suffix));
        tracing::debug!(%id, "Article id generated");
        id
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::testing::FixedTitle;

    fn generator(title: Option<&str>) -> ArticleIdGenerator {
        ArticleIdGenerator::new(Arc::new(FixedTitle(title.map(str::to_string))))
    }

    #[test]
    fn slugify_collapses_and_trims_separators() {
        assert_eq!(slugify("My Test Article"), "my-test-article");
        assert_eq!(slugify("  Hello,   World!! "), "hello-world");
        assert_eq!(slugify("--Rust & C++ in 2024--"), "rust-c-in-2024");
        assert_eq!(slugify("Ünïcode café"), "n-code-caf");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn base36_encoding() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn id_starts_with_title_slug_and_has_suffix() {
        let id = generator(Some("My Test Article")).generate_article_id();
        let suffix = id
            .as_str()
            .strip_prefix("my-test-article-")
            .expect("slug prefix");
        assert!(!suffix.is_empty());
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn ids_at_different_times_differ() {
        let generator = generator(Some("My Test Article"));
        let first = generator.generate_at(Utc.timestamp_millis_opt(1_700_000_000_000).unwrap());
        let second = generator.generate_at(Utc.timestamp_millis_opt(1_700_000_000_500).unwrap());
        assert_ne!(first, second);
    }

    #[test]
    fn ids_within_the_same_millisecond_differ() {
        let generator = generator(Some("Post"));
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let first = generator.generate_at(now);
        let second = generator.generate_at(now);
        assert_ne!(first, second);
    }

    #[test]
    fn missing_or_symbol_only_title_falls_back() {
        assert!(generator(None)
            .generate_article_id()
            .as_str()
            .starts_with("article-"));
        assert!(generator(Some("???"))
            .generate_article_id()
            .as_str()
            .starts_with("article-"));
        assert!(ArticleIdGenerator::without_title()
            .generate_article_id()
            .as_str()
            .starts_with("article-"));
    }
}
