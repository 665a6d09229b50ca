//! Remote repository connection parameters and the store that holds them.
//!
//! [`GithubConfig`] is a plain value. [`ConfigStore`] is an explicitly
//! constructed, cloneable handle to the current value; every component that
//! talks to the remote repository is given a `ConfigStore` at construction and
//! takes a [`ConfigStore::snapshot`] at the start of each operation, so a
//! reconfiguration never changes settings halfway through a request.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, RemoteError};
use crate::identifiers::{ArticleId, ContentPath};

/// Branch used when none is configured.
pub const DEFAULT_BRANCH: &str = "main";

/// Repository directory under which article images are stored when none is configured.
pub const DEFAULT_IMAGES_PATH: &str = "images/";

/// Connection parameters for the remote content repository.
///
/// Absent values are empty strings, never `None`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// Account or organisation that owns the repository.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Personal access token sent with every request.
    pub token: String,
    /// Branch that receives image commits.
    pub branch: String,
    /// Directory prefix for image paths, normally ending in `/`.
    #[serde(alias = "imagesPath")]
    pub images_path: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            token: String::new(),
            branch: DEFAULT_BRANCH.to_string(),
            images_path: DEFAULT_IMAGES_PATH.to_string(),
        }
    }
}

// The token must never reach logs.
impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &if self.token.is_empty() { "" } else { "***" })
            .field("branch", &self.branch)
            .field("images_path", &self.images_path)
            .finish()
    }
}

#[derive(Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    github: GithubConfig,
}

impl GithubConfig {
    /// Parses the `[github]` table of a TOML configuration document.
    ///
    /// A document without a `[github]` table yields the defaults.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        let parsed: ConfigDocument = toml::from_str(document)?;
        Ok(parsed.github)
    }

    /// Returns `true` if both owner and repository are set.
    pub fn has_repository(&self) -> bool {
        !self.owner.is_empty() && !self.repo.is_empty()
    }

    /// Returns `true` if an access token is set.
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    /// Checks the settings every remote call needs, repository first.
    pub fn require_complete(&self) -> Result<(), RemoteError> {
        if !self.has_repository() {
            return Err(RemoteError::ConfigIncomplete {
                missing: "owner/repository",
            });
        }
        if !self.has_token() {
            return Err(RemoteError::ConfigIncomplete { missing: "token" });
        }
        Ok(())
    }

    /// Returns the repository path of `filename` within `article_id`'s image directory.
    pub fn image_path(&self, article_id: &ArticleId, filename: &str) -> ContentPath {
        ContentPath::for_image(&self.images_path, article_id, filename)
    }
}

// ---------------------------------------------------------------------------
// ConfigStore
// ---------------------------------------------------------------------------

/// Shared, mutable handle to the active [`GithubConfig`].
///
/// Clones share the same underlying value.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    inner: Arc<RwLock<GithubConfig>>,
}

impl ConfigStore {
    /// Creates a store holding `config`.
    pub fn new(config: GithubConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Returns a copy of the current configuration.
    pub fn snapshot(&self) -> GithubConfig {
        self.inner.read().clone()
    }

    /// Replaces the whole configuration.
    pub fn replace(&self, config: GithubConfig) {
        tracing::debug!(owner = %config.owner, repo = %config.repo, "GitHub configuration replaced");
        *self.inner.write() = config;
    }

    /// Applies `f` to the current configuration in place.
    pub fn update(&self, f: impl FnOnce(&mut GithubConfig)) {
        let mut guard = self.inner.write();
        f(&mut *guard);
    }

    /// Restores the defaults: empty owner, repo and token, default branch and images path.
    pub fn reset(&self) {
        tracing::debug!("GitHub configuration reset");
        *self.inner.write() = GithubConfig::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_main_branch_and_images_directory() {
        let config = GithubConfig::default();
        assert_eq!(config.branch, "main");
        assert_eq!(config.images_path, "images/");
        assert!(config.owner.is_empty());
        assert!(!config.has_repository());
        assert!(!config.has_token());
    }

    #[test]
    fn toml_fills_missing_fields_with_defaults() {
        let config = GithubConfig::from_toml_str(
            r#"
            [github]
            owner = "octo"
            repo = "blog"
            "#,
        )
        .unwrap();
        assert_eq!(config.owner, "octo");
        assert_eq!(config.repo, "blog");
        assert_eq!(config.token, "");
        assert_eq!(config.branch, "main");
        assert_eq!(config.images_path, "images/");
    }

    #[test]
    fn toml_without_github_table_yields_defaults() {
        let config = GithubConfig::from_toml_str("").unwrap();
        assert_eq!(config, GithubConfig::default());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(GithubConfig::from_toml_str("[github]\nowner = 3").is_err());
    }

    #[test]
    fn require_complete_checks_repository_before_token() {
        let mut config = GithubConfig::default();
        assert_eq!(
            config.require_complete(),
            Err(RemoteError::ConfigIncomplete {
                missing: "owner/repository"
            })
        );

        config.owner = "octo".into();
        config.repo = "blog".into();
        assert_eq!(
            config.require_complete(),
            Err(RemoteError::ConfigIncomplete { missing: "token" })
        );

        config.token = "ghp_x".into();
        assert!(config.require_complete().is_ok());
    }

    #[test]
    fn debug_output_redacts_token() {
        let config = GithubConfig {
            token: "ghp_secret".into(),
            ..GithubConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("ghp_secret"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn store_clones_share_state_and_reset_restores_defaults() {
        let store = ConfigStore::default();
        let other = store.clone();

        store.update(|c| {
            c.owner = "octo".into();
            c.branch = "drafts".into();
        });
        assert_eq!(other.snapshot().owner, "octo");
        assert_eq!(other.snapshot().branch, "drafts");

        other.reset();
        assert_eq!(store.snapshot(), GithubConfig::default());
    }
}
