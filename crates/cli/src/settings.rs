//! Configuration file and environment loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use media::GithubConfig;

/// Directory name used under the platform config and data directories.
pub const APP_DIR: &str = "article-images";

/// Environment variables that override the configuration file, in application order.
const OVERRIDES: [(&str, fn(&mut GithubConfig, String)); 5] = [
    ("GITHUB_OWNER", |c, v| c.owner = v),
    ("GITHUB_REPO", |c, v| c.repo = v),
    ("GITHUB_TOKEN", |c, v| c.token = v),
    ("GITHUB_BRANCH", |c, v| c.branch = v),
    ("GITHUB_IMAGES_PATH", |c, v| c.images_path = v),
];

/// Default configuration file: `<config_dir>/article-images/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

/// Default index file: `<data_dir>/article-images/index.json`.
pub fn default_store_path() -> Result<PathBuf> {
    let dir = dirs::data_dir().context("Failed to determine the user data directory")?;
    Ok(dir.join(APP_DIR).join("index.json"))
}

/// Loads the GitHub configuration.
///
/// An explicit `path` must exist. Without one, the default file is used when
/// present and the built-in defaults otherwise. Non-empty `GITHUB_*`
/// environment variables override whatever the file says.
pub fn load(path: Option<&Path>) -> Result<GithubConfig> {
    let file = match path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|p| p.exists()),
    };

    let mut config = match file {
        Some(file) => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read config file: {}", file.display()))?;
            GithubConfig::from_toml_str(&text)
                .with_context(|| format!("Failed to parse config file: {}", file.display()))?
        }
        None => GithubConfig::default(),
    };

    apply_overrides(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

/// Applies every non-empty override returned by `lookup`.
pub fn apply_overrides(config: &mut GithubConfig, lookup: impl Fn(&str) -> Option<String>) {
    for (name, apply) in OVERRIDES {
        if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
            tracing::debug!(variable = name, "Configuration overridden from environment");
            apply(config, value);
        }
    }
}

/// API root from `GITHUB_API_URL`, defaulting to the public GitHub API.
pub fn api_base() -> String {
    std::env::var("GITHUB_API_URL")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| github::DEFAULT_API_BASE.to_string())
}
