//! Error types for the article image domain.
//!
//! [`RemoteError`] is produced by [`crate::RemoteImageStore`] adapters and covers
//! every way a round-trip to the remote repository can fail. [`StoreError`] is
//! produced by [`crate::KeyValueStore`] adapters. [`ImageError`] is what the
//! [`crate::ImageLifecycleManager`] hands back to its caller.
//!
//! Nothing here is retried automatically: every failure either becomes an
//! `error` notification or propagates to the caller.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Remote repository errors
// ---------------------------------------------------------------------------

/// Failure of a call against the remote content store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Owner, repository, or token is missing. Detected before any request is issued.
    #[error("GitHub configuration incomplete: {missing} not set")]
    ConfigIncomplete {
        /// Which setting is missing (e.g. `"token"`).
        missing: &'static str,
    },

    /// The remote store rejected the credentials (HTTP 401).
    #[error("GitHub API: invalid token")]
    Auth,

    /// The repository does not exist or is hidden from the token (HTTP 404 on
    /// the repository itself).
    #[error("GitHub API: repository not found")]
    NotFound,

    /// Any other non-success status.
    ///
    /// `message` is the `message` field of the remote error body, or the status
    /// reason phrase when the body carries none.
    #[error("GitHub API: {message}")]
    Api {
        /// HTTP status code returned by the remote store.
        status: u16,
        /// Message reported by the remote store.
        message: String,
    },

    /// No response reached the client (DNS, TLS, connection reset, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The request could not be built from the supplied inputs.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A success response carried a body that could not be decoded.
    #[error("unexpected GitHub response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Returns `true` if the failure happened below HTTP (no status was received).
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

// ---------------------------------------------------------------------------
// Local store errors
// ---------------------------------------------------------------------------

/// Failure of the local key-value store backing the image index.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing medium failed.
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialised for storage.
    #[error("store serialisation failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Lifecycle errors
// ---------------------------------------------------------------------------

/// Failure of an [`crate::ImageLifecycleManager`] operation.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The remote step failed; the local index was not touched.
    ///
    /// Displays exactly like the wrapped [`RemoteError`] so callers see
    /// `"GitHub API: {message}"` unchanged.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The remote step succeeded but the local index could not be updated.
    #[error(transparent)]
    Index(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// A configuration document could not be parsed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document was malformed or had wrongly-typed fields.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
