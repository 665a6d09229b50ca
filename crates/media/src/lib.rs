//! Article image management domain.
//!
//! Images attached to authored articles are stored in a remote Git-hosted
//! repository and mirrored in a local key-value index so the editor can list
//! them without a remote round-trip. This crate holds every rule about keeping
//! those two stores consistent; infrastructure crates implement the port traits
//! defined here and never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no network or
//! file-system dependencies. It defines *what* is needed; the `github` and
//! `storage` crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`ArticleId`, `ContentSha`, etc.) |
//! | [`types`] | Shared value types (`ImageRecord`, `NotificationRequest`, etc.) |
//! | [`errors`] | Remote, store, lifecycle, and configuration errors |
//! | [`config`] | `GithubConfig` and the injectable `ConfigStore` |
//! | [`ports`] | Port traits implemented by infrastructure crates |
//! | [`index`] | Local image index over a `KeyValueStore` |
//! | [`validator`] | Credential and repository validation |
//! | [`lifecycle`] | Upload and delete, remote first then local |
//! | [`confirm`] | Yes/no confirmation gate |
//! | [`article_id`] | Article identifier generation |
//! | [`session`] | Per-article editing session caches |
//! | [`memory`] | In-memory `KeyValueStore` |

pub mod article_id;
pub mod config;
pub mod confirm;
pub mod errors;
pub mod identifiers;
pub mod index;
pub mod lifecycle;
pub mod memory;
pub mod ports;
pub mod session;
pub mod types;
pub mod validator;

#[cfg(test)]
mod testing;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use article_id::{slugify, ArticleIdGenerator, FALLBACK_SLUG};
pub use config::{ConfigStore, GithubConfig, DEFAULT_BRANCH, DEFAULT_IMAGES_PATH};
pub use confirm::ConfirmationGate;
pub use errors::{ConfigError, ImageError, RemoteError, StoreError};
pub use identifiers::{ArticleId, CommitSha, ContentPath, ContentSha};
pub use index::{index_key, LocalImageIndex};
pub use lifecycle::{DeleteSummary, ImageLifecycleManager, PartialFailurePolicy};
pub use memory::MemoryStore;
pub use ports::{
    ImageManagerVisibility, KeyValueStore, LoadingGuard, NotificationPort, RemoteImageStore,
    TitleSource,
};
pub use session::EditingSession;
pub use types::{
    ButtonAction, ImageRecord, LoadingHandle, NotificationButton, NotificationKind,
    NotificationRequest, UploadedImage, CANCEL_BUTTON_CLASS, CONFIRM_BUTTON_CLASS,
};
pub use validator::ConfigValidator;
