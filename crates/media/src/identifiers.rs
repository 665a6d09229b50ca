//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a string. This prevents accidentally interchanging, for example, a
//! [`ContentSha`] with a [`CommitSha`] even though both are hex strings under the
//! hood.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// Identifies an authored article.
    ///
    /// Generated once at article creation by [`crate::ArticleIdGenerator`] and
    /// immutable thereafter. Used as the key into the local image index and as
    /// a directory segment in the remote repository.
    ArticleId
}

string_id! {
    /// Revision identifier of a stored blob in the remote repository.
    ///
    /// Opaque to this crate; required by the remote store to authorise an
    /// update or delete against the current version of the object.
    ContentSha
}

string_id! {
    /// A Git commit SHA returned by the remote store after a write.
    CommitSha
}

string_id! {
    /// A path inside the remote repository, e.g. `"images/my-post-abc/cover.png"`.
    ContentPath
}

impl ArticleId {
    /// Joins a slug and a suffix as `{slug}-{suffix}`; both are non-empty by construction.
    pub(crate) fn from_parts(slug: &str, suffix: &str) -> Self {
        Self(format!("{slug}-{suffix}"))
    }
}

impl ContentPath {
    /// Builds the storage path of an article image: `{images_path}{article_id}/{filename}`.
    ///
    /// `images_path` is used verbatim (it normally carries its own trailing `/`).
    pub fn for_image(images_path: &str, article_id: &ArticleId, filename: &str) -> Self {
        Self(format!("{images_path}{article_id}/{filename}"))
    }
}
