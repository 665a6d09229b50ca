//! Article image GitHub infrastructure adapter.
//!
//! Implements the [`media::RemoteImageStore`] port over the GitHub REST
//! Contents API using `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. URL
//! construction, authentication headers, request bodies, and the mapping of
//! HTTP statuses onto [`media::RemoteError`] are handled here; the [`media`]
//! crate never sees them.
//!
//! ## Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | `check_repository` | `GET /repos/{owner}/{repo}` |
//! | `find_image` | `GET /repos/{owner}/{repo}/contents/{path}?ref={branch}` |
//! | `upload_image` | `PUT /repos/{owner}/{repo}/contents/{path}` |
//! | `delete_image` | `DELETE /repos/{owner}/{repo}/contents/{path}` |
//!
//! Nothing is retried; rate-limit responses surface as [`media::RemoteError::Api`].

mod client;
mod wire;

pub use client::{GithubContentsClient, DEFAULT_API_BASE};
