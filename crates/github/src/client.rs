//! `reqwest`-backed [`RemoteImageStore`].

use async_trait::async_trait;
use base64::Engine as _;
use media::{
    CommitSha, ContentPath, ContentSha, GithubConfig, RemoteError, RemoteImageStore, UploadedImage,
};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use tracing::{debug, instrument};

use crate::wire::{
    ApiErrorBody, ContentEntry, DeleteContentRequest, PutContentRequest, WriteResponse,
};

/// Base URL of the public GitHub REST API.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const CLIENT_NAME: &str = concat!("article-images/", env!("CARGO_PKG_VERSION"));

/// GitHub Contents API client.
///
/// Stateless apart from the connection pool; credentials come from the
/// [`GithubConfig`] passed to each call.
#[derive(Debug, Clone)]
pub struct GithubContentsClient {
    http: Client,
    api_base: Url,
}

impl GithubContentsClient {
    /// Creates a client for the public GitHub API.
    pub fn new() -> Result<Self, RemoteError> {
        Self::with_api_base(DEFAULT_API_BASE)
    }

    /// Creates a client for the API rooted at `api_base` (e.g. a GitHub Enterprise host).
    pub fn with_api_base(api_base: &str) -> Result<Self, RemoteError> {
        let url = Url::parse(api_base)
            .map_err(|e| RemoteError::InvalidRequest(format!("invalid API base URL {api_base:?}: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(RemoteError::InvalidRequest(format!(
                "API base URL {api_base:?} cannot carry a path"
            )));
        }
        let http = Client::builder()
            .build()
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        Ok(Self { http, api_base: url })
    }

    /// The API root this client talks to.
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.api_base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                RemoteError::InvalidRequest("API base URL cannot carry a path".to_string())
            })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    fn repository_url(&self, config: &GithubConfig) -> Result<Url, RemoteError> {
        self.endpoint(&["repos", config.owner.as_str(), config.repo.as_str()])
    }

    // Each path segment is percent-encoded separately so `/` keeps its meaning.
    fn contents_url(&self, config: &GithubConfig, path: &ContentPath) -> Result<Url, RemoteError> {
        let mut segments = vec!["repos", config.owner.as_str(), config.repo.as_str(), "contents"];
        segments.extend(path.as_str().split('/').filter(|s| !s.is_empty()));
        self.endpoint(&segments)
    }

    fn request(&self, method: Method, url: Url, config: &GithubConfig) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&config.token)
            .header(ACCEPT, MEDIA_TYPE)
            .header(USER_AGENT, CLIENT_NAME)
            .header(API_VERSION_HEADER, API_VERSION)
    }
}

async fn send(request: RequestBuilder) -> Result<Response, RemoteError> {
    request
        .send()
        .await
        .map_err(|e| RemoteError::Network(e.without_url().to_string()))
}

/// Reads the `message` of an error body, falling back to the status reason.
async fn api_message(response: Response) -> String {
    let status = response.status();
    match response.json::<ApiErrorBody>().await {
        Ok(body) if !body.message.is_empty() => body.message,
        _ => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}

/// Maps a non-success response onto 401 / 404 / everything else.
async fn status_error(response: Response) -> RemoteError {
    match response.status() {
        StatusCode::UNAUTHORIZED => RemoteError::Auth,
        StatusCode::NOT_FOUND => RemoteError::NotFound,
        status => RemoteError::Api {
            status: status.as_u16(),
            message: api_message(response).await,
        },
    }
}

/// Maps a non-success write response onto 401 / everything else.
///
/// A 404 here means a missing branch or path, not a missing repository.
async fn write_error(response: Response) -> RemoteError {
    match response.status() {
        StatusCode::UNAUTHORIZED => RemoteError::Auth,
        _ => api_error(response).await,
    }
}

/// Maps any non-success response onto [`RemoteError::Api`].
async fn api_error(response: Response) -> RemoteError {
    let status = response.status().as_u16();
    RemoteError::Api {
        status,
        message: api_message(response).await,
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    response
        .json::<T>()
        .await
        .map_err(|e| RemoteError::Decode(e.without_url().to_string()))
}

#[async_trait]
impl RemoteImageStore for GithubContentsClient {
    #[instrument(skip(self, config), fields(owner = %config.owner, repo = %config.repo))]
    async fn check_repository(&self, config: &GithubConfig) -> Result<(), RemoteError> {
        let url = self.repository_url(config)?;
        let response = send(self.request(Method::GET, url, config)).await?;
        debug!(status = %response.status(), "Repository check answered");
        if response.status().is_success() {
            Ok(())
        } else {
            Err(status_error(response).await)
        }
    }

    #[instrument(skip(self, config), fields(path = %path))]
    async fn find_image(
        &self,
        config: &GithubConfig,
        path: &ContentPath,
    ) -> Result<Option<ContentSha>, RemoteError> {
        let mut url = self.contents_url(config, path)?;
        url.query_pairs_mut().append_pair("ref", &config.branch);
        let response = send(self.request(Method::GET, url, config)).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let entry: ContentEntry = decode(response).await?;
                Ok(ContentSha::new(entry.sha))
            }
            _ => Err(status_error(response).await),
        }
    }

    #[instrument(skip(self, config, content, existing), fields(path = %path, bytes = content.len()))]
    async fn upload_image(
        &self,
        config: &GithubConfig,
        path: &ContentPath,
        content: &[u8],
        message: &str,
        existing: Option<&ContentSha>,
    ) -> Result<UploadedImage, RemoteError> {
        let url = self.contents_url(config, path)?;
        let body = PutContentRequest {
            message,
            content: base64::engine::general_purpose::STANDARD.encode(content),
            branch: &config.branch,
            sha: existing.map(ContentSha::as_str),
        };
        let response = send(self.request(Method::PUT, url, config).json(&body)).await?;
        if !response.status().is_success() {
            return Err(write_error(response).await);
        }

        let written: WriteResponse = decode(response).await?;
        let content = written
            .content
            .ok_or_else(|| RemoteError::Decode("upload response has no content".to_string()))?;
        let url = content
            .download_url
            .or(content.html_url)
            .ok_or_else(|| RemoteError::Decode("upload response has no URL".to_string()))?;
        let sha = ContentSha::new(content.sha)
            .ok_or_else(|| RemoteError::Decode("upload response has an empty sha".to_string()))?;
        let commit = CommitSha::new(written.commit.sha)
            .ok_or_else(|| RemoteError::Decode("upload response has an empty commit".to_string()))?;
        debug!(%sha, %commit, "Image uploaded");
        Ok(UploadedImage { sha, url, commit })
    }

    #[instrument(skip(self, config, sha), fields(path = %path))]
    async fn delete_image(
        &self,
        config: &GithubConfig,
        path: &ContentPath,
        sha: &ContentSha,
        message: &str,
    ) -> Result<CommitSha, RemoteError> {
        let url = self.contents_url(config, path)?;
        let body = DeleteContentRequest {
            message,
            sha: sha.as_str(),
            branch: &config.branch,
        };
        let response = send(self.request(Method::DELETE, url, config).json(&body)).await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let written: WriteResponse = decode(response).await?;
        let commit = CommitSha::new(written.commit.sha)
            .ok_or_else(|| RemoteError::Decode("delete response has an empty commit".to_string()))?;
        debug!(%commit, "Image deleted");
        Ok(commit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GithubConfig {
        GithubConfig {
            owner: "octo".into(),
            repo: "blog".into(),
            token: "t".into(),
            ..GithubConfig::default()
        }
    }

    #[test]
    fn contents_url_encodes_each_segment() {
        let client = GithubContentsClient::new().unwrap();
        let path = ContentPath::new("images/post-1/my photo.png").unwrap();
        let url = client.contents_url(&config(), &path).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/octo/blog/contents/images/post-1/my%20photo.png"
        );
    }

    #[test]
    fn api_base_with_path_prefix_is_kept() {
        let client = GithubContentsClient::with_api_base("https://ghe.example.com/api/v3/").unwrap();
        let url = client.repository_url(&config()).unwrap();
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/repos/octo/blog");
    }

    #[test]
    fn unusable_api_base_is_rejected() {
        assert!(matches!(
            GithubContentsClient::with_api_base("not a url"),
            Err(RemoteError::InvalidRequest(_))
        ));
        assert!(matches!(
            GithubContentsClient::with_api_base("mailto:someone@example.com"),
            Err(RemoteError::InvalidRequest(_))
        ));
    }
}
