//! Request and response bodies of the Contents API.

use serde::{Deserialize, Serialize};

/// Error body returned with every non-success status.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}

/// `GET /contents/{path}` for a file.
#[derive(Debug, Deserialize)]
pub(crate) struct ContentEntry {
    pub sha: String,
}

/// `PUT` and `DELETE /contents/{path}` success body.
#[derive(Debug, Deserialize)]
pub(crate) struct WriteResponse {
    /// `null` after a delete.
    #[serde(default)]
    pub content: Option<WrittenContent>,
    pub commit: CommitRef,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WrittenContent {
    pub sha: String,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitRef {
    pub sha: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PutContentRequest<'a> {
    pub message: &'a str,
    /// Base64 of the file bytes.
    pub content: String,
    pub branch: &'a str,
    /// Required when replacing an existing file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteContentRequest<'a> {
    pub message: &'a str,
    pub sha: &'a str,
    pub branch: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_response_with_null_content_decodes() {
        let body = r#"{"content":null,"commit":{"sha":"7638417db6d59f3c431d3e1f261cc637155684cd"}}"#;
        let parsed: WriteResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.content.is_none());
        assert_eq!(parsed.commit.sha, "7638417db6d59f3c431d3e1f261cc637155684cd");
    }

    #[test]
    fn put_request_omits_sha_for_new_files() {
        let body = PutContentRequest {
            message: "Upload image a.png",
            content: "aGVsbG8=".into(),
            branch: "main",
            sha: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("sha").is_none());
        assert_eq!(json["branch"], "main");
    }

    #[test]
    fn error_body_without_message_decodes_to_empty() {
        let parsed: ApiErrorBody = serde_json::from_str("{}").unwrap();
        assert!(parsed.message.is_empty());
    }
}
