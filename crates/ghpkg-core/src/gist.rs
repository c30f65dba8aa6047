//! Private gist publishing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::client::{GITHUB_ACCEPT, GitHubClient};
use crate::error::{GitHubError, GitHubResult};
use crate::package::PackageSnapshot;
use crate::transport::{HttpRequest, Method};
use crate::types::GistResponse;

/// One gist file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GistFile {
    /// File content.
    pub content: String,
}

impl GistFile {
    /// A file with the given content.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Everything needed to create or update a gist.
#[derive(Clone, Default)]
pub struct GistRequest {
    /// Personal access token with the `gist` scope.
    pub token: Option<String>,
    /// Always create a new gist, even if `current_gist_id` is set.
    pub force_new: bool,
    /// File name to content.
    pub files: BTreeMap<String, GistFile>,
    /// Gist description.
    pub name: String,
    /// Gist to update.
    pub current_gist_id: Option<String>,
}

impl std::fmt::Debug for GistRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GistRequest")
            .field("has_token", &self.token.is_some())
            .field("force_new", &self.force_new)
            .field("files", &self.files.keys().collect::<Vec<_>>())
            .field("name", &self.name)
            .field("current_gist_id", &self.current_gist_id)
            .finish()
    }
}

impl GistRequest {
    /// The token, unless absent or empty.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    /// The gist to update, if this request updates rather than creates.
    ///
    /// Updating needs an existing id and a token, and no `force_new`.
    #[must_use]
    pub fn update_target(&self) -> Option<&str> {
        if self.force_new || self.token().is_none() {
            return None;
        }
        self.current_gist_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Every file of a snapshot as gist files.
#[must_use]
pub fn gist_files_from_snapshot(snapshot: &PackageSnapshot) -> BTreeMap<String, GistFile> {
    snapshot
        .files()
        .iter()
        .map(|(path, content)| (path.clone(), GistFile::new(content.clone())))
        .collect()
}

impl GitHubClient {
    /// Create or update a private gist and return its id.
    ///
    /// # Errors
    ///
    /// - [`GitHubError::GistNotFound`] when the gist to update does not exist
    /// - [`GitHubError::AuthScope`] when creation is refused with 404, which
    ///   GitHub does for tokens lacking the `gist` scope
    /// - [`GitHubError::GistRejected`] for any other refusal
    pub async fn publish_gist(&self, request: &GistRequest) -> GitHubResult<String> {
        let target = request.update_target();
        let (method, url) = match target {
            Some(id) => (Method::Patch, self.api_url(&format!("gists/{id}"))),
            None => (Method::Post, self.api_url("gists")),
        };

        let body = json!({
            "description": request.name,
            "public": false,
            "files": request.files,
        });
        let mut http = HttpRequest::new(method, url.as_str())
            .with_header("Accept", GITHUB_ACCEPT)
            .with_json(body);
        if let Some(token) = request.token() {
            http = http.with_header("Authorization", format!("token {token}"));
        }

        let response = self.send(http).await?;
        if matches!(response.status, 200 | 201) {
            let parsed: GistResponse = response.json(&url)?;
            if let Some(id) = parsed.id.filter(|id| !id.is_empty()) {
                info!(gist = %id, %method, files = request.files.len(), "published gist");
                return Ok(id);
            }
        }

        Err(match (response.status, target) {
            (404, Some(id)) => GitHubError::GistNotFound { id: id.to_string() },
            (404, None) => GitHubError::AuthScope {
                message: format!(
                    "Make sure to add the ``gist`` scope to your token. {}",
                    response.body
                ),
            },
            (status, _) => GitHubError::GistRejected {
                status,
                body: response.body,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(token: Option<&str>, id: Option<&str>, force_new: bool) -> GistRequest {
        GistRequest {
            token: token.map(String::from),
            force_new,
            current_gist_id: id.map(String::from),
            ..GistRequest::default()
        }
    }

    #[test]
    fn update_needs_id_token_and_no_force() {
        assert_eq!(request(Some("t"), Some("g1"), false).update_target(), Some("g1"));
        assert_eq!(request(Some("t"), Some("g1"), true).update_target(), None);
        assert_eq!(request(None, Some("g1"), false).update_target(), None);
        assert_eq!(request(Some("t"), None, false).update_target(), None);
    }

    #[test]
    fn empty_token_counts_as_missing() {
        let req = request(Some(""), Some("g1"), false);
        assert_eq!(req.token(), None);
        assert_eq!(req.update_target(), None);
    }

    #[test]
    fn snapshot_files_become_gist_files() {
        let mut files = BTreeMap::new();
        files.insert("main.ts".to_string(), "let x = 1".to_string());
        let snapshot = PackageSnapshot::new("abc", files);
        let gist = gist_files_from_snapshot(&snapshot);
        assert_eq!(gist.get("main.ts"), Some(&GistFile::new("let x = 1")));
    }

    #[test]
    fn debug_hides_token() {
        let rendered = format!("{:?}", request(Some("ghp_secret"), None, false));
        assert!(!rendered.contains("ghp_secret"));
    }
}
