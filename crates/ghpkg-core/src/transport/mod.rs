//! HTTP seam and the two source strategies.
//!
//! [`HttpTransport`] is the raw request/response boundary; the `reqwest`
//! implementation lives in [`http`] and tests substitute a scripted mock.
//!
//! [`SourceBackend`] is the single interface the resolver talks to. Two
//! strategies implement it:
//! - [`ProxyBackend`]: a caching proxy answering bulk requests
//!   (`gh/{repo}`, `gh/{repo}/refs`, `gh/{repo}/{tag}/text`)
//! - [`DirectBackend`]: the GitHub REST API plus raw content downloads
//!
//! [`GitHubClient::backend`](crate::GitHubClient::backend) picks one per call.

mod direct;
#[cfg(feature = "http")]
pub mod http;
mod proxy;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::{GitHubError, GitHubResult};
use crate::identifier::RepoIdentifier;
use crate::package::{PackageManifest, PackageSnapshot};
use crate::refs::RefsSnapshot;

pub use direct::DirectBackend;
pub use proxy::ProxyBackend;

/// HTTP methods used against GitHub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PATCH`
    Patch,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Patch => write!(f, "PATCH"),
        }
    }
}

/// An outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Request method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    /// A `GET` request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// A request with no headers and no body.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Look up a header value (case-insensitive name).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A received response. Any status is a response; only failures to get
/// one at all are transport errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Body text.
    pub body: String,
}

impl HttpResponse {
    /// A response with the given status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fail with [`GitHubError::Http`] unless the status is 2xx.
    ///
    /// # Errors
    ///
    /// Returns the status, URL and body of a non-success response.
    pub fn error_for_status(self, url: &str) -> GitHubResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(GitHubError::Http {
                status: self.status,
                url: url.to_string(),
                body: self.body,
            })
        }
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::InvalidResponse`] if the body does not decode.
    pub fn json<T: DeserializeOwned>(&self, url: &str) -> GitHubResult<T> {
        serde_json::from_str(&self.body).map_err(|e| GitHubError::InvalidResponse {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

/// Sends HTTP requests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and return whatever the server answered.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::Transport`] when no response was received.
    async fn send(&self, request: HttpRequest) -> GitHubResult<HttpResponse>;
}

/// Which strategy serves repository data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Bulk requests against the caching proxy.
    Proxy,
    /// GitHub REST API and raw content.
    Direct,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Proxy => write!(f, "proxy"),
            Self::Direct => write!(f, "direct"),
        }
    }
}

/// Repository metadata before policy status is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoMetadata {
    /// Lowercased owner.
    pub owner: Option<String>,
    /// Lowercased `owner/repo`.
    pub full_name: String,
    /// Short name as cased on GitHub.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Default branch.
    pub default_branch: String,
}

/// Repository data source.
#[async_trait]
pub trait SourceBackend: Send + Sync {
    /// Which strategy this is.
    fn mode(&self) -> TransportMode;

    /// Look up repository metadata; `None` if the repository does not exist.
    async fn repo_metadata(&self, id: &RepoIdentifier) -> GitHubResult<Option<RepoMetadata>>;

    /// List refs under `refs/{namespace}/`, sorted by version order.
    async fn list_refs(&self, full_name: &str, namespace: &str) -> GitHubResult<RefsSnapshot>;

    /// Produce the current file snapshot, reusing `previous` when allowed.
    async fn fetch_files(
        &self,
        id: &RepoIdentifier,
        previous: Option<&PackageSnapshot>,
    ) -> GitHubResult<PackageSnapshot>;

    /// Fetch and parse only the package manifest.
    async fn manifest(&self, id: &RepoIdentifier) -> GitHubResult<PackageManifest>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_for_status_keeps_body() {
        let err = HttpResponse::new(500, "boom")
            .error_for_status("https://api.github.com/x")
            .unwrap_err();
        match err {
            GitHubError::Http { status, url, body } => {
                assert_eq!(status, 500);
                assert_eq!(url, "https://api.github.com/x");
                assert_eq!(body, "boom");
            },
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(HttpResponse::new(204, "").error_for_status("u").is_ok());
    }

    #[test]
    fn json_decode_failure_is_invalid_response() {
        let err = HttpResponse::new(200, "not json")
            .json::<serde_json::Value>("u")
            .unwrap_err();
        assert!(matches!(err, GitHubError::InvalidResponse { .. }));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = HttpRequest::get("u").with_header("Authorization", "token t");
        assert_eq!(req.header("authorization"), Some("token t"));
        assert_eq!(req.header("accept"), None);
    }
}
