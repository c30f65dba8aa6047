//! Resolver error types.

/// Errors from repository resolution, package fetching and gist publishing.
#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    /// The input does not match any recognized repository reference form.
    #[error("not a GitHub repository reference: '{input}'")]
    Unparsable {
        /// The rejected input.
        input: String,
    },

    /// A ref object is neither a commit nor a tag that dereferences to one.
    #[error("bad ref type '{kind}' (depth {depth})")]
    BadRefType {
        /// The object type GitHub reported.
        kind: String,
        /// 1 for the ref itself, 2 for the object behind an annotated tag.
        depth: u8,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Http {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
        /// Raw response body.
        body: String,
    },

    /// The request never produced a response.
    #[error("request to {url} failed: {message}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Underlying failure.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("invalid response from {url}: {message}")]
    InvalidResponse {
        /// Requested URL.
        url: String,
        /// Decode failure.
        message: String,
    },

    /// A URL handed back by the server points outside the configured API root.
    #[error("refusing to follow URL outside the API root: {url}")]
    UntrustedUrl {
        /// The rejected URL.
        url: String,
    },

    /// The package manifest is missing, malformed, or declares an unsafe path.
    #[error("manifest error at {path}: {message}")]
    Manifest {
        /// Manifest or declared file path.
        path: String,
        /// What is wrong with it.
        message: String,
    },

    /// The gist being updated does not exist.
    #[error("gist not found: {id}")]
    GistNotFound {
        /// The gist id that was targeted.
        id: String,
    },

    /// The token lacks the scope needed to create gists.
    #[error("{message}")]
    AuthScope {
        /// Advice including the server's response text.
        message: String,
    },

    /// Gist creation or update was rejected.
    #[error("gist request rejected ({status}): {body}")]
    GistRejected {
        /// Response status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl GitHubError {
    /// Whether this is an HTTP 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404, .. })
    }
}

/// Result type for resolver operations.
pub type GitHubResult<T> = Result<T, GitHubError>;
