//! The resolver facade: settings, the HTTP seam, and request helpers.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{GitHubError, GitHubResult};
use crate::package::DEFAULT_MANIFEST_NAME;
use crate::transport::{
    DirectBackend, HttpRequest, HttpResponse, HttpTransport, Method, ProxyBackend, SourceBackend,
    TransportMode,
};

/// Default GitHub REST API root.
pub const DEFAULT_API_ROOT: &str = "https://api.github.com";

/// Default raw content root.
pub const DEFAULT_RAW_ROOT: &str = "https://raw.githubusercontent.com";

pub(crate) const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// What free-text search appends to every query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchScope {
    /// Marker phrase package READMEs carry, e.g. `ghpkg`.
    pub marker: String,
    /// Target platform identifier.
    pub platform_id: String,
}

impl Default for SearchScope {
    fn default() -> Self {
        Self {
            marker: "ghpkg".to_string(),
            platform_id: "core".to_string(),
        }
    }
}

/// Endpoints and credentials the client works with.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// GitHub REST API root.
    pub api_root: String,
    /// Raw content root.
    pub raw_root: String,
    /// Caching proxy root, if one is available.
    pub proxy_root: Option<String>,
    /// Force direct mode even when a proxy root is configured.
    pub no_github_proxy: bool,
    /// Personal access token.
    pub token: Option<String>,
    /// Manifest file name inside each package repository.
    pub manifest_name: String,
    /// Free-text search scoping.
    pub search: SearchScope,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_root: DEFAULT_API_ROOT.to_string(),
            raw_root: DEFAULT_RAW_ROOT.to_string(),
            proxy_root: None,
            no_github_proxy: false,
            token: None,
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
            search: SearchScope::default(),
        }
    }
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("api_root", &self.api_root)
            .field("raw_root", &self.raw_root)
            .field("proxy_root", &self.proxy_root)
            .field("no_github_proxy", &self.no_github_proxy)
            .field("has_token", &self.token.is_some())
            .field("manifest_name", &self.manifest_name)
            .field("search", &self.search)
            .finish()
    }
}

/// Entry point for every network operation.
///
/// Cheap to clone; holds no mutable state.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    settings: Arc<ClientSettings>,
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("settings", &self.settings)
            .field("mode", &self.mode())
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Create a client over a `reqwest` transport.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::ClientBuild`] if the HTTP client cannot be built.
    #[cfg(feature = "http")]
    pub fn new(
        settings: ClientSettings,
        options: &crate::transport::http::TransportOptions,
    ) -> GitHubResult<Self> {
        let transport = crate::transport::http::ReqwestTransport::new(options)?;
        Ok(Self::with_transport(settings, Arc::new(transport)))
    }

    /// Create a client over any transport.
    #[must_use]
    pub fn with_transport(settings: ClientSettings, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            settings: Arc::new(settings),
        }
    }

    /// Active settings.
    #[must_use]
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Whether repository data comes from the caching proxy.
    #[must_use]
    pub fn use_proxy(&self) -> bool {
        self.proxy_root().is_some()
    }

    /// The strategy [`backend`](Self::backend) selects.
    #[must_use]
    pub fn mode(&self) -> TransportMode {
        if self.use_proxy() {
            TransportMode::Proxy
        } else {
            TransportMode::Direct
        }
    }

    /// The source strategy for this call.
    #[must_use]
    pub fn backend(&self) -> Box<dyn SourceBackend + '_> {
        match self.proxy_root() {
            Some(root) => Box::new(ProxyBackend::new(self, root)),
            None => Box::new(DirectBackend::new(self)),
        }
    }

    fn proxy_root(&self) -> Option<&str> {
        if self.settings.no_github_proxy {
            return None;
        }
        self.settings
            .proxy_root
            .as_deref()
            .map(|root| root.trim_end_matches('/'))
            .filter(|root| !root.is_empty())
    }

    fn api_root(&self) -> &str {
        self.settings.api_root.trim_end_matches('/')
    }

    fn raw_root(&self) -> &str {
        self.settings.raw_root.trim_end_matches('/')
    }

    /// `{api_root}/{path}`.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_root(), path.trim_start_matches('/'))
    }

    /// `{proxy_root}/gh/{path}`, when a proxy is in use.
    #[must_use]
    pub fn proxy_url(&self, path: &str) -> Option<String> {
        self.proxy_root()
            .map(|root| format!("{root}/gh/{}", path.trim_start_matches('/')))
    }

    /// `{raw_root}/{full_name}/{sha}/{path}`.
    #[must_use]
    pub fn raw_url(&self, full_name: &str, sha: &str, path: &str) -> String {
        format!("{}/{full_name}/{sha}/{path}", self.raw_root())
    }

    /// Accept a server-supplied URL only if it lies under the API root.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::UntrustedUrl`] for anything else, including
    /// URLs that do not parse.
    pub fn trusted_api_url(&self, candidate: &str) -> GitHubResult<String> {
        let untrusted = || GitHubError::UntrustedUrl {
            url: candidate.to_string(),
        };
        let base = Url::parse(self.api_root()).map_err(|_| untrusted())?;
        let url = Url::parse(candidate).map_err(|_| untrusted())?;

        let same_origin = url.scheme() == base.scheme()
            && url.host_str() == base.host_str()
            && url.port_or_known_default() == base.port_or_known_default();
        let base_path = base.path().trim_end_matches('/');
        let under_base = url
            .path()
            .strip_prefix(base_path)
            .is_some_and(|rest| rest.starts_with('/'));

        if same_origin && under_base {
            Ok(url.into())
        } else {
            Err(untrusted())
        }
    }

    /// A request carrying the headers appropriate for its destination.
    ///
    /// API requests get the v3 `Accept` header. The token is only attached
    /// to API and raw-content requests, never to the proxy.
    #[must_use]
    pub fn request(&self, method: Method, url: &str) -> HttpRequest {
        let mut request = HttpRequest::new(method, url);
        let is_api = is_under(url, self.api_root());
        if is_api {
            request = request.with_header("Accept", GITHUB_ACCEPT);
        }
        if let Some(token) = self.settings.token.as_deref().filter(|t| !t.is_empty())
            && (is_api || is_under(url, self.raw_root()))
        {
            request = request.with_header("Authorization", format!("token {token}"));
        }
        request
    }

    /// Send a request as-is.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::Transport`] when no response was received.
    pub async fn send(&self, request: HttpRequest) -> GitHubResult<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "HTTP request");
        self.transport.send(request).await
    }

    /// `GET` a URL and require a 2xx status.
    ///
    /// # Errors
    ///
    /// Transport failures and [`GitHubError::Http`] for non-2xx answers.
    pub async fn get_ok(&self, url: &str) -> GitHubResult<HttpResponse> {
        self.send(self.request(Method::Get, url))
            .await?
            .error_for_status(url)
    }

    /// `GET` a URL and decode its JSON body.
    ///
    /// # Errors
    ///
    /// As [`get_ok`](Self::get_ok), plus [`GitHubError::InvalidResponse`].
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> GitHubResult<T> {
        self.get_ok(url).await?.json(url)
    }

    /// `GET` a URL and return its body text.
    ///
    /// # Errors
    ///
    /// As [`get_ok`](Self::get_ok).
    pub async fn get_text(&self, url: &str) -> GitHubResult<String> {
        Ok(self.get_ok(url).await?.body)
    }
}

fn is_under(url: &str, root: &str) -> bool {
    url.strip_prefix(root)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct NoTransport;

    #[async_trait]
    impl HttpTransport for NoTransport {
        async fn send(&self, request: HttpRequest) -> GitHubResult<HttpResponse> {
            Err(GitHubError::Transport {
                url: request.url,
                message: "offline".into(),
            })
        }
    }

    fn client(settings: ClientSettings) -> GitHubClient {
        GitHubClient::with_transport(settings, Arc::new(NoTransport))
    }

    #[test]
    fn defaults_select_direct_mode() {
        let c = client(ClientSettings::default());
        assert!(!c.use_proxy());
        assert_eq!(c.mode(), TransportMode::Direct);
        assert_eq!(c.backend().mode(), TransportMode::Direct);
    }

    #[test]
    fn proxy_root_selects_proxy_unless_disabled() {
        let mut settings = ClientSettings {
            proxy_root: Some("https://proxy.example.com/api/".into()),
            ..ClientSettings::default()
        };
        let c = client(settings.clone());
        assert_eq!(c.backend().mode(), TransportMode::Proxy);
        assert_eq!(
            c.proxy_url("gh-owner/repo/refs").as_deref(),
            Some("https://proxy.example.com/api/gh/gh-owner/repo/refs")
        );

        settings.no_github_proxy = true;
        let c = client(settings);
        assert_eq!(c.mode(), TransportMode::Direct);
        assert_eq!(c.proxy_url("x"), None);
    }

    #[test]
    fn url_builders() {
        let c = client(ClientSettings::default());
        assert_eq!(c.api_url("/repos/a/b"), "https://api.github.com/repos/a/b");
        assert_eq!(
            c.raw_url("a/b", "abc", "ghpkg.json"),
            "https://raw.githubusercontent.com/a/b/abc/ghpkg.json"
        );
    }

    #[test]
    fn trusted_url_must_stay_under_api_root() {
        let c = client(ClientSettings::default());
        assert!(c.trusted_api_url("https://api.github.com/repos/a/b/git/tags/1").is_ok());
        for bad in [
            "https://evil.example.com/repos/a/b/git/tags/1",
            "http://api.github.com/repos/a/b",
            "https://api.github.com.evil.com/x",
            "https://api.github.com:8443/x",
            "not a url",
        ] {
            assert!(
                matches!(c.trusted_api_url(bad), Err(GitHubError::UntrustedUrl { .. })),
                "url: {bad}"
            );
        }
    }

    #[test]
    fn token_only_goes_to_github_hosts() {
        let c = client(ClientSettings {
            token: Some("secret".into()),
            proxy_root: Some("https://proxy.example.com".into()),
            ..ClientSettings::default()
        });
        let api = c.request(Method::Get, "https://api.github.com/repos/a/b");
        assert_eq!(api.header("authorization"), Some("token secret"));
        assert_eq!(api.header("accept"), Some(GITHUB_ACCEPT));

        let raw = c.request(Method::Get, "https://raw.githubusercontent.com/a/b/s/f");
        assert_eq!(raw.header("authorization"), Some("token secret"));
        assert_eq!(raw.header("accept"), None);

        let proxy = c.request(Method::Get, "https://proxy.example.com/gh/a/b");
        assert_eq!(proxy.header("authorization"), None);

        let lookalike = c.request(Method::Get, "https://api.github.com.evil.com/x");
        assert_eq!(lookalike.header("authorization"), None);
    }

    #[test]
    fn debug_redacts_token() {
        let settings = ClientSettings {
            token: Some("ghp_supersecret".into()),
            ..ClientSettings::default()
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("ghp_supersecret"));
        assert!(rendered.contains("has_token: true"));
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let c = client(ClientSettings::default());
        let err = c.get_text("https://api.github.com/x").await.unwrap_err();
        assert!(matches!(err, GitHubError::Transport { .. }));
    }
}
