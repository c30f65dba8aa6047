//! `reqwest`-backed [`HttpTransport`].

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{HttpRequest, HttpResponse, HttpTransport, Method};
use crate::error::{GitHubError, GitHubResult};

/// Default HTTP request timeout (60 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default connection timeout (15 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 10;

/// Client construction options.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// `User-Agent` header; GitHub rejects requests without one.
    pub user_agent: String,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            user_agent: concat!("ghpkg/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// [`HttpTransport`] over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::ClientBuild`] if the TLS backend or client
    /// cannot be initialized.
    pub fn new(options: &TransportOptions) -> GitHubResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(options.user_agent.clone())
            .timeout(options.timeout)
            .connect_timeout(options.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| GitHubError::ClientBuild(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> GitHubResult<HttpResponse> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
        };
        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let transport_err = |e: reqwest::Error| GitHubError::Transport {
            url: request.url.clone(),
            message: e.to_string(),
        };
        let response = builder.send().await.map_err(transport_err)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_err)?;

        debug!(method = %request.method, url = %request.url, status, "HTTP response");
        Ok(HttpResponse { status, body })
    }
}
