//! Scripted HTTP transport.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use ghpkg_core::{GitHubError, GitHubResult, HttpRequest, HttpResponse, HttpTransport, Method};

#[derive(Debug, Clone)]
enum Reply {
    Respond(HttpResponse),
    Fail(String),
}

#[derive(Debug, Default)]
struct MockState {
    /// Replies per `(method, url)`; the last reply of a route repeats.
    routes: HashMap<(Method, String), VecDeque<Reply>>,
    /// Every request received, in order.
    requests: Vec<HttpRequest>,
}

/// Mock implementation of [`HttpTransport`] for testing.
///
/// Responses are scripted per method and exact URL. A route with several
/// replies hands them out in order and keeps repeating the last one.
/// Unscripted requests get a GitHub-style 404.
///
/// Uses `std::sync::Mutex` internally so builder methods work without a
/// tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a mock with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, url: String, reply: Reply) {
        if let Ok(mut guard) = self.state.lock() {
            guard.routes.entry((method, url)).or_default().push_back(reply);
        }
    }

    /// Queue a response for `method url`.
    #[must_use]
    pub fn with_response(
        self,
        method: Method,
        url: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        self.push(
            method,
            url.into(),
            Reply::Respond(HttpResponse::new(status, body)),
        );
        self
    }

    /// Queue a `200` JSON response for `GET url`.
    #[must_use]
    pub fn with_get_json(self, url: impl Into<String>, body: serde_json::Value) -> Self {
        self.with_response(Method::Get, url, 200, body.to_string())
    }

    /// Queue a `200` text response for `GET url`.
    #[must_use]
    pub fn with_get_text(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.with_response(Method::Get, url, 200, body)
    }

    /// Queue a bodyless status for `GET url`.
    #[must_use]
    pub fn with_get_status(self, url: impl Into<String>, status: u16) -> Self {
        self.with_response(Method::Get, url, status, "")
    }

    /// Queue a transport failure (no response at all) for `method url`.
    #[must_use]
    pub fn with_failure(self, method: Method, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.push(method, url.into(), Reply::Fail(message.into()));
        self
    }

    /// All requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state
            .lock()
            .map(|guard| guard.requests.clone())
            .unwrap_or_default()
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.state.lock().map(|guard| guard.requests.len()).unwrap_or(0)
    }

    /// Number of requests whose URL starts with `prefix`.
    #[must_use]
    pub fn count_with_prefix(&self, prefix: &str) -> usize {
        self.state
            .lock()
            .map(|guard| {
                guard
                    .requests
                    .iter()
                    .filter(|r| r.url.starts_with(prefix))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Number of requests for exactly `method url`.
    #[must_use]
    pub fn count_for(&self, method: Method, url: &str) -> usize {
        self.state
            .lock()
            .map(|guard| {
                guard
                    .requests
                    .iter()
                    .filter(|r| r.method == method && r.url == url)
                    .count()
            })
            .unwrap_or(0)
    }

    /// The most recent request.
    #[must_use]
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.state
            .lock()
            .ok()
            .and_then(|guard| guard.requests.last().cloned())
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> GitHubResult<HttpResponse> {
        let url = request.url.clone();
        let mut guard = self.state.lock().map_err(|_| GitHubError::Transport {
            url: url.clone(),
            message: "mock state poisoned".to_string(),
        })?;
        let key = (request.method, url.clone());
        guard.requests.push(request);

        let reply = guard.routes.get_mut(&key).and_then(|queue| {
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        });
        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(message)) => Err(GitHubError::Transport { url, message }),
            None => Ok(HttpResponse::new(404, r#"{"message":"Not Found"}"#)),
        }
    }
}
