//! Configuration types for ghpkg.
//!
//! Every struct implements [`Default`] with the same values as the embedded
//! `defaults.toml`, so a bare `[section]` header produces a working
//! configuration.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub, raw-content and proxy endpoints plus credentials.
    pub github: GitHubSection,
    /// Org and repo allow/deny lists.
    pub packages: PackagesSection,
    /// Target platform identity used for search and manifests.
    pub target: TargetSection,
    /// On-disk snapshot cache.
    pub cache: CacheSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// GitHubSection
// ---------------------------------------------------------------------------

/// Endpoints, credentials and HTTP client settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GitHubSection {
    /// GitHub REST API root.
    pub api_root: String,
    /// Raw content root.
    pub raw_root: String,
    /// Caching proxy root. Proxy mode is used only when this is set.
    pub proxy_root: Option<String>,
    /// Force direct mode even when `proxy_root` is set.
    pub no_github_proxy: bool,
    /// Personal access token. Prefer `GITHUB_TOKEN` over storing it in a file.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl std::fmt::Debug for GitHubSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubSection")
            .field("api_root", &self.api_root)
            .field("raw_root", &self.raw_root)
            .field("proxy_root", &self.proxy_root)
            .field("no_github_proxy", &self.no_github_proxy)
            .field("has_token", &self.token.is_some())
            .field("user_agent", &self.user_agent)
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl Serialize for GitHubSection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("GitHubSection", 7)?;
        state.serialize_field("api_root", &self.api_root)?;
        state.serialize_field("raw_root", &self.raw_root)?;
        state.serialize_field("proxy_root", &self.proxy_root)?;
        state.serialize_field("no_github_proxy", &self.no_github_proxy)?;
        // token is intentionally omitted.
        state.serialize_field("user_agent", &self.user_agent)?;
        state.serialize_field("timeout_secs", &self.timeout_secs)?;
        state.serialize_field("connect_timeout_secs", &self.connect_timeout_secs)?;
        state.end()
    }
}

impl Default for GitHubSection {
    fn default() -> Self {
        Self {
            api_root: "https://api.github.com".to_owned(),
            raw_root: "https://raw.githubusercontent.com".to_owned(),
            proxy_root: None,
            no_github_proxy: false,
            token: None,
            user_agent: "ghpkg".to_owned(),
            timeout_secs: 60,
            connect_timeout_secs: 15,
        }
    }
}

impl GitHubSection {
    /// Whether repository data should come from the proxy.
    #[must_use]
    pub fn use_proxy(&self) -> bool {
        !self.no_github_proxy && self.proxy_root.as_deref().is_some_and(|r| !r.is_empty())
    }
}

// ---------------------------------------------------------------------------
// PackagesSection
// ---------------------------------------------------------------------------

/// Allow and deny lists applied to every lookup, fetch and search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagesSection {
    /// Organizations whose repositories are never fetched.
    pub banned_orgs: Vec<String>,
    /// Individual `owner/repo` names that are never fetched.
    pub banned_repos: Vec<String>,
    /// Organizations whose repositories are approved.
    pub approved_orgs: Vec<String>,
    /// Individual approved `owner/repo` names.
    pub approved_repos: Vec<String>,
    /// Whether free-text search may show unapproved repositories.
    pub allow_unapproved: bool,
}

// ---------------------------------------------------------------------------
// TargetSection
// ---------------------------------------------------------------------------

/// The platform packages are resolved for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSection {
    /// Target identifier.
    pub id: String,
    /// Platform identifier used in search scoping; falls back to `id`.
    pub platform_id: Option<String>,
    /// Marker phrase package READMEs carry (`for {marker}/{platform}`).
    pub search_marker: String,
    /// Manifest file name inside each package repository.
    pub manifest_name: String,
}

impl Default for TargetSection {
    fn default() -> Self {
        Self {
            id: "core".to_owned(),
            platform_id: None,
            search_marker: "ghpkg".to_owned(),
            manifest_name: "ghpkg.json".to_owned(),
        }
    }
}

impl TargetSection {
    /// `platform_id` if set, else `id`.
    #[must_use]
    pub fn effective_platform_id(&self) -> &str {
        self.platform_id
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(&self.id)
    }
}

// ---------------------------------------------------------------------------
// CacheSection
// ---------------------------------------------------------------------------

/// Snapshot cache location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// Cache directory; `~/.ghpkg/cache` when unset.
    pub directory: Option<String>,
    /// Whether `fetch` reads and writes cached snapshots.
    pub enabled: bool,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            directory: None,
            enabled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Default log level (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
    /// Output format (`pretty`, `compact`, `json`, `full`).
    pub format: String,
    /// Per-crate directives, e.g. `ghpkg_core=debug`.
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}
