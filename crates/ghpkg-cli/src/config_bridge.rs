//! Bridge from `ghpkg_config::Config` to the types the resolver and the
//! logger take.

use std::path::PathBuf;
use std::time::Duration;

use ghpkg_config::Config;
use ghpkg_core::{ClientSettings, PolicyConfig, SearchScope, TransportOptions};
use ghpkg_telemetry::{LogConfig, LogFormat};

/// Convert config to [`ClientSettings`].
pub(crate) fn to_client_settings(cfg: &Config) -> ClientSettings {
    ClientSettings {
        api_root: cfg.github.api_root.clone(),
        raw_root: cfg.github.raw_root.clone(),
        proxy_root: cfg.github.proxy_root.clone().filter(|p| !p.is_empty()),
        no_github_proxy: cfg.github.no_github_proxy,
        token: cfg.github.token.clone().filter(|t| !t.is_empty()),
        manifest_name: cfg.target.manifest_name.clone(),
        search: SearchScope {
            marker: cfg.target.search_marker.clone(),
            platform_id: cfg.target.effective_platform_id().to_string(),
        },
    }
}

/// Convert config to [`TransportOptions`].
pub(crate) fn to_transport_options(cfg: &Config) -> TransportOptions {
    TransportOptions {
        user_agent: format!("{}/{}", cfg.github.user_agent, env!("CARGO_PKG_VERSION")),
        timeout: Duration::from_secs(cfg.github.timeout_secs),
        connect_timeout: Duration::from_secs(cfg.github.connect_timeout_secs),
    }
}

/// Convert config to [`PolicyConfig`].
pub(crate) fn to_policy_config(cfg: &Config) -> PolicyConfig {
    let p = &cfg.packages;
    PolicyConfig {
        banned_orgs: p.banned_orgs.clone(),
        banned_repos: p.banned_repos.clone(),
        approved_orgs: p.approved_orgs.clone(),
        approved_repos: p.approved_repos.clone(),
        allow_unapproved: p.allow_unapproved,
    }
}

/// Convert config to [`LogConfig`].
pub(crate) fn to_log_config(cfg: &Config) -> LogConfig {
    let format = cfg.logging.format.parse().unwrap_or(LogFormat::Compact);

    let mut log_config = LogConfig::new(&cfg.logging.level).with_format(format);
    for directive in &cfg.logging.directives {
        log_config = log_config.with_directive(directive);
    }
    log_config
}

/// Snapshot cache directory: `cache.directory`, else `~/.ghpkg/cache`.
///
/// `None` when caching is disabled or no home directory is known.
pub(crate) fn cache_dir(cfg: &Config) -> Option<PathBuf> {
    if !cfg.cache.enabled {
        return None;
    }
    match cfg.cache.directory.as_deref().filter(|d| !d.is_empty()) {
        Some(dir) => Some(PathBuf::from(dir)),
        None => ghpkg_config::loader::ghpkg_home().ok().map(|h| h.join("cache")),
    }
}
