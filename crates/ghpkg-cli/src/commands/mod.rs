//! Subcommand handlers.

pub(crate) mod config;
pub(crate) mod fetch;
pub(crate) mod gist;
pub(crate) mod refs;
pub(crate) mod repo;
pub(crate) mod search;

use anyhow::{Context as _, Result};
use serde::Serialize;

use ghpkg_config::Config;
use ghpkg_core::{GitHubClient, PolicyConfig, RepoIdentifier};

use crate::config_bridge;

/// Output format mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Pretty,
    Json,
}

/// Everything a network command needs, built once from the resolved config.
pub(crate) struct Context {
    pub(crate) client: GitHubClient,
    pub(crate) policy: PolicyConfig,
    pub(crate) config: Config,
    pub(crate) format: OutputFormat,
}

impl Context {
    pub(crate) fn new(config: Config, format: OutputFormat) -> Result<Self> {
        let client = GitHubClient::new(
            config_bridge::to_client_settings(&config),
            &config_bridge::to_transport_options(&config),
        )
        .context("failed to build HTTP client")?;
        tracing::debug!(mode = %client.mode(), "resolver ready");

        Ok(Self {
            client,
            policy: config_bridge::to_policy_config(&config),
            config,
            format,
        })
    }

    /// Proxy root for icon URLs, when the proxy is in use.
    pub(crate) fn proxy_root(&self) -> Option<&str> {
        let settings = self.client.settings();
        if self.client.use_proxy() {
            settings.proxy_root.as_deref()
        } else {
            None
        }
    }

    pub(crate) fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}

/// Parse a repository reference or fail with a readable message.
pub(crate) fn parse_ref(input: &str) -> Result<RepoIdentifier> {
    RepoIdentifier::parse(input)
        .with_context(|| format!("'{input}' is not a GitHub repository reference"))
}

/// Print `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
