//! Caching-proxy strategy.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{RepoMetadata, SourceBackend, TransportMode};
use crate::client::GitHubClient;
use crate::error::{GitHubError, GitHubResult};
use crate::identifier::{DEFAULT_TAG, RepoIdentifier};
use crate::package::{PackageManifest, PackageSnapshot, validate_package_path};
use crate::refs::RefsSnapshot;
use crate::types::{ProxyRefs, ProxyRepoMeta};

const HEAD: &str = "HEAD";

/// Serves repository data from `{proxy}/gh/...` bulk endpoints.
pub struct ProxyBackend<'a> {
    client: &'a GitHubClient,
    root: &'a str,
}

impl<'a> ProxyBackend<'a> {
    /// Proxy strategy rooted at `root` (no trailing slash).
    #[must_use]
    pub fn new(client: &'a GitHubClient, root: &'a str) -> Self {
        Self { client, root }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/gh/{path}", self.root)
    }

    async fn text_map(&self, id: &RepoIdentifier) -> GitHubResult<(String, BTreeMap<String, String>)> {
        let tag = id.tag_or_default().to_string();
        let url = self.url(&format!("{}/{tag}/text", id.full_name));
        let files: BTreeMap<String, String> = self.client.get_json(&url).await?;
        Ok((tag, files))
    }
}

#[async_trait]
impl SourceBackend for ProxyBackend<'_> {
    fn mode(&self) -> TransportMode {
        TransportMode::Proxy
    }

    async fn repo_metadata(&self, id: &RepoIdentifier) -> GitHubResult<Option<RepoMetadata>> {
        let url = self.url(&id.full_name);
        let meta: Option<ProxyRepoMeta> = match self.client.get_json(&url).await {
            Ok(meta) => meta,
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };
        Ok(meta.map(|meta| RepoMetadata {
            owner: id.owner.clone(),
            full_name: id.full_name.clone(),
            name: if meta.name.is_empty() {
                id.name().to_string()
            } else {
                meta.name
            },
            description: meta.description.unwrap_or_default(),
            default_branch: meta
                .default_branch
                .filter(|b| !b.is_empty())
                .unwrap_or_else(|| DEFAULT_TAG.to_string()),
        }))
    }

    async fn list_refs(&self, full_name: &str, namespace: &str) -> GitHubResult<RefsSnapshot> {
        let url = self.url(&format!("{full_name}/refs"));
        let listing: ProxyRefs = match self.client.get_json(&url).await {
            Ok(listing) => listing,
            Err(e) if e.is_not_found() => return Ok(RefsSnapshot::empty()),
            Err(e) => return Err(e),
        };

        let prefix = format!("refs/{namespace}/");
        let mut head = None;
        let mut refs = Vec::new();
        for (name, sha) in listing.refs {
            if name == HEAD {
                head = Some(sha);
            } else if let Some(stripped) = name.strip_prefix(&prefix) {
                refs.push((stripped.to_string(), sha));
            }
        }
        debug!(repo = full_name, namespace, count = refs.len(), "listed refs via proxy");
        Ok(RefsSnapshot::new(refs, head))
    }

    async fn fetch_files(
        &self,
        id: &RepoIdentifier,
        _previous: Option<&PackageSnapshot>,
    ) -> GitHubResult<PackageSnapshot> {
        let (tag, files) = self.text_map(id).await?;
        for path in files.keys() {
            validate_package_path(path)?;
        }
        info!(repo = %id.full_name, tag = %tag, files = files.len(), "downloaded package via proxy");
        Ok(PackageSnapshot::new(tag, files))
    }

    async fn manifest(&self, id: &RepoIdentifier) -> GitHubResult<PackageManifest> {
        let manifest_name = self.client.settings().manifest_name.as_str();
        let (_, files) = self.text_map(id).await?;
        let text = files.get(manifest_name).ok_or_else(|| GitHubError::Manifest {
            path: manifest_name.to_string(),
            message: format!("missing from {}", id.full_name),
        })?;
        PackageManifest::parse(manifest_name, text)
    }
}
