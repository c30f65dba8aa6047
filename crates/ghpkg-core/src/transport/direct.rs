//! GitHub REST API plus raw-content strategy.

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::{debug, info};

use super::{RepoMetadata, SourceBackend, TransportMode};
use crate::client::GitHubClient;
use crate::error::{GitHubError, GitHubResult};
use crate::identifier::RepoIdentifier;
use crate::package::{PackageManifest, PackageSnapshot};
use crate::refs::{RefsSnapshot, strip_ref_prefix};
use crate::types::{GitRef, OneOrMany, Repo};

/// Talks to the REST API for metadata and refs, and to the raw-content host
/// for files.
pub struct DirectBackend<'a> {
    client: &'a GitHubClient,
}

impl<'a> DirectBackend<'a> {
    /// Direct strategy over `client`.
    #[must_use]
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    async fn fetch_manifest_at(&self, full_name: &str, sha: &str) -> GitHubResult<(String, PackageManifest)> {
        let manifest_name = self.client.settings().manifest_name.as_str();
        let url = self.client.raw_url(full_name, sha, manifest_name);
        let text = self.client.get_text(&url).await?;
        let manifest = PackageManifest::parse(manifest_name, &text)?;
        Ok((text, manifest))
    }
}

#[async_trait]
impl SourceBackend for DirectBackend<'_> {
    fn mode(&self) -> TransportMode {
        TransportMode::Direct
    }

    async fn repo_metadata(&self, id: &RepoIdentifier) -> GitHubResult<Option<RepoMetadata>> {
        let url = self.client.api_url(&format!("repos/{}", id.full_name));
        let repo: Repo = match self.client.get_json(&url).await {
            Ok(repo) => repo,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        let found = RepoIdentifier::from_full_name(&repo.full_name, None);
        Ok(Some(RepoMetadata {
            owner: found.owner,
            full_name: found.full_name,
            name: repo.name,
            description: repo.description.unwrap_or_default(),
            default_branch: repo.default_branch,
        }))
    }

    async fn list_refs(&self, full_name: &str, namespace: &str) -> GitHubResult<RefsSnapshot> {
        let url = self
            .client
            .api_url(&format!("repos/{full_name}/git/refs/{namespace}/?per_page=100"));
        let listing: OneOrMany<GitRef> = match self.client.get_json(&url).await {
            Ok(listing) => listing,
            Err(e) if e.is_not_found() => return Ok(RefsSnapshot::empty()),
            Err(e) => return Err(e),
        };
        let refs: Vec<(String, String)> = listing
            .into_vec()
            .into_iter()
            .map(|r| (strip_ref_prefix(&r.name).to_string(), r.object.sha))
            .collect();
        debug!(repo = full_name, namespace, count = refs.len(), "listed refs");
        Ok(RefsSnapshot::new(refs, None))
    }

    async fn fetch_files(
        &self,
        id: &RepoIdentifier,
        previous: Option<&PackageSnapshot>,
    ) -> GitHubResult<PackageSnapshot> {
        let sha = self
            .client
            .resolve_tag_or_sha(&id.full_name, id.tag_or_default())
            .await?;

        if let Some(previous) = previous.filter(|p| p.sha() == sha) {
            debug!(repo = %id.full_name, sha = %sha, "package unchanged, reusing snapshot");
            return Ok(previous.clone());
        }

        info!(repo = %id.full_name, sha = %sha, "downloading package");
        let mut staging = PackageSnapshot::empty();
        let (manifest_text, manifest) = self.fetch_manifest_at(&id.full_name, &sha).await?;
        staging.insert_file(self.client.settings().manifest_name.clone(), manifest_text);

        let downloads = manifest.declared_files().map(|path| {
            let url = self.client.raw_url(&id.full_name, &sha, path);
            async move {
                let text = self.client.get_text(&url).await?;
                Ok::<_, GitHubError>((path.clone(), text))
            }
        });
        for (path, text) in try_join_all(downloads).await? {
            staging.insert_file(path, text);
        }

        Ok(staging.seal(sha))
    }

    async fn manifest(&self, id: &RepoIdentifier) -> GitHubResult<PackageManifest> {
        let sha = self
            .client
            .resolve_tag_or_sha(&id.full_name, id.tag_or_default())
            .await?;
        let (_, manifest) = self.fetch_manifest_at(&id.full_name, &sha).await?;
        Ok(manifest)
    }
}
