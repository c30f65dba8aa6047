//! Package snapshots and the manifest that declares their files.
//!
//! A [`PackageSnapshot`] pairs a resolved commit SHA with the full text of
//! every file the manifest declares. Snapshots are values: the fetcher reads
//! the caller's previous snapshot and returns a new one (or a clone of the
//! previous one on a cache hit). A non-empty SHA is only ever attached to a
//! complete file set, via [`PackageSnapshot::seal`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::GitHubClient;
use crate::error::{GitHubError, GitHubResult};
use crate::identifier::RepoIdentifier;
use crate::policy::{PolicyConfig, RepoStatus, classify};

/// Default manifest file name.
pub const DEFAULT_MANIFEST_NAME: &str = "ghpkg.json";

/// A package's files as of one resolved commit.
///
/// Deserializing checks what [`PackageSnapshot::seal`] would have: every
/// path is a safe package path and a SHA never comes with an empty file set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredSnapshot")]
pub struct PackageSnapshot {
    sha: String,
    files: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct StoredSnapshot {
    #[serde(default)]
    sha: String,
    #[serde(default)]
    files: BTreeMap<String, String>,
}

impl TryFrom<StoredSnapshot> for PackageSnapshot {
    type Error = GitHubError;

    fn try_from(stored: StoredSnapshot) -> GitHubResult<Self> {
        for path in stored.files.keys() {
            validate_package_path(path)?;
        }
        if !stored.sha.is_empty() && stored.files.is_empty() {
            return Err(GitHubError::Manifest {
                path: String::new(),
                message: format!("snapshot for {} has no files", stored.sha),
            });
        }
        Ok(Self {
            sha: stored.sha,
            files: stored.files,
        })
    }
}

impl PackageSnapshot {
    /// A snapshot with no SHA and no files.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A complete snapshot for `sha`.
    #[must_use]
    pub fn new(sha: impl Into<String>, files: BTreeMap<String, String>) -> Self {
        Self {
            sha: sha.into(),
            files,
        }
    }

    /// Resolved SHA (or proxy tag); empty when unknown.
    #[must_use]
    pub fn sha(&self) -> &str {
        &self.sha
    }

    /// Whether the snapshot claims a resolved commit.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !self.sha.is_empty()
    }

    /// Path to file content.
    #[must_use]
    pub fn files(&self) -> &BTreeMap<String, String> {
        &self.files
    }

    /// Content of one file.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Whether a resolved snapshot carries its manifest. Unresolved
    /// snapshots never count as complete.
    #[must_use]
    pub fn is_complete(&self, manifest_name: &str) -> bool {
        self.is_resolved() && self.files.contains_key(manifest_name)
    }

    /// Consume into the file map.
    #[must_use]
    pub fn into_files(self) -> BTreeMap<String, String> {
        self.files
    }

    pub(crate) fn insert_file(&mut self, path: String, content: String) {
        self.files.insert(path, content);
    }

    /// Attach the SHA once every declared file is present.
    pub(crate) fn seal(mut self, sha: impl Into<String>) -> Self {
        self.sha = sha.into();
        self
    }
}

/// Package manifest (`ghpkg.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageManifest {
    /// Package name.
    pub name: String,
    /// Package version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Short description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Source files, relative to the repository root.
    pub files: Vec<String>,
    /// Test files, relative to the repository root.
    #[serde(rename = "testFiles", alias = "test_files")]
    pub test_files: Vec<String>,
    /// Dependencies by name.
    pub dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Parse manifest text and validate every declared path.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::Manifest`] for invalid JSON or unsafe paths.
    pub fn parse(manifest_name: &str, text: &str) -> GitHubResult<Self> {
        let manifest: Self = serde_json::from_str(text).map_err(|e| GitHubError::Manifest {
            path: manifest_name.to_string(),
            message: e.to_string(),
        })?;
        for path in manifest.declared_files() {
            validate_package_path(path)?;
        }
        Ok(manifest)
    }

    /// Source files followed by test files.
    pub fn declared_files(&self) -> impl Iterator<Item = &String> {
        self.files.iter().chain(self.test_files.iter())
    }
}

/// Reject declared paths that could escape the package root.
///
/// # Errors
///
/// Returns [`GitHubError::Manifest`] for empty, absolute, backslashed, or
/// `.`/`..`-containing paths.
pub fn validate_package_path(path: &str) -> GitHubResult<()> {
    let bad = |message: &str| {
        Err(GitHubError::Manifest {
            path: path.to_string(),
            message: message.to_string(),
        })
    };
    if path.is_empty() {
        return bad("empty file path");
    }
    if path.starts_with('/') {
        return bad("absolute file path");
    }
    if path.contains('\\') || path.bytes().any(|b| b.is_ascii_control()) {
        return bad("file path contains invalid characters");
    }
    if path
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return bad("file path has empty, '.' or '..' segments");
    }
    Ok(())
}

impl GitHubClient {
    /// Bring a package snapshot up to date.
    ///
    /// Returns `Ok(None)` without any request when the repository is banned.
    /// In direct mode, if `previous` already carries the resolved commit SHA
    /// it is returned unchanged; otherwise every declared file is downloaded
    /// and a new snapshot is sealed only once all of them arrived.
    ///
    /// # Errors
    ///
    /// Propagates every resolution and download failure. On error no
    /// snapshot is produced and `previous` is left as it was.
    pub async fn fetch_package(
        &self,
        id: &RepoIdentifier,
        config: Option<&PolicyConfig>,
        previous: Option<&PackageSnapshot>,
    ) -> GitHubResult<Option<PackageSnapshot>> {
        if classify(Some(id), config) == RepoStatus::Banned {
            info!(event = "github.download.banned", repo = %id.full_name, "repository is banned");
            return Ok(None);
        }
        let snapshot = self.backend().fetch_files(id, previous).await?;
        Ok(Some(snapshot))
    }

    /// Fetch and parse only the package manifest.
    ///
    /// # Errors
    ///
    /// Propagates download failures and returns [`GitHubError::Manifest`] for
    /// a missing or invalid manifest.
    pub async fn package_manifest(&self, id: &RepoIdentifier) -> GitHubResult<PackageManifest> {
        self.backend().manifest(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_seal_sets_sha() {
        let mut snap = PackageSnapshot::empty();
        assert!(!snap.is_resolved());
        snap.insert_file("a.ts".into(), "x".into());
        let snap = snap.seal("abc");
        assert_eq!(snap.sha(), "abc");
        assert_eq!(snap.file("a.ts"), Some("x"));
    }

    #[test]
    fn manifest_parses_files_and_tests() {
        let m = PackageManifest::parse(
            DEFAULT_MANIFEST_NAME,
            r#"{"name":"neopixel","files":["main.ts","lib/util.ts"],"testFiles":["test.ts"],"extra":1}"#,
        )
        .unwrap();
        assert_eq!(m.name, "neopixel");
        let declared: Vec<&String> = m.declared_files().collect();
        assert_eq!(declared, vec!["main.ts", "lib/util.ts", "test.ts"]);
    }

    #[test]
    fn manifest_rejects_traversal() {
        let err = PackageManifest::parse(
            DEFAULT_MANIFEST_NAME,
            r#"{"name":"x","files":["../../etc/passwd"]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GitHubError::Manifest { .. }));
    }

    #[test]
    fn manifest_rejects_bad_json() {
        let err = PackageManifest::parse(DEFAULT_MANIFEST_NAME, "{").unwrap_err();
        match err {
            GitHubError::Manifest { path, .. } => assert_eq!(path, DEFAULT_MANIFEST_NAME),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn path_validation() {
        assert!(validate_package_path("main.ts").is_ok());
        assert!(validate_package_path("src/deep/file.ts").is_ok());
        for bad in ["", "/abs", "a//b", "./a", "a/../b", "a\\b", "a/"] {
            assert!(validate_package_path(bad).is_err(), "path: {bad:?}");
        }
    }

    #[test]
    fn snapshot_serde_round_trip_keeps_sha() {
        let mut files = BTreeMap::new();
        files.insert("ghpkg.json".to_string(), "{}".to_string());
        let snap = PackageSnapshot::new("deadbeef", files);
        let json = serde_json::to_string(&snap).unwrap();
        let back: PackageSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn snapshot_deserialize_rejects_unsafe_or_empty() {
        let escaping = r#"{"sha":"deadbeef","files":{"../x.ts":""}}"#;
        assert!(serde_json::from_str::<PackageSnapshot>(escaping).is_err());

        let no_files = r#"{"sha":"deadbeef","files":{}}"#;
        assert!(serde_json::from_str::<PackageSnapshot>(no_files).is_err());

        let staging = r#"{"sha":"","files":{}}"#;
        let snap: PackageSnapshot = serde_json::from_str(staging).unwrap();
        assert!(!snap.is_resolved());
    }

    #[test]
    fn completeness_needs_sha_and_manifest() {
        let mut files = BTreeMap::new();
        files.insert("main.ts".to_string(), String::new());
        assert!(!PackageSnapshot::new("abc", files.clone()).is_complete(DEFAULT_MANIFEST_NAME));

        files.insert(DEFAULT_MANIFEST_NAME.to_string(), "{}".to_string());
        assert!(!PackageSnapshot::new("", files.clone()).is_complete(DEFAULT_MANIFEST_NAME));
        assert!(PackageSnapshot::new("abc", files).is_complete(DEFAULT_MANIFEST_NAME));
    }
}
