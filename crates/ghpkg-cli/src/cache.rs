//! On-disk package snapshot cache.
//!
//! One JSON file per canonical identifier, named by its blake3 hash. Writes
//! go through a temp file in the same directory and are renamed into place,
//! so a crash never leaves a torn snapshot behind.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use tracing::{debug, warn};

use ghpkg_core::{PackageSnapshot, RepoIdentifier, canonicalize};

pub(crate) struct SnapshotCache {
    dir: PathBuf,
}

impl SnapshotCache {
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }

    /// Hex blake3 of the canonical identifier.
    pub(crate) fn key(id: &RepoIdentifier) -> String {
        blake3::hash(canonicalize(id).as_bytes()).to_hex().to_string()
    }

    fn path_for(&self, id: &RepoIdentifier) -> PathBuf {
        self.dir.join(format!("{}.json", Self::key(id)))
    }

    /// The cached snapshot, if one exists, decodes, and still carries its
    /// manifest.
    pub(crate) fn load(&self, id: &RepoIdentifier, manifest_name: &str) -> Option<PackageSnapshot> {
        let path = self.path_for(id);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no cached snapshot");
                return None;
            },
        };
        match serde_json::from_slice::<PackageSnapshot>(&bytes) {
            Ok(snapshot) if snapshot.is_complete(manifest_name) => Some(snapshot),
            Ok(_) => {
                warn!(path = %path.display(), "ignoring cached snapshot without its manifest");
                None
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring corrupt cached snapshot");
                None
            },
        }
    }

    /// Replace the cached snapshot for `id`.
    pub(crate) fn store(&self, id: &RepoIdentifier, snapshot: &PackageSnapshot) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        let path = self.path_for(id);
        let mut staged = tempfile::NamedTempFile::new_in(&self.dir)
            .context("failed to create staging file")?;
        serde_json::to_writer(&mut staged, snapshot)?;
        staged.flush()?;
        staged
            .persist(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;

        debug!(path = %path.display(), sha = snapshot.sha(), "cached snapshot");
        Ok(path)
    }
}
