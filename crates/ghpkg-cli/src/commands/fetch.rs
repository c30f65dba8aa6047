//! `manifest` and `fetch`.

use std::path::Path;

use anyhow::{Context as _, Result};
use serde_json::json;
use tracing::info;

use ghpkg_core::{PackageSnapshot, RepoStatus, classify, validate_package_path};

use super::{Context, parse_ref, print_json};
use crate::cache::SnapshotCache;
use crate::config_bridge;
use crate::theme::Theme;

/// Fetch and show only the package manifest.
pub(crate) async fn manifest(ctx: &Context, input: &str) -> Result<()> {
    let id = parse_ref(input)?;
    if classify(Some(&id), Some(&ctx.policy)) == RepoStatus::Banned {
        anyhow::bail!("{} is banned by policy", id.full_name);
    }
    let manifest = ctx.client.package_manifest(&id).await?;

    if ctx.is_json() {
        return print_json(&manifest);
    }

    println!("{}", Theme::header(&manifest.name));
    if let Some(version) = &manifest.version {
        println!("{}", Theme::kv("Version", version));
    }
    if let Some(description) = &manifest.description {
        println!("{}", Theme::kv("Description", description));
    }
    println!("{}", Theme::kv("Files", &manifest.files.join(", ")));
    if !manifest.test_files.is_empty() {
        println!("{}", Theme::kv("Test files", &manifest.test_files.join(", ")));
    }
    for (name, version) in &manifest.dependencies {
        println!("  {} {}", name, Theme::dimmed(version));
    }
    Ok(())
}

/// Bring a package snapshot up to date and optionally write it out.
pub(crate) async fn fetch(
    ctx: &Context,
    input: &str,
    out: Option<&Path>,
    no_cache: bool,
) -> Result<()> {
    let id = parse_ref(input)?;
    let cache = if no_cache {
        None
    } else {
        config_bridge::cache_dir(&ctx.config).map(SnapshotCache::new)
    };
    let previous = cache
        .as_ref()
        .and_then(|c| c.load(&id, &ctx.config.target.manifest_name));

    let Some(snapshot) = ctx
        .client
        .fetch_package(&id, Some(&ctx.policy), previous.as_ref())
        .await?
    else {
        anyhow::bail!("{} is banned by policy", id.full_name);
    };

    let reused = previous.as_ref().is_some_and(|p| p == &snapshot);
    if let Some(cache) = &cache
        && !reused
    {
        cache.store(&id, &snapshot)?;
        info!(repo = %id.full_name, dir = %cache.dir().display(), "snapshot cached");
    }

    if let Some(out) = out {
        write_snapshot(&snapshot, out)?;
    }

    if ctx.is_json() {
        return print_json(&json!({
            "repo": id.full_name,
            "sha": snapshot.sha(),
            "cached": reused,
            "files": snapshot.files().keys().collect::<Vec<_>>(),
        }));
    }

    let summary = format!(
        "{} at {} ({} files{})",
        id.full_name,
        Theme::sha(snapshot.sha()),
        snapshot.files().len(),
        if reused { ", unchanged" } else { "" }
    );
    println!("{}", Theme::success(&summary));
    if let Some(out) = out {
        println!("{}", Theme::kv("Written to", &out.display().to_string()));
    }
    Ok(())
}

fn write_snapshot(snapshot: &PackageSnapshot, out: &Path) -> Result<()> {
    for (path, content) in snapshot.files() {
        validate_package_path(path)?;
        let target = out.join(path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(&target, content)
            .with_context(|| format!("failed to write {}", target.display()))?;
    }
    Ok(())
}
