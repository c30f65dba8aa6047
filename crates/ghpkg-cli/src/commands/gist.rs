//! `gist`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use serde_json::json;

use ghpkg_core::{GistFile, GistRequest};

use super::{Context, print_json};
use crate::theme::Theme;

/// Read local files into gist entries keyed by file name.
fn collect_files(paths: &[PathBuf]) -> Result<BTreeMap<String, GistFile>> {
    let mut files = BTreeMap::new();
    for path in paths {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("{} has no usable file name", path.display()))?
            .to_string();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if files.insert(name.clone(), GistFile::new(content)).is_some() {
            anyhow::bail!("two files are named '{name}'; gist file names must be unique");
        }
    }
    Ok(files)
}

/// Create or update a private gist.
pub(crate) async fn publish(
    ctx: &Context,
    paths: &[PathBuf],
    name: &str,
    id: Option<String>,
    force_new: bool,
) -> Result<()> {
    let token = ctx.client.settings().token.clone();
    if token.is_none() {
        eprintln!(
            "{}",
            Theme::warning("No GitHub token configured; set GITHUB_TOKEN to publish gists")
        );
    }

    let request = GistRequest {
        token,
        force_new,
        files: collect_files(paths)?,
        name: name.to_string(),
        current_gist_id: id,
    };
    let updating = request.update_target().is_some();
    let gist_id = ctx.client.publish_gist(&request).await?;
    let url = format!("https://gist.github.com/{gist_id}");

    if ctx.is_json() {
        return print_json(&json!({
            "id": gist_id,
            "url": url,
            "updated": updating,
        }));
    }

    let verb = if updating { "Updated" } else { "Created" };
    println!("{}", Theme::success(&format!("{verb} gist {gist_id}")));
    println!("{}", Theme::kv("URL", &url));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_files_keys_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("main.ts");
        std::fs::write(&a, "let x = 1").unwrap();

        let files = collect_files(&[a]).unwrap();
        assert_eq!(files["main.ts"].content, "let x = 1");
    }

    #[test]
    fn test_collect_files_rejects_duplicate_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::fs::create_dir(dir.path().join("b")).unwrap();
        let first = dir.path().join("a/main.ts");
        let second = dir.path().join("b/main.ts");
        std::fs::write(&first, "1").unwrap();
        std::fs::write(&second, "2").unwrap();

        assert!(collect_files(&[first, second]).is_err());
    }

    #[test]
    fn test_collect_files_missing_file() {
        assert!(collect_files(&[PathBuf::from("/nonexistent/x.ts")]).is_err());
    }
}
