//! `search`.

use anyhow::Result;
use serde_json::json;

use ghpkg_core::repo_icon_url;

use super::{Context, print_json};
use crate::theme::Theme;

/// Search by free text, or look up `|`-separated repository links.
pub(crate) async fn search(ctx: &Context, query: &str) -> Result<()> {
    let results = ctx.client.search(query, Some(&ctx.policy)).await;

    if ctx.is_json() {
        let items: Vec<_> = results
            .iter()
            .map(|repo| {
                json!({
                    "repo": repo,
                    "icon_url": repo_icon_url(repo, ctx.proxy_root()),
                })
            })
            .collect();
        return print_json(&items);
    }

    if results.is_empty() {
        println!("{}", Theme::info("No packages found"));
        return Ok(());
    }

    println!(
        "{}",
        Theme::header(&format!("{} package(s)", results.len()))
    );
    for repo in &results {
        println!("  {} [{}]", repo.full_name, Theme::status(repo.status));
        if !repo.description.is_empty() {
            println!("    {}", Theme::dimmed(&repo.description));
        }
    }
    Ok(())
}
