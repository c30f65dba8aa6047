//! `refs` and `resolve`.

use anyhow::Result;
use serde_json::json;

use ghpkg_core::{RepoIdentifier, RepoStatus, classify};

use super::{Context, parse_ref, print_json};
use crate::theme::Theme;

fn checked_ref(ctx: &Context, input: &str) -> Result<RepoIdentifier> {
    let id = parse_ref(input)?;
    if classify(Some(&id), Some(&ctx.policy)) == RepoStatus::Banned {
        anyhow::bail!("{} is banned by policy", id.full_name);
    }
    Ok(id)
}

/// List refs under `refs/{namespace}/` in version order.
pub(crate) async fn list(ctx: &Context, input: &str, namespace: &str) -> Result<()> {
    let id = checked_ref(ctx, input)?;
    let snapshot = ctx.client.list_refs(&id.full_name, namespace).await?;

    if ctx.is_json() {
        let refs: Vec<_> = snapshot
            .refs()
            .iter()
            .map(|(name, sha)| json!({ "name": name, "sha": sha }))
            .collect();
        return print_json(&json!({
            "repo": id.full_name,
            "namespace": namespace,
            "refs": refs,
            "head": snapshot.head(),
        }));
    }

    if snapshot.is_empty() {
        println!(
            "{}",
            Theme::info(&format!("No {namespace} in {}", id.full_name))
        );
    } else {
        println!(
            "{}",
            Theme::header(&format!("{} {namespace} ({})", id.full_name, snapshot.len()))
        );
        for (name, sha) in snapshot.refs() {
            println!("  {name:<24} {}", Theme::sha(sha));
        }
    }
    if let Some(head) = snapshot.head() {
        println!("{}", Theme::kv("HEAD", &Theme::sha(head)));
    }
    Ok(())
}

/// Resolve a tag, branch or SHA to a commit SHA.
pub(crate) async fn resolve(ctx: &Context, input: &str, tag_or_sha: &str) -> Result<()> {
    let id = checked_ref(ctx, input)?;
    let sha = ctx
        .client
        .resolve_tag_or_sha(&id.full_name, tag_or_sha)
        .await?;

    if ctx.is_json() {
        return print_json(&json!({
            "repo": id.full_name,
            "ref": tag_or_sha,
            "sha": sha,
        }));
    }
    println!("{sha}");
    Ok(())
}
