//! `parse`, `status`, `repo` and `latest`.

use anyhow::Result;
use serde_json::json;

use ghpkg_core::{PolicyConfig, RepoIdentifier, canonicalize, classify, repo_icon_url};

use super::{Context, OutputFormat, parse_ref, print_json};
use crate::theme::Theme;

/// Parse a reference offline and show its canonical form.
pub(crate) fn parse(input: &str, format: OutputFormat) -> Result<()> {
    let id = parse_ref(input)?;
    let canonical = canonicalize(&id);

    if format == OutputFormat::Json {
        return print_json(&json!({
            "owner": id.owner,
            "full_name": id.full_name,
            "tag": id.tag,
            "canonical": canonical,
        }));
    }

    println!("{}", Theme::header(&canonical));
    print_identifier(&id);
    Ok(())
}

/// Classify a reference against the configured policy, offline.
pub(crate) fn status(input: &str, policy: &PolicyConfig, format: OutputFormat) -> Result<()> {
    // Unparsable input is classified too: it is banned by definition.
    let id = RepoIdentifier::parse(input).ok();
    let verdict = classify(id.as_ref(), Some(policy));

    if format == OutputFormat::Json {
        return print_json(&json!({
            "input": input,
            "full_name": id.as_ref().map(|i| i.full_name.as_str()),
            "status": verdict,
        }));
    }

    let name = id.as_ref().map_or(input, |i| i.full_name.as_str());
    println!("{}", Theme::kv(name, &Theme::status(verdict)));
    Ok(())
}

/// Look up repository metadata.
pub(crate) async fn repo(ctx: &Context, input: &str) -> Result<()> {
    let id = parse_ref(input)?;
    let Some(descriptor) = ctx.client.repo(&id, Some(&ctx.policy)).await? else {
        anyhow::bail!("{} is banned or does not exist", id.full_name);
    };
    let icon = repo_icon_url(&descriptor, ctx.proxy_root());

    if ctx.is_json() {
        return print_json(&json!({
            "repo": descriptor,
            "icon_url": icon,
        }));
    }

    println!("{}", Theme::header(&descriptor.name));
    println!("{}", Theme::kv("Repository", &descriptor.full_name));
    if !descriptor.description.is_empty() {
        println!("{}", Theme::kv("Description", &descriptor.description));
    }
    println!("{}", Theme::kv("Default branch", &descriptor.default_branch));
    println!("{}", Theme::kv("Status", &Theme::status(descriptor.status)));
    if let Some(tag) = &descriptor.tag {
        println!("{}", Theme::kv("Tag", tag));
    }
    if let Some(icon) = icon {
        println!("{}", Theme::kv("Icon", &icon));
    }
    println!("{}", Theme::dimmed(&format!("via {} mode", ctx.client.mode())));
    Ok(())
}

/// Show the most recent version of a repository.
pub(crate) async fn latest(ctx: &Context, input: &str) -> Result<()> {
    let latest = ctx.client.latest_version(input, Some(&ctx.policy)).await?;

    if ctx.is_json() {
        return print_json(&json!({ "input": input, "latest": latest }));
    }

    match latest {
        Some(version) => println!("{version}"),
        None => eprintln!(
            "{}",
            Theme::warning(&format!("No version found for '{input}'"))
        ),
    }
    Ok(())
}

fn print_identifier(id: &RepoIdentifier) {
    if let Some(owner) = &id.owner {
        println!("{}", Theme::kv("Owner", owner));
    }
    println!("{}", Theme::kv("Repository", &id.full_name));
    println!(
        "{}",
        Theme::kv("Tag", id.tag.as_deref().unwrap_or("(default)"))
    );
}
