use tracing::warn;

/// Fields a workspace config may not set: where requests (and the token) go.
const PROTECTED_FIELDS: &[&[&str]] = &[
    &["github", "api_root"],
    &["github", "raw_root"],
    &["github", "proxy_root"],
    &["github", "token"],
];

/// Lists a workspace config may only add to.
const UNION_FIELDS: &[&[&str]] = &[&["packages", "banned_orgs"], &["packages", "banned_repos"]];

/// Enforce that the workspace layer can only **tighten** policy and cannot
/// redirect traffic. Call after merging the workspace layer, before
/// deserialization.
///
/// `baseline` is the merged config *before* the workspace layer was applied.
pub fn enforce_restrictions(
    merged: &mut toml::Value,
    baseline: &toml::Value,
    workspace_layer: &toml::Value,
) {
    for path in PROTECTED_FIELDS {
        block_workspace_override(merged, baseline, workspace_layer, path);
    }
    for path in UNION_FIELDS {
        union_string_arrays(merged, baseline, workspace_layer, path);
    }

    let allow_path: &[&str] = &["packages", "allow_unapproved"];
    if get_nested(workspace_layer, allow_path).and_then(toml::Value::as_bool) == Some(true) {
        warn!(
            field = "packages.allow_unapproved",
            "workspace config tried to enable unapproved packages; reverting"
        );
        let base_val = get_nested(baseline, allow_path)
            .cloned()
            .unwrap_or(toml::Value::Boolean(false));
        set_nested(merged, allow_path, base_val);
    }
}

fn block_workspace_override(
    merged: &mut toml::Value,
    baseline: &toml::Value,
    workspace: &toml::Value,
    path: &[&str],
) {
    if get_nested(workspace, path).is_none() {
        return;
    }
    warn!(
        field = %path.join("."),
        "workspace config cannot set this field; reverting to baseline"
    );
    match get_nested(baseline, path) {
        Some(base_val) => set_nested(merged, path, base_val.clone()),
        None => remove_nested(merged, path),
    }
}

fn union_string_arrays(
    merged: &mut toml::Value,
    baseline: &toml::Value,
    workspace: &toml::Value,
    path: &[&str],
) {
    let Some(baseline_items) = get_nested(baseline, path).and_then(toml::Value::as_array) else {
        return;
    };
    if get_nested(workspace, path).is_none() {
        return;
    }

    let mut result = get_nested(merged, path)
        .and_then(toml::Value::as_array)
        .cloned()
        .unwrap_or_default();
    for item in baseline_items {
        if !result.contains(item) {
            warn!(
                field = %path.join("."),
                "workspace config removed an entry; restoring it"
            );
            result.push(item.clone());
        }
    }
    set_nested(merged, path, toml::Value::Array(result));
}

/// Navigate into a nested `toml::Value` by path segments.
pub(crate) fn get_nested<'a>(val: &'a toml::Value, path: &[&str]) -> Option<&'a toml::Value> {
    let mut current = val;
    for segment in path {
        current = current.as_table()?.get(*segment)?;
    }
    Some(current)
}

/// Set a value at a nested path, creating intermediate tables as needed.
pub(crate) fn set_nested(val: &mut toml::Value, path: &[&str], new_val: toml::Value) {
    let Some((leaf, parents)) = path.split_last() else {
        return;
    };
    let mut current = val;
    for segment in parents {
        current = match current {
            toml::Value::Table(table) => table
                .entry((*segment).to_owned())
                .or_insert(toml::Value::Table(toml::map::Map::new())),
            _ => return,
        };
    }
    if let toml::Value::Table(table) = current {
        table.insert((*leaf).to_owned(), new_val);
    }
}

fn remove_nested(val: &mut toml::Value, path: &[&str]) {
    let Some((leaf, parents)) = path.split_last() else {
        return;
    };
    let mut current = val;
    for segment in parents {
        current = match current {
            toml::Value::Table(table) => match table.get_mut(*segment) {
                Some(next) => next,
                None => return,
            },
            _ => return,
        };
    }
    if let toml::Value::Table(table) = current {
        table.remove(*leaf);
    }
}
