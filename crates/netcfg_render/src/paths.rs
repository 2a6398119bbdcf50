//! Include path resolution.
//!
//! `{% include "../common/ntp.j2" %}` is resolved against the directory of
//! the template containing the directive, then normalized to a name
//! relative to the template root.

/// Resolve `name` as included from template `parent`.
///
/// Both arguments and the result use `/` separators and are relative to the
/// template root. A leading `/` makes `name` root-relative. Returns `None`
/// if the path climbs above the root.
pub fn resolve_include(name: &str, parent: &str) -> Option<String> {
    let mut parts: Vec<&str> = if name.starts_with('/') {
        Vec::new()
    } else {
        let mut dir: Vec<&str> = parent.split('/').filter(|s| !s.is_empty()).collect();
        dir.pop();
        dir
    };

    for segment in name.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }

    Some(parts.join("/"))
}

/// Join callback body: resolved name, or `name` unchanged when it climbs
/// above the root. The loader refuses names containing `..`, so the
/// include then fails as a missing template.
pub fn join_or_reject(name: &str, parent: &str) -> String {
    resolve_include(name, parent).unwrap_or_else(|| {
        tracing::warn!("Include {:?} from {:?} escapes the template root", name, parent);
        name.to_string()
    })
}
