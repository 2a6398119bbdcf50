//! Declarative variable files.
//!
//! TOML, YAML, and JSON files contribute their top-level keys. After
//! parsing, `${NAME}` and `${NAME:-default}` references inside string values
//! are replaced with values from the environment. Write `$${NAME}` for a
//! literal `${NAME}`; `$$` always yields a single `$`. Comments and keys are
//! never interpolated, and a bare `$` (as in `$1$salt$hash`) is kept as is.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::context::{merge_into, Variables};
use crate::error::{VarsError, VarsResult};

/// Extensions loaded by [`load_directory`], in merge order.
const DIRECTORY_GROUPS: &[&[&str]] = &[&["toml"], &["json", "yml", "yaml"]];

fn env_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"\$\$|\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}",
        )
        .expect("environment reference pattern is valid")
    })
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Replace environment references in `text` using `lookup`.
pub fn interpolate_with<F>(text: &str, lookup: F) -> VarsResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in env_pattern().captures_iter(text) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        out.push_str(&text[last..whole.start]);
        last = whole.end;

        let Some(name) = caps.get(1) else {
            // `$$`
            out.push('$');
            continue;
        };

        match (lookup(name.as_str()), caps.get(2)) {
            (Some(value), _) => out.push_str(&value),
            (None, Some(default)) => out.push_str(default.as_str()),
            (None, None) => return Err(VarsError::UnsetEnvironment(name.as_str().to_string())),
        }
    }

    out.push_str(&text[last..]);
    Ok(out)
}

/// Interpolate every string scalar inside `value`, recursing into arrays and
/// mapping values.
pub fn interpolate_value<F>(value: &mut Value, lookup: &F) -> VarsResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        Value::String(text) => {
            let replaced = interpolate_with(text.as_str(), lookup)?;
            *text = replaced;
        }
        Value::Array(items) => {
            for item in items {
                interpolate_value(item, lookup)?;
            }
        }
        Value::Object(map) => {
            for (_, item) in map.iter_mut() {
                interpolate_value(item, lookup)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Parse a variable file chosen by extension: `.toml`, `.yaml`/`.yml`, or
/// `.json`. Every failure names the file.
pub fn load_file(path: &Path) -> VarsResult<Variables> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let text = fs::read_to_string(path).map_err(|e| VarsError::load(path, e))?;
    debug!("Parsing {} as {}", path.display(), ext);

    if is_variable_file(path) && text.trim().is_empty() {
        return Ok(Variables::new());
    }

    let mut value: Value = match ext.as_str() {
        "toml" => {
            let parsed: toml::Value = toml::from_str(&text).map_err(|e| VarsError::load(path, e))?;
            serde_json::to_value(parsed).map_err(|e| VarsError::load(path, e))?
        }
        "yaml" | "yml" => serde_yaml::from_str(&text).map_err(|e| VarsError::load(path, e))?,
        "json" => serde_json::from_str(&text).map_err(|e| VarsError::load(path, e))?,
        other => {
            return Err(VarsError::load(
                path,
                format!("unsupported variable file type: {:?}", other),
            ))
        }
    };

    interpolate_value(&mut value, &process_env).map_err(|e| VarsError::load(path, e))?;

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Variables::new()),
        _ => Err(VarsError::load(path, "top level must be a mapping")),
    }
}

/// Whether `path` has an extension [`load_file`] understands.
pub fn is_variable_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|e| DIRECTORY_GROUPS.iter().any(|g| g.contains(&e.as_str())))
}

/// Merge every variable file in `dir`.
///
/// TOML files load first, then JSON and YAML files; within each group
/// files load in name order. Later files win.
pub fn load_directory(dir: &Path) -> VarsResult<Variables> {
    if !dir.is_dir() {
        return Err(VarsError::load(dir, "not a directory"));
    }

    let base = glob::Pattern::escape(&dir.to_string_lossy());
    let mut vars = Variables::new();

    for group in DIRECTORY_GROUPS {
        let mut paths: Vec<PathBuf> = Vec::new();
        for ext in *group {
            let pattern = format!("{}/*.{}", base, ext);
            let entries = glob::glob(&pattern).map_err(|e| VarsError::load(dir, e))?;
            paths.extend(entries.filter_map(|entry| entry.ok()));
        }
        paths.sort();

        for path in paths {
            merge_into(&mut vars, &load_file(&path)?);
        }
    }

    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn env(name: &str) -> Option<String> {
        match name {
            "SITE" => Some("nyc1".to_string()),
            "EMPTY" => Some(String::new()),
            _ => None,
        }
    }

    #[test]
    fn test_interpolate_forms() {
        assert_eq!(interpolate_with("site=${SITE}", env).unwrap(), "site=nyc1");
        assert_eq!(interpolate_with("site=$SITE!", env).unwrap(), "site=$SITE!");
        assert_eq!(interpolate_with("x=${NOPE:-dflt}", env).unwrap(), "x=dflt");
        assert_eq!(interpolate_with("x=${EMPTY:-dflt}", env).unwrap(), "x=");
        assert_eq!(interpolate_with("cost $$5", env).unwrap(), "cost $5");
        assert_eq!(interpolate_with("no refs", env).unwrap(), "no refs");
        assert_eq!(interpolate_with("$${SITE}", env).unwrap(), "${SITE}");
    }

    #[test]
    fn test_interpolate_value_only_touches_strings() {
        let quoting = |name: &str| match name {
            "BANNER" => Some("line one\"\nkey: injected".to_string()),
            _ => None,
        };
        let mut value = json!({
            "banner": "${BANNER}",
            "servers": ["${MISSING:-10.0.0.1}", 5],
            "${BANNER}": true
        });

        interpolate_value(&mut value, &quoting).unwrap();
        assert_eq!(value["banner"], json!("line one\"\nkey: injected"));
        assert_eq!(value["servers"], json!(["10.0.0.1", 5]));
        assert_eq!(value["${BANNER}"], json!(true));
        assert!(value.get("key").is_none());
    }

    #[test]
    fn test_comments_are_not_interpolated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.yaml");
        fs::write(
            &path,
            "# export ${NETCFG_TEST_NEVER_SET_TOKEN} before running\nmtu: 9000\n",
        )
        .unwrap();

        let vars = load_file(&path).unwrap();
        assert_eq!(vars["mtu"], json!(9000));
    }

    #[test]
    fn test_crypt_hashes_kept_verbatim() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s.yaml");
        fs::write(
            &path,
            "enable_secret: '$1$mERr$hx5rVt7rPNoS4'\nlocal_secret: '$9$abc$def'\n",
        )
        .unwrap();

        let vars = load_file(&path).unwrap();
        assert_eq!(vars["enable_secret"], json!("$1$mERr$hx5rVt7rPNoS4"));
        assert_eq!(vars["local_secret"], json!("$9$abc$def"));
    }

    #[test]
    fn test_unset_reference_in_value_names_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("v.toml");
        fs::write(&path, "token = \"${NETCFG_TEST_NEVER_SET_TOKEN}\"\n").unwrap();

        let message = load_file(&path).unwrap_err().to_string();
        assert!(message.contains("v.toml"), "{}", message);
        assert!(message.contains("NETCFG_TEST_NEVER_SET_TOKEN"), "{}", message);
    }

    #[test]
    fn test_interpolate_unset() {
        let err = interpolate_with("x=${NOPE}", env).unwrap_err();
        assert!(matches!(err, VarsError::UnsetEnvironment(ref n) if n == "NOPE"));
    }

    #[test]
    fn test_load_each_format() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.toml"), "asn = 65001\n[snmp]\ncommunity = \"ro\"\n").unwrap();
        fs::write(dir.path().join("b.yaml"), "ntp:\n  - 10.0.0.1\n").unwrap();
        fs::write(dir.path().join("c.json"), r#"{"mtu": 9214}"#).unwrap();

        let toml_vars = load_file(&dir.path().join("a.toml")).unwrap();
        assert_eq!(toml_vars["asn"], json!(65001));
        assert_eq!(toml_vars["snmp"]["community"], json!("ro"));

        let yaml_vars = load_file(&dir.path().join("b.yaml")).unwrap();
        assert_eq!(yaml_vars["ntp"], json!(["10.0.0.1"]));

        let json_vars = load_file(&dir.path().join("c.json")).unwrap();
        assert_eq!(json_vars["mtu"], json!(9214));
    }

    #[test]
    fn test_load_rejects_bad_files() {
        let dir = tempdir().unwrap();
        let bad = dir.path().join("bad.yaml");
        fs::write(&bad, "key: [unclosed\n").unwrap();
        let err = load_file(&bad).unwrap_err();
        assert!(err.to_string().contains("bad.yaml"));

        let list = dir.path().join("list.json");
        fs::write(&list, "[1, 2]").unwrap();
        assert!(load_file(&list).unwrap_err().to_string().contains("mapping"));

        let script = dir.path().join("vars.py");
        fs::write(&script, "x = 1").unwrap();
        assert!(load_file(&script).is_err());

        let missing = dir.path().join("missing.toml");
        assert!(load_file(&missing).unwrap_err().to_string().contains("missing.toml"));
    }

    #[test]
    fn test_empty_yaml_is_empty_mapping() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.yml");
        fs::write(&path, "").unwrap();
        assert!(load_file(&path).unwrap().is_empty());
    }

    #[test]
    fn test_directory_last_file_wins() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("00-base.toml"), "role = \"leaf\"\nmtu = 1500\n").unwrap();
        fs::write(dir.path().join("10-site.toml"), "mtu = 9000\n").unwrap();
        fs::write(dir.path().join("override.yaml"), "role: spine\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let vars = load_directory(dir.path()).unwrap();
        assert_eq!(vars["mtu"], json!(9000));
        assert_eq!(vars["role"], json!("spine"));
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn test_is_variable_file() {
        assert!(is_variable_file(Path::new("x.TOML")));
        assert!(is_variable_file(Path::new("dir/x.yml")));
        assert!(!is_variable_file(Path::new("x.py")));
        assert!(!is_variable_file(Path::new("x")));
    }
}
