//! Template rendering.

use std::error::Error as StdError;
use std::fs;
use std::path::{Component, Path, PathBuf};

use minijinja::{path_loader, Environment};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{RenderError, RenderResult};
use crate::helpers::{self, RaisedError};
use crate::paths;

/// Renders configuration templates found under one root directory.
///
/// Block tags swallow their own line (`trim_blocks` and `lstrip_blocks`) and
/// a template's final newline is kept.
pub struct TemplateRenderer {
    root: PathBuf,
    env: Environment<'static>,
}

impl TemplateRenderer {
    /// Create a renderer searching `root` for templates.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();

        let mut env = Environment::new();
        env.set_loader(path_loader(&root));
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.set_path_join_callback(|name, parent| paths::join_or_reject(name, parent).into());
        helpers::register(&mut env);

        Self { root, env }
    }

    /// Render the template named `name`, relative to the root.
    pub fn render<S: Serialize>(&self, name: &str, vars: &S) -> RenderResult<String> {
        debug!("Rendering {} from {:?}", name, self.root);
        let template = self.env.get_template(name)?;
        template.render(vars).map_err(intercept)
    }

    /// Render a template given by file path. The file must live under the
    /// root.
    pub fn render_file<S: Serialize>(&self, path: &Path, vars: &S) -> RenderResult<String> {
        let name = self.template_name(path)?;
        self.render(&name, vars)
    }

    /// Template name of `path` relative to the root, `/`-separated.
    pub fn template_name(&self, path: &Path) -> RenderResult<String> {
        let root = fs::canonicalize(&self.root)?;
        let full = fs::canonicalize(path)?;

        let relative = full
            .strip_prefix(&root)
            .map_err(|_| RenderError::OutsideRoot {
                path: path.to_path_buf(),
                root: self.root.clone(),
            })?;

        Ok(relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/"))
    }
}

/// Render `template` using its own directory as the template root.
pub fn render_path<S: Serialize>(template: &Path, vars: &S) -> RenderResult<String> {
    let root = match template.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    info!("Rendering {}", template.display());
    TemplateRenderer::new(root).render_file(template, vars)
}

/// Turn a `raise(...)` failure into [`RenderError::Raised`] located at the
/// template and line that raised it. Any other engine error passes through.
fn intercept(err: minijinja::Error) -> RenderError {
    let mut location: Option<(String, usize)> = None;
    let mut raised: Option<String> = None;
    let mut current: Option<&(dyn StdError + 'static)> = Some(&err);

    while let Some(e) = current {
        if let Some(engine) = e.downcast_ref::<minijinja::Error>() {
            if let (Some(name), Some(line)) = (engine.name(), engine.line()) {
                location = Some((name.to_string(), line));
            }
        }
        if let Some(r) = e.downcast_ref::<RaisedError>() {
            raised = Some(r.message.clone());
        }
        current = e.source();
    }

    match (raised, location) {
        (Some(message), Some((template, line))) => RenderError::Raised {
            template,
            line,
            message,
        },
        _ => RenderError::Template(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn write(root: &Path, name: &str, content: &str) {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_whitespace_control() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "t.j2",
            "hostname {{ hostname }}\n{% for n in ntp %}\n  {% if n %}\nntp server {{ n }}\n  {% endif %}\n{% endfor %}\n",
        );

        let out = TemplateRenderer::new(dir.path())
            .render("t.j2", &json!({ "hostname": "r1", "ntp": ["a", "b"] }))
            .unwrap();
        assert_eq!(out, "hostname r1\nntp server a\nntp server b\n");
    }

    #[test]
    fn test_template_name_outside_root() {
        let dir = tempdir().unwrap();
        write(dir.path(), "root/a.j2", "");
        write(dir.path(), "other/b.j2", "");

        let renderer = TemplateRenderer::new(dir.path().join("root"));
        assert_eq!(
            renderer.template_name(&dir.path().join("root/a.j2")).unwrap(),
            "a.j2"
        );
        assert!(matches!(
            renderer.template_name(&dir.path().join("other/b.j2")),
            Err(RenderError::OutsideRoot { .. })
        ));
    }

    #[test]
    fn test_missing_template() {
        let dir = tempdir().unwrap();
        let err = TemplateRenderer::new(dir.path())
            .render("nope.j2", &json!({}))
            .unwrap_err();
        assert!(matches!(err, RenderError::Template(_)));
    }
}
