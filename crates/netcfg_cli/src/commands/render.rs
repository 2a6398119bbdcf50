//! Render command - resolve variables and render a template.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use netcfg_inventory::InventoryConfig;
use netcfg_render::{render_path, RenderResult, TemplateRenderer};
use netcfg_vars::{
    is_variable_file, DeviceVariableLoader, ExtraArgs, ExtraValuesLoader, VariableRegistry,
    Variables,
};

/// Inventory data is the baseline everything else overrides.
pub const DEVICE_PRIORITY: i32 = 0;
/// Variable files and directories.
pub const FILE_PRIORITY: i32 = 5;
/// `key=value` pairs from the command line win over everything.
pub const VALUES_PRIORITY: i32 = 9;

#[derive(Args)]
pub struct RenderArgs {
    /// Device hostname to resolve from the inventory
    #[arg(long)]
    pub hostname: Option<String>,

    /// Template file
    #[arg(short, long)]
    pub template: PathBuf,

    /// Root directory for template includes (defaults to the template's directory)
    #[arg(long)]
    pub template_root: Option<PathBuf>,

    /// Extra variables: key=value, a variable file, or a directory of files
    #[arg(short = 'e', long = "extra-variables", value_name = "SOURCE")]
    pub extra_variables: Vec<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// A `-e` argument that is neither a variable, a variable file, nor a
/// directory.
#[derive(Debug, thiserror::Error)]
#[error("Invalid argument for -e: unhandled extra variable: {0}")]
pub struct UnhandledExtra(pub String);

/// One `-e` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtraSource {
    Value(String, String),
    File(PathBuf),
    Directory(PathBuf),
}

impl ExtraSource {
    /// Existing directories and variable files win; otherwise anything with
    /// an `=` is a value, so `profile=leaf.yaml` sets `profile`.
    pub fn parse(expr: &str) -> Result<Self> {
        let path = Path::new(expr);
        if path.is_dir() {
            return Ok(Self::Directory(path.to_path_buf()));
        }
        if path.is_file() && is_variable_file(path) {
            return Ok(Self::File(path.to_path_buf()));
        }
        if let Some((key, value)) = ExtraArgs::parse_pair(expr) {
            return Ok(Self::Value(key, value));
        }
        if is_variable_file(path) {
            // Missing file; registration reports it with the path
            return Ok(Self::File(path.to_path_buf()));
        }
        Err(UnhandledExtra(expr.to_string()).into())
    }
}

/// Build the loader registry and loader arguments described by `args`.
pub fn build_registry(args: &RenderArgs) -> Result<(VariableRegistry, ExtraArgs)> {
    let sources = args
        .extra_variables
        .iter()
        .map(|expr| ExtraSource::parse(expr))
        .collect::<Result<Vec<_>>>()?;

    let mut registry = VariableRegistry::new();
    let mut extra = ExtraArgs::new();

    if let Some(hostname) = &args.hostname {
        let config = InventoryConfig::from_env()?;
        registry.register(DEVICE_PRIORITY, Arc::new(DeviceVariableLoader::new(config)))?;
        extra.hostname = Some(hostname.clone());
    }

    for source in sources {
        match source {
            ExtraSource::Value(key, value) => {
                extra.values.insert(key, value);
            }
            ExtraSource::File(path) => registry.register_file(FILE_PRIORITY, &path)?,
            ExtraSource::Directory(path) => registry.register_directory(FILE_PRIORITY, &path)?,
        }
    }

    if !extra.values.is_empty() {
        registry.register(VALUES_PRIORITY, Arc::new(ExtraValuesLoader))?;
    }

    Ok((registry, extra))
}

/// Resolve every variable, then render. Rendering only starts once
/// resolution has fully succeeded.
pub async fn resolve_and_render<F>(
    registry: &VariableRegistry,
    extra: &ExtraArgs,
    render: F,
) -> Result<String>
where
    F: FnOnce(&Variables) -> RenderResult<String>,
{
    let vars = registry.load_variables(extra).await?;
    info!("Resolved {} template variables", vars.len());
    Ok(render(&vars)?)
}

pub async fn execute(args: RenderArgs) -> Result<()> {
    let (registry, extra) = build_registry(&args)?;
    info!("Loader order: {:?}", registry.execution_order());

    let content = resolve_and_render(&registry, &extra, |vars| match &args.template_root {
        Some(root) => TemplateRenderer::new(root).render_file(&args.template, vars),
        None => render_path(&args.template, vars),
    })
    .await?;

    match &args.output {
        Some(path) => fs::write(path, &content)
            .with_context(|| format!("Failed to write output file {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
