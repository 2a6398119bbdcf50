//! Variable loader trait and the built-in loader variants.
//!
//! A loader contributes keys to the shared [`Variables`] mapping. Loaders
//! run one at a time in priority order, so a loader may read anything a
//! lower-priority loader already wrote.
//!
//! # Example
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use netcfg_vars::{ExtraArgs, VariableLoader, Variables, VarsResult};
//!
//! struct Banner;
//!
//! #[async_trait]
//! impl VariableLoader for Banner {
//!     fn name(&self) -> &str { "banner" }
//!
//!     async fn load(&self, vars: &mut Variables, _extra: &ExtraArgs) -> VarsResult<()> {
//!         vars.insert("banner".into(), "Authorized access only".into());
//!         Ok(())
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use crate::context::{merge_into, ExtraArgs, Variables};
use crate::error::VarsResult;

/// A source of template variables.
#[async_trait]
pub trait VariableLoader: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Add or overwrite keys in `vars`.
    async fn load(&self, vars: &mut Variables, extra: &ExtraArgs) -> VarsResult<()>;
}

/// Adapts a synchronous closure into a [`VariableLoader`].
pub struct FnLoader<F> {
    name: String,
    func: F,
}

impl<F> FnLoader<F>
where
    F: Fn(&mut Variables, &ExtraArgs) -> VarsResult<()> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

#[async_trait]
impl<F> VariableLoader for FnLoader<F>
where
    F: Fn(&mut Variables, &ExtraArgs) -> VarsResult<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self, vars: &mut Variables, extra: &ExtraArgs) -> VarsResult<()> {
        (self.func)(vars, extra)
    }
}

/// Contributes a fixed set of variables parsed ahead of time, typically
/// from a declarative variable file.
#[derive(Debug, Clone)]
pub struct StaticLoader {
    name: String,
    source: PathBuf,
    vars: Variables,
}

impl StaticLoader {
    /// Loader contributing the variables read from `path`.
    pub fn from_source(path: &Path, vars: Variables) -> Self {
        Self {
            name: path.display().to_string(),
            source: path.to_path_buf(),
            vars,
        }
    }

    /// File or directory the variables came from.
    pub fn source(&self) -> &Path {
        &self.source
    }
}

#[async_trait]
impl VariableLoader for StaticLoader {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self, vars: &mut Variables, _extra: &ExtraArgs) -> VarsResult<()> {
        merge_into(vars, &self.vars);
        Ok(())
    }
}

/// Copies the user's `key=value` pairs from [`ExtraArgs`] into the mapping
/// as string values.
#[derive(Debug, Clone, Default)]
pub struct ExtraValuesLoader;

#[async_trait]
impl VariableLoader for ExtraValuesLoader {
    fn name(&self) -> &str {
        "extra-values"
    }

    async fn load(&self, vars: &mut Variables, extra: &ExtraArgs) -> VarsResult<()> {
        for (key, value) in &extra.values {
            vars.insert(key.clone(), Value::String(value.clone()));
        }
        Ok(())
    }
}
