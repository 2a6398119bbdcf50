//! Priority-ordered registry of variable loaders.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::context::{ExtraArgs, Variables};
use crate::error::{VarsError, VarsResult};
use crate::files;
use crate::loader::{FnLoader, StaticLoader, VariableLoader};

/// Exclusive upper bound for loader priorities.
pub const MAX_PRIORITY: i32 = 10;

/// A registered loader and the order it was registered in.
struct Registration {
    priority: i32,
    loader: Arc<dyn VariableLoader>,
}

/// A registry of variable loaders.
///
/// Loaders run in ascending priority order, ties in registration order.
/// Lower priorities run first, so higher priorities win when two loaders
/// write the same key. The registry is built once per run and handed to
/// whatever drives the render pipeline.
#[derive(Default)]
pub struct VariableRegistry {
    loaders: Vec<Registration>,
}

impl VariableRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            loaders: Vec::new(),
        }
    }

    /// Register a loader at `priority`, which must be in `[0, MAX_PRIORITY)`.
    pub fn register(&mut self, priority: i32, loader: Arc<dyn VariableLoader>) -> VarsResult<()> {
        if !(0..MAX_PRIORITY).contains(&priority) {
            return Err(VarsError::InvalidPriority(priority));
        }

        debug!("Registering loader {} at priority {}", loader.name(), priority);
        self.loaders.push(Registration { priority, loader });
        Ok(())
    }

    /// Register a synchronous closure as a loader.
    pub fn register_fn<F>(&mut self, priority: i32, name: impl Into<String>, func: F) -> VarsResult<()>
    where
        F: Fn(&mut Variables, &ExtraArgs) -> VarsResult<()> + Send + Sync + 'static,
    {
        self.register(priority, Arc::new(FnLoader::new(name, func)))
    }

    /// Parse a declarative variable file now and register its contents.
    ///
    /// Any read or parse failure is reported as a load error naming the
    /// file, before anything runs.
    pub fn register_file(&mut self, priority: i32, path: &Path) -> VarsResult<()> {
        let vars = files::load_file(path)?;
        info!("Loaded {} variables from {}", vars.len(), path.display());
        self.register(priority, Arc::new(StaticLoader::from_source(path, vars)))
    }

    /// Parse every variable file in a directory and register the merged
    /// result as one loader.
    pub fn register_directory(&mut self, priority: i32, dir: &Path) -> VarsResult<()> {
        let vars = files::load_directory(dir)?;
        info!("Loaded {} variables from {}", vars.len(), dir.display());
        self.register(priority, Arc::new(StaticLoader::from_source(dir, vars)))
    }

    /// Run every loader in order and return the merged variables.
    ///
    /// Loaders run strictly one after another. The first failure stops the
    /// pass and is returned.
    pub async fn load_variables(&self, extra: &ExtraArgs) -> VarsResult<Variables> {
        let mut vars = Variables::new();

        for registration in self.ordered() {
            debug!(
                "Running loader {} (priority {})",
                registration.loader.name(),
                registration.priority
            );
            registration.loader.load(&mut vars, extra).await?;
        }

        Ok(vars)
    }

    /// Registrations sorted by priority. `sort_by_key` is stable, which keeps
    /// registration order among equal priorities.
    fn ordered(&self) -> Vec<&Registration> {
        let mut ordered: Vec<&Registration> = self.loaders.iter().collect();
        ordered.sort_by_key(|r| r.priority);
        ordered
    }

    /// Loader names in the order they will run.
    pub fn execution_order(&self) -> Vec<&str> {
        self.ordered().into_iter().map(|r| r.loader.name()).collect()
    }

    /// Get the number of registered loaders.
    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

impl std::fmt::Debug for VariableRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableRegistry")
            .field(
                "loaders",
                &self
                    .loaders
                    .iter()
                    .map(|r| (r.priority, r.loader.name()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
