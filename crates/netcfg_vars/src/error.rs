//! Error types for variable loading.

use std::path::PathBuf;

use thiserror::Error;

use crate::registry::MAX_PRIORITY;

/// Result type alias for variable operations.
pub type VarsResult<T> = Result<T, VarsError>;

/// Errors that can occur while registering or running variable loaders.
#[derive(Error, Debug)]
pub enum VarsError {
    #[error("priority must be in [0 .. {}): {0}", MAX_PRIORITY)]
    InvalidPriority(i32),

    #[error("Unable to load variable file: {}: {message}", .path.display())]
    LoaderLoad { path: PathBuf, message: String },

    #[error("Missing loader argument: {0}")]
    MissingArgument(String),

    #[error("Environment variable {0} is not set and has no default")]
    UnsetEnvironment(String),

    #[error(transparent)]
    Inventory(#[from] netcfg_inventory::InventoryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VarsError {
    /// Wrap any displayable failure as a file-load error naming `path`.
    pub fn load(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::LoaderLoad {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
