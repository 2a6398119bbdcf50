//! Error types for template rendering.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rendering a template.
#[derive(Error, Debug)]
pub enum RenderError {
    /// A template called `raise(...)`.
    #[error("{template}:{line}: {message}")]
    Raised {
        template: String,
        line: usize,
        message: String,
    },

    #[error("Template {} is outside the template root {}", .path.display(), .root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
