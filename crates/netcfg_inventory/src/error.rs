//! Error types for the inventory client.

use thiserror::Error;

/// Result type alias for inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Errors that can occur while talking to the inventory API.
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Missing environment variable: {0}")]
    MissingConfig(String),

    #[error("Invalid configuration value for {name}: {message}")]
    InvalidConfig { name: String, message: String },

    #[error("{0}")]
    NotFound(String),

    #[error("HTTP {status} from {path}: {body}")]
    Http {
        status: u16,
        path: String,
        body: String,
    },

    #[error("Rate limited by inventory API on {path}, gave up after {attempts} attempts")]
    RateLimited { path: String, attempts: u32 },

    #[error("Unexpected response from {path}: {message}")]
    UnexpectedResponse { path: String, message: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl InventoryError {
    /// Whether the error means a lookup matched the wrong number of records.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
