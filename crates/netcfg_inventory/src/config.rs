//! Inventory connection and retry configuration.

use std::time::Duration;

use crate::error::{InventoryError, InventoryResult};

/// Environment variable holding the inventory base address.
pub const ENV_ADDR: &str = "NETBOX_ADDR";
/// Environment variable holding the API token.
pub const ENV_TOKEN: &str = "NETBOX_TOKEN";
/// Optional request timeout in seconds.
pub const ENV_TIMEOUT: &str = "NETBOX_TIMEOUT";
/// Optional flag enabling TLS certificate verification.
pub const ENV_VERIFY_TLS: &str = "NETBOX_VERIFY_TLS";

/// Default number of records requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the inventory API.
#[derive(Debug, Clone)]
pub struct InventoryConfig {
    /// Base address of the inventory instance, without the `/api` suffix
    pub base_url: String,
    /// API token
    pub token: String,
    /// Client-level timeout applied to every request
    pub timeout: Duration,
    /// Verify the server TLS certificate
    pub verify_tls: bool,
    /// Records per page for paginated fetches
    pub page_size: usize,
}

impl InventoryConfig {
    /// Create a configuration with default timeout and page size.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            verify_tls: false,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Build the configuration from the process environment.
    ///
    /// `NETBOX_ADDR` and `NETBOX_TOKEN` are required; the error names the
    /// first one that is missing.
    pub fn from_env() -> InventoryResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> InventoryResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| InventoryError::MissingConfig(name.to_string()))
        };

        let mut config = Self::new(required(ENV_ADDR)?, required(ENV_TOKEN)?);

        if let Some(raw) = lookup(ENV_TIMEOUT) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| InventoryError::InvalidConfig {
                    name: ENV_TIMEOUT.to_string(),
                    message: e.to_string(),
                })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup(ENV_VERIFY_TLS) {
            config.verify_tls = matches!(
                raw.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        Ok(config)
    }

    /// The API root, `<base_url>/api`.
    pub fn api_url(&self) -> String {
        format!("{}/api", self.base_url.trim_end_matches('/'))
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable TLS verification.
    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Set the page size used by paginated fetches.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

/// Exponential backoff applied to rate-limited requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry
    pub min_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Total attempts allowed; `None` retries forever
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(10),
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    /// Policy with explicit delay bounds and unbounded attempts.
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            min_delay,
            max_delay,
            max_attempts: None,
        }
    }

    /// Cap the number of attempts.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts.max(1));
        self
    }

    /// Delay to wait before retry number `retry` (1-based).
    ///
    /// Doubles from `min_delay` and saturates at `max_delay`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let shift = retry.saturating_sub(1).min(16);
        let delay = self.min_delay.saturating_mul(1u32 << shift);
        delay.min(self.max_delay)
    }

    /// Whether another attempt is allowed after `attempts` have been made.
    pub fn allows(&self, attempts: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempts < max)
    }
}
