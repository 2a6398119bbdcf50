//! Transport trait and the reqwest-backed HTTP implementation.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use tracing::debug;

use crate::config::InventoryConfig;
use crate::error::{InventoryError, InventoryResult};

/// Query parameters for a request, in insertion order.
pub type QueryParams = Vec<(String, String)>;

/// Undecoded response from the inventory API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body text
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// HTTP 429 Too Many Requests.
    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

/// A single GET against the inventory API.
///
/// Implementations perform exactly one request per call. Retry and status
/// handling live in [`crate::InventoryClient`].
#[async_trait]
pub trait InventoryTransport: Send + Sync {
    /// Issue a GET for `path` (relative to the API root) with `params`.
    async fn get(&self, path: &str, params: &QueryParams) -> InventoryResult<RawResponse>;
}

/// HTTP transport over a pooled reqwest client.
pub struct HttpTransport {
    api_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build the transport from connection settings.
    pub fn new(config: &InventoryConfig) -> InventoryResult<Self> {
        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(&format!("Token {}", config.token)).map_err(|e| {
            InventoryError::InvalidConfig {
                name: crate::config::ENV_TOKEN.to_string(),
                message: e.to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, token);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self {
            api_url: config.api_url(),
            client,
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl InventoryTransport for HttpTransport {
    async fn get(&self, path: &str, params: &QueryParams) -> InventoryResult<RawResponse> {
        let url = self.url_for(path);
        debug!("GET {} {:?}", url, params);

        let response = self.client.get(&url).query(params).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(RawResponse { status, body })
    }
}
