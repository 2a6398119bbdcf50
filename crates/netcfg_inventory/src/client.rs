//! Inventory API client.
//!
//! Wraps an [`InventoryTransport`] with the behaviour every caller relies on:
//! transparent retry on HTTP 429, status checking, JSON decoding, single
//! record lookups, and concurrent pagination.

use std::sync::Arc;

use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{InventoryConfig, RetryPolicy, DEFAULT_PAGE_SIZE};
use crate::error::{InventoryError, InventoryResult};
use crate::models::{Device, ListPage};
use crate::transport::{HttpTransport, InventoryTransport, QueryParams, RawResponse};

pub const DEVICES_PATH: &str = "/dcim/devices/";
pub const INTERFACES_PATH: &str = "/dcim/interfaces/";
pub const IP_ADDRESSES_PATH: &str = "/ipam/ip-addresses/";
pub const SITES_PATH: &str = "/dcim/sites/";

/// Client for the inventory REST API.
///
/// The client owns its connection pool. Dropping it releases every
/// connection, so scoping a client to one resolution pass releases the
/// network resources on success and on every error path alike.
pub struct InventoryClient {
    transport: Arc<dyn InventoryTransport>,
    retry: RetryPolicy,
    page_size: usize,
}

impl InventoryClient {
    /// Connect using explicit settings.
    pub fn connect(config: &InventoryConfig) -> InventoryResult<Self> {
        info!("Connecting to inventory at {}", config.api_url());
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(Arc::new(transport)).with_page_size(config.page_size))
    }

    /// Connect using `NETBOX_ADDR` / `NETBOX_TOKEN` from the environment.
    pub fn from_env() -> InventoryResult<Self> {
        Self::connect(&InventoryConfig::from_env()?)
    }

    /// Build a client over any transport.
    pub fn with_transport(transport: Arc<dyn InventoryTransport>) -> Self {
        Self {
            transport,
            retry: RetryPolicy::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Replace the rate-limit retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the default page size for [`Self::fetch_paginated`].
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Issue one GET, retrying while the API answers 429.
    async fn request(&self, path: &str, params: &QueryParams) -> InventoryResult<RawResponse> {
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let response = self.transport.get(path, params).await?;

            if !response.is_rate_limited() {
                return Ok(response);
            }

            if !self.retry.allows(attempts) {
                return Err(InventoryError::RateLimited {
                    path: path.to_string(),
                    attempts,
                });
            }

            let delay = self.retry.delay_for(attempts);
            warn!(
                "Rate limited on {} (attempt {}), retrying in {:?}",
                path, attempts, delay
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// GET `path` and decode the JSON body. Non-2xx statuses other than 429
    /// fail immediately.
    pub async fn get(&self, path: &str, params: &QueryParams) -> InventoryResult<Value> {
        self.get_as(path, params).await
    }

    /// GET `path` and decode the body into `T`.
    pub async fn get_as<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &QueryParams,
    ) -> InventoryResult<T> {
        let response = self.request(path, params).await?;

        if !response.is_success() {
            return Err(InventoryError::Http {
                status: response.status,
                path: path.to_string(),
                body: response.body,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| InventoryError::UnexpectedResponse {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Run a filtered list query that must match exactly one record.
    ///
    /// `what` describes the record for the not-found message.
    pub async fn fetch_single<T: DeserializeOwned>(
        &self,
        path: &str,
        filters: &QueryParams,
        what: &str,
    ) -> InventoryResult<T> {
        let page: ListPage<T> = self.get_as(path, filters).await?;

        if page.count != 1 {
            debug!("{} matched {} records on {}", what, page.count, path);
            return Err(InventoryError::NotFound(format!(
                "{} not found in inventory (matched {} records)",
                what, page.count
            )));
        }

        page.results
            .into_iter()
            .next()
            .ok_or_else(|| InventoryError::UnexpectedResponse {
                path: path.to_string(),
                message: "count was 1 but results were empty".to_string(),
            })
    }

    /// Fetch every record behind a list endpoint.
    ///
    /// A first request with `limit=1` discovers the total count, then one
    /// request per page is issued concurrently. Each page request owns its
    /// own parameter list so every one carries its own offset. The pages are
    /// flattened in offset order.
    pub async fn fetch_paginated(
        &self,
        path: &str,
        page_size: Option<usize>,
        filters: Option<&QueryParams>,
    ) -> InventoryResult<Vec<Value>> {
        let filters: QueryParams = filters
            .map(|f| {
                f.iter()
                    .filter(|(k, _)| k != "limit" && k != "offset")
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        let page_size = page_size.unwrap_or(self.page_size).max(1);

        let mut probe = filters.clone();
        probe.push(("limit".to_string(), "1".to_string()));
        let first: ListPage<Value> = self.get_as(path, &probe).await?;
        let count = first.count;

        debug!(
            "Paginating {}: {} records in pages of {}",
            path, count, page_size
        );

        let requests = (0..count).step_by(page_size).map(|offset| {
            let mut params = filters.clone();
            params.push(("limit".to_string(), page_size.to_string()));
            params.push(("offset".to_string(), offset.to_string()));
            async move { self.get_as::<ListPage<Value>>(path, &params).await }
        });

        let pages = try_join_all(requests).await?;
        Ok(pages.into_iter().flat_map(|page| page.results).collect())
    }

    /// Paginated fetch decoded into typed records.
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        path: &str,
        filters: &QueryParams,
    ) -> InventoryResult<Vec<T>> {
        self.fetch_paginated(path, None, Some(filters))
            .await?
            .into_iter()
            .map(|record| serde_json::from_value(record).map_err(InventoryError::from))
            .collect()
    }

    /// Look up a device by its hostname.
    pub async fn fetch_device(&self, hostname: &str) -> InventoryResult<Device> {
        let filters = vec![("name".to_string(), hostname.to_string())];
        self.fetch_single(DEVICES_PATH, &filters, &format!("Device {}", hostname))
            .await
    }
}

impl std::fmt::Debug for InventoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryClient")
            .field("retry", &self.retry)
            .field("page_size", &self.page_size)
            .finish()
    }
}
