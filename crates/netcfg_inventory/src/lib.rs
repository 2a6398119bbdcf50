//! # netcfg_inventory
//!
//! Client for the device-inventory (NetBox) REST API used by netcfg-builder.
//!
//! The client hides the API's pagination and rate limiting from callers:
//!
//! - **Retry**: every request is retried with exponential backoff while the
//!   API answers HTTP 429; other error statuses fail immediately.
//! - **Pagination**: list endpoints are fetched with one concurrent request
//!   per page after a `limit=1` probe discovers the record count.
//! - **Single lookups**: filtered queries that must match exactly one record.
//!
//! ## Example
//!
//! ```rust,no_run
//! use netcfg_inventory::{InventoryClient, INTERFACES_PATH};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = InventoryClient::from_env()?;
//!     let device = client.fetch_device("nyc1rs21").await?;
//!
//!     let filters = vec![("device_id".to_string(), device.id.to_string())];
//!     let interfaces = client
//!         .fetch_paginated(INTERFACES_PATH, None, Some(&filters))
//!         .await?;
//!     println!("{} interfaces", interfaces.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod mock;
pub mod models;
pub mod transport;

pub use client::{
    InventoryClient, DEVICES_PATH, INTERFACES_PATH, IP_ADDRESSES_PATH, SITES_PATH,
};
pub use config::{InventoryConfig, RetryPolicy, DEFAULT_PAGE_SIZE, ENV_ADDR, ENV_TOKEN};
pub use error::{InventoryError, InventoryResult};
pub use mock::{CapturedRequest, MockTransport};
pub use models::{strip_prefix_len, Device, Interface, InterfaceRef, IpAddress, ListPage, Site, SiteRef};
pub use transport::{HttpTransport, InventoryTransport, QueryParams, RawResponse};
