//! Inventory record types.
//!
//! Only the fields the variable pipeline reads are modelled; everything else
//! in the API payloads is ignored.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Envelope returned by every list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPage<T> {
    pub count: usize,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Nested site reference on a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRef {
    pub id: u64,
    pub slug: String,
}

/// A device record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: u64,
    pub name: String,
    pub site: SiteRef,
    /// Rendered hierarchical context data
    #[serde(default)]
    pub config_context: Option<Map<String, Value>>,
    /// Device-local context data
    #[serde(default)]
    pub local_context_data: Option<Map<String, Value>>,
}

/// An interface record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Reference to the interface an address is assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceRef {
    pub name: String,
}

/// An IP address record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpAddress {
    /// Address with prefix length, e.g. `10.0.0.1/32`
    pub address: String,
    #[serde(default)]
    pub interface: Option<InterfaceRef>,
    #[serde(default)]
    pub assigned_object: Option<InterfaceRef>,
}

impl IpAddress {
    /// Name of the interface the address is bound to, whichever field
    /// the API version uses.
    pub fn interface_name(&self) -> Option<&str> {
        self.interface
            .as_ref()
            .or(self.assigned_object.as_ref())
            .map(|i| i.name.as_str())
    }

    /// The address with the prefix length removed.
    pub fn host(&self) -> &str {
        strip_prefix_len(&self.address)
    }
}

/// A site record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    #[serde(default)]
    pub asn: Option<Value>,
}

/// Drop the `/len` suffix of a CIDR string.
pub fn strip_prefix_len(cidr: &str) -> &str {
    cidr.split('/').next().unwrap_or(cidr)
}
