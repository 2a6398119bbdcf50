//! Device variables sourced from the inventory.
//!
//! [`DeviceVariableLoader`] resolves the canonical per-device variable set:
//!
//! | key              | value                                                |
//! |------------------|------------------------------------------------------|
//! | `hostname`       | device name                                          |
//! | `site`           | site slug                                            |
//! | `ASN`            | site ASN, or empty string                            |
//! | `INTF_DESC`      | interface name → description (empty if unset)        |
//! | `INTF_IPADDR`    | interface name → address with prefix length          |
//! | `pim_rp_address` | rendezvous-point address, prefix length removed      |
//!
//! The device's `config_context` and then `local_context_data` are merged
//! last and may overwrite any of the keys above.

use std::sync::Arc;

use async_trait::async_trait;
use netcfg_inventory::{
    strip_prefix_len, Device, InventoryClient, InventoryConfig, InventoryResult,
    Interface, IpAddress, QueryParams, Site, INTERFACES_PATH, IP_ADDRESSES_PATH, SITES_PATH,
};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::context::{merge_into, ExtraArgs, Variables};
use crate::error::{VarsError, VarsResult};
use crate::loader::VariableLoader;

/// Hostname suffix of the first member of a redundant route-server pair.
pub const PAIR_PRIMARY_SUFFIX: &str = "rs21";
/// Hostname suffix of the second member.
pub const PAIR_PEER_SUFFIX: &str = "rs22";
/// Interface whose address seeds the rendezvous point.
pub const LOOPBACK: &str = "loopback0";

type Connector = dyn Fn() -> InventoryResult<InventoryClient> + Send + Sync;

/// Loader producing device variables from the inventory.
///
/// A fresh client is opened for every pass and dropped before `load`
/// returns, releasing its connections on every exit path.
pub struct DeviceVariableLoader {
    connect: Arc<Connector>,
}

impl DeviceVariableLoader {
    /// Loader connecting with explicit settings.
    pub fn new(config: InventoryConfig) -> Self {
        Self::with_connector(move || InventoryClient::connect(&config))
    }

    /// Loader reading its settings from the environment when it runs.
    pub fn from_env() -> Self {
        Self::with_connector(InventoryClient::from_env)
    }

    /// Loader using a custom client factory.
    pub fn with_connector<F>(connect: F) -> Self
    where
        F: Fn() -> InventoryResult<InventoryClient> + Send + Sync + 'static,
    {
        Self {
            connect: Arc::new(connect),
        }
    }
}

#[async_trait]
impl VariableLoader for DeviceVariableLoader {
    fn name(&self) -> &str {
        "inventory-device"
    }

    async fn load(&self, vars: &mut Variables, extra: &ExtraArgs) -> VarsResult<()> {
        let hostname = extra
            .hostname
            .as_deref()
            .ok_or_else(|| VarsError::MissingArgument("hostname".to_string()))?;

        let client = (self.connect)()?;
        let device_vars = resolve_device(&client, hostname).await?;
        drop(client);

        merge_into(vars, &device_vars);
        Ok(())
    }
}

/// Hostname of the redundant-pair peer whose loopback provides the
/// rendezvous point, if `hostname` names a pair primary.
///
/// This relies on the hostname convention rather than inventory topology.
pub fn pair_peer(hostname: &str) -> Option<String> {
    hostname
        .strip_suffix(PAIR_PRIMARY_SUFFIX)
        .map(|stem| format!("{}{}", stem, PAIR_PEER_SUFFIX))
}

/// Resolve the full variable set for `hostname`.
pub async fn resolve_device(client: &InventoryClient, hostname: &str) -> VarsResult<Variables> {
    let device = client.fetch_device(hostname).await?;
    info!("Resolving variables for {} (id {})", device.name, device.id);

    let by_device: QueryParams = vec![("device_id".to_string(), device.id.to_string())];
    let site_path = format!("{}{}/", SITES_PATH, device.site.id);
    let no_params = QueryParams::new();

    let (interfaces, addresses, site) = tokio::try_join!(
        client.fetch_all::<Interface>(INTERFACES_PATH, &by_device),
        client.fetch_all::<IpAddress>(IP_ADDRESSES_PATH, &by_device),
        client.get_as::<Site>(&site_path, &no_params),
    )?;

    let peer_rp = match pair_peer(hostname) {
        Some(peer) => Some(fetch_peer_loopback(client, &peer).await?),
        None => None,
    };

    debug!(
        "{}: {} interfaces, {} addresses",
        hostname,
        interfaces.len(),
        addresses.len()
    );

    Ok(assemble(&device, &interfaces, &addresses, &site, peer_rp))
}

async fn fetch_peer_loopback(client: &InventoryClient, peer: &str) -> VarsResult<IpAddress> {
    let filters: QueryParams = vec![
        ("interface".to_string(), LOOPBACK.to_string()),
        ("device".to_string(), peer.to_string()),
    ];

    client
        .fetch_single::<IpAddress>(
            IP_ADDRESSES_PATH,
            &filters,
            &format!("{} address of pair peer {}", LOOPBACK, peer),
        )
        .await
        .map_err(VarsError::from)
}

/// Build the variable set from fetched records.
pub fn assemble(
    device: &Device,
    interfaces: &[Interface],
    addresses: &[IpAddress],
    site: &Site,
    peer_rp: Option<IpAddress>,
) -> Variables {
    let mut vars = Variables::new();

    vars.insert("hostname".into(), Value::String(device.name.clone()));
    vars.insert("site".into(), Value::String(device.site.slug.clone()));
    vars.insert(
        "ASN".into(),
        site.asn
            .clone()
            .filter(|asn| !asn.is_null())
            .unwrap_or_else(|| Value::String(String::new())),
    );

    let descriptions: Map<String, Value> = interfaces
        .iter()
        .map(|intf| {
            let desc = intf.description.clone().unwrap_or_default();
            (intf.name.clone(), Value::String(desc))
        })
        .collect();
    vars.insert("INTF_DESC".into(), Value::Object(descriptions));

    let ip_by_intf: Map<String, Value> = addresses
        .iter()
        .filter_map(|ip| {
            ip.interface_name()
                .map(|name| (name.to_string(), Value::String(ip.address.clone())))
        })
        .collect();

    let rp_cidr = peer_rp
        .map(|ip| ip.address)
        .or_else(|| {
            ip_by_intf
                .get(LOOPBACK)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        });
    vars.insert("INTF_IPADDR".into(), Value::Object(ip_by_intf));

    match rp_cidr {
        Some(cidr) => {
            vars.insert(
                "pim_rp_address".into(),
                Value::String(strip_prefix_len(&cidr).to_string()),
            );
        }
        None => warn!(
            "{} has no {} address; pim_rp_address left unset",
            device.name, LOOPBACK
        ),
    }

    if let Some(context) = &device.config_context {
        merge_into(&mut vars, context);
    }
    if let Some(context) = &device.local_context_data {
        merge_into(&mut vars, context);
    }

    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use netcfg_inventory::{InterfaceRef, SiteRef};
    use serde_json::json;

    fn device(config_context: Option<Value>, local: Option<Value>) -> Device {
        Device {
            id: 1,
            name: "nyc1le01".to_string(),
            site: SiteRef {
                id: 3,
                slug: "nyc1".to_string(),
            },
            config_context: config_context.and_then(|v| v.as_object().cloned()),
            local_context_data: local.and_then(|v| v.as_object().cloned()),
        }
    }

    fn ip(intf: &str, address: &str) -> IpAddress {
        IpAddress {
            address: address.to_string(),
            interface: Some(InterfaceRef {
                name: intf.to_string(),
            }),
            assigned_object: None,
        }
    }

    #[test]
    fn test_pair_peer() {
        assert_eq!(pair_peer("nycrs21"), Some("nycrs22".to_string()));
        assert_eq!(pair_peer("lab-core-rs21"), Some("lab-core-rs22".to_string()));
        assert_eq!(pair_peer("nycrs22"), None);
        assert_eq!(pair_peer("nycle01"), None);
    }

    #[test]
    fn test_assemble_defaults() {
        let interfaces = vec![
            Interface {
                name: "Ethernet1".to_string(),
                description: Some("uplink".to_string()),
            },
            Interface {
                name: "Ethernet2".to_string(),
                description: None,
            },
        ];
        let addresses = vec![ip("loopback0", "10.0.0.1/32"), ip("Ethernet1", "10.1.0.0/31")];
        let site = Site {
            asn: Some(json!(65001)),
        };

        let vars = assemble(&device(None, None), &interfaces, &addresses, &site, None);

        assert_eq!(vars["hostname"], json!("nyc1le01"));
        assert_eq!(vars["site"], json!("nyc1"));
        assert_eq!(vars["ASN"], json!(65001));
        assert_eq!(vars["INTF_DESC"], json!({ "Ethernet1": "uplink", "Ethernet2": "" }));
        assert_eq!(vars["INTF_IPADDR"]["Ethernet1"], json!("10.1.0.0/31"));
        assert_eq!(vars["pim_rp_address"], json!("10.0.0.1"));
    }

    #[test]
    fn test_assemble_peer_rp_wins() {
        let addresses = vec![ip("loopback0", "10.0.0.1/32")];
        let vars = assemble(
            &device(None, None),
            &[],
            &addresses,
            &Site { asn: None },
            Some(ip("loopback0", "10.0.0.2/32")),
        );

        assert_eq!(vars["pim_rp_address"], json!("10.0.0.2"));
        assert_eq!(vars["ASN"], json!(""));
    }

    #[test]
    fn test_assemble_without_loopback() {
        let vars = assemble(&device(None, None), &[], &[], &Site { asn: None }, None);
        assert!(!vars.contains_key("pim_rp_address"));
    }

    #[test]
    fn test_context_data_overrides_computed_values() {
        let dev = device(
            Some(json!({ "ASN": 65100, "ntp": ["a"] })),
            Some(json!({ "ntp": ["b"], "pim_rp_address": "192.0.2.9" })),
        );
        let vars = assemble(
            &dev,
            &[],
            &[ip("loopback0", "10.0.0.1/32")],
            &Site {
                asn: Some(json!(65001)),
            },
            None,
        );

        assert_eq!(vars["ASN"], json!(65100));
        assert_eq!(vars["ntp"], json!(["b"]));
        assert_eq!(vars["pim_rp_address"], json!("192.0.2.9"));
    }
}
