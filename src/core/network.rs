//! Idempotent provisioning of the cluster's bridge network.
//!
//! [`ensure_network`] lists every network known to the backend, removes any
//! whose name matches the requested one, then creates a fresh network with
//! deterministic options. Nothing here retries: the first failing stage ends
//! the run and is reported as its own [`ProvisionError`] variant.
//!
//! Two processes provisioning the same name can still race between the list
//! and the create. The Docker backend asks the daemon to reject duplicate
//! names on create, so the loser fails with `NetworkCreate` rather than
//! producing a second network under the same name.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use ipnetwork::{IpNetworkError, Ipv4Network};
use tracing::{debug, info, warn};

use super::errors::{NetworkServiceError, ProvisionError};

pub const BRIDGE_NAME_OPTION: &str = "com.docker.network.bridge.name";
pub const MTU_OPTION: &str = "com.docker.network.driver.mtu";
pub const MASQUERADE_OPTION: &str = "com.docker.network.bridge.enable_ip_masquerade";

pub const NETWORK_MTU: u32 = 1500;

/// Prefix length of the dynamic allocation range carved out of a declared subnet.
pub const IP_RANGE_PREFIX: u8 = 27;

/// A network as reported by [`NetworkService::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSummary {
    pub id: String,
    pub name: String,
}

/// Addressing block requested on create. A `None` gateway lets the service
/// pick the first usable address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpamBlock {
    pub subnet: String,
    pub ip_range: String,
    pub gateway: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkCreateOptions {
    pub attachable: bool,
    pub driver_options: HashMap<String, String>,
    pub ipam: Option<IpamBlock>,
}

#[async_trait]
pub trait NetworkService: Send + Sync {
    async fn list(&self) -> Result<Vec<NetworkSummary>, NetworkServiceError>;

    /// Creates a network and returns the id assigned by the service.
    async fn create(
        &self,
        name: &str,
        options: &NetworkCreateOptions,
    ) -> Result<String, NetworkServiceError>;

    async fn remove(&self, id: &str) -> Result<(), NetworkServiceError>;
}

/// Makes sure exactly one freshly created network named `name` exists and
/// returns its id.
///
/// An empty `subnet` is treated the same as `None`. The subnet is parsed only
/// after stale networks have been removed, so an invalid subnet still leaves
/// the name cleared.
pub async fn ensure_network<S>(
    service: &S,
    name: &str,
    subnet: Option<&str>,
    masquerade: bool,
) -> Result<String, ProvisionError>
where
    S: NetworkService + ?Sized,
{
    let networks = service.list().await.map_err(ProvisionError::NetworkList)?;
    debug!(count = networks.len(), "Listed existing networks");

    for stale in networks.iter().filter(|n| n.name == name) {
        warn!(network = %name, id = %stale.id, "Duplicate network found, deleting before recreate");
        service
            .remove(&stale.id)
            .await
            .map_err(|source| ProvisionError::NetworkDelete {
                name: name.to_string(),
                id: stale.id.clone(),
                source,
            })?;
        info!(network = %name, id = %stale.id, "Deleted stale network");
    }

    let options = network_options(name, subnet.filter(|s| !s.is_empty()), masquerade)?;
    let id = service
        .create(name, &options)
        .await
        .map_err(|source| ProvisionError::NetworkCreate {
            name: name.to_string(),
            source,
        })?;

    info!(network = %name, id = %id, "Created network");
    Ok(id)
}

/// Builds the create options for `name`.
pub fn network_options(
    name: &str,
    subnet: Option<&str>,
    masquerade: bool,
) -> Result<NetworkCreateOptions, ProvisionError> {
    let driver_options = HashMap::from([
        (BRIDGE_NAME_OPTION.to_string(), name.to_string()),
        (MTU_OPTION.to_string(), NETWORK_MTU.to_string()),
        (MASQUERADE_OPTION.to_string(), masquerade.to_string()),
    ]);

    let ipam = match subnet {
        Some(subnet) => {
            let ip_range = derive_ip_range(subnet)?;
            Some(IpamBlock {
                subnet: subnet.to_string(),
                ip_range: ip_range.to_string(),
                gateway: None,
            })
        }
        None => None,
    };

    Ok(NetworkCreateOptions {
        attachable: true,
        driver_options,
        ipam,
    })
}

/// Forces the parsed subnet's network base to a /27, reserving 32 addresses
/// for dynamic allocation and leaving the rest of the subnet for static use.
///
/// Only `address/prefix-length` is accepted; bare addresses and dotted
/// netmask suffixes are rejected.
pub fn derive_ip_range(subnet: &str) -> Result<Ipv4Network, ProvisionError> {
    let invalid = |source| ProvisionError::InvalidSubnet {
        subnet: subnet.to_string(),
        source,
    };

    let has_prefix_len = subnet
        .split_once('/')
        .map(|(_, len)| !len.is_empty() && len.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false);
    if !has_prefix_len {
        return Err(invalid(IpNetworkError::InvalidCidrFormat(format!(
            "{} is not in address/prefix-length form",
            subnet
        ))));
    }

    let parsed = Ipv4Network::from_str(subnet).map_err(invalid)?;
    Ipv4Network::new(parsed.network(), IP_RANGE_PREFIX).map_err(invalid)
}
