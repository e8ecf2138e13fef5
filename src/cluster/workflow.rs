use tracing::{info, warn};

use super::kind::{ClusterCreateOptions, ClusterProvider};
use super::topology::{compose_topology_with_image, DEFAULT_NODE_IMAGE};
use crate::core::network::{ensure_network, NetworkService};
use crate::errors::{KindMultizoneError, Result};

const NETWORK_PREFIX: &str = "kmz";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterRequest {
    pub name: String,
    pub zones: u32,
    pub nodes_per_zone: u32,
    pub retain: bool,
    pub node_image: String,
    pub subnet: Option<String>,
    pub masquerade: bool,
}

impl ClusterRequest {
    pub fn new(name: impl Into<String>, zones: u32, nodes_per_zone: u32) -> Self {
        Self {
            name: name.into(),
            zones,
            nodes_per_zone,
            retain: false,
            node_image: DEFAULT_NODE_IMAGE.to_string(),
            subnet: None,
            masquerade: true,
        }
    }
}

pub fn network_name_for(cluster: &str) -> String {
    format!("{}-{}", NETWORK_PREFIX, cluster)
}

/// Provisions the cluster network, then hands the zoned topology to the
/// provider. Returns the id of the network the cluster was attached to.
///
/// A failed cluster create leaves the network in place; the next run's
/// duplicate cleanup replaces it.
pub async fn create_cluster<N, P>(
    networks: &N,
    provider: &P,
    request: &ClusterRequest,
) -> Result<String>
where
    N: NetworkService + ?Sized,
    P: ClusterProvider + ?Sized,
{
    info!(
        cluster = %request.name,
        zones = request.zones,
        nodes_per_zone = request.nodes_per_zone,
        "Creating multi-zone cluster"
    );

    match provider.list().await {
        Ok(existing) if existing.iter().any(|c| c == &request.name) => {
            warn!(cluster = %request.name, "A cluster with this name already exists");
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Could not list existing clusters"),
    }

    let network = network_name_for(&request.name);
    info!(network = %network, "Cluster network");

    let network_id = ensure_network(
        networks,
        &network,
        request.subnet.as_deref(),
        request.masquerade,
    )
    .await?;
    info!(network = %network, id = %network_id, "Network ready");

    let nodes = compose_topology_with_image(
        request.zones,
        request.nodes_per_zone,
        &request.node_image,
    );
    let options = ClusterCreateOptions {
        retain: request.retain,
        display_usage: true,
        network,
    };

    provider
        .create(&request.name, &nodes, &options)
        .await
        .map_err(|source| KindMultizoneError::ClusterCreate {
            name: request.name.clone(),
            source,
        })?;

    Ok(network_id)
}
