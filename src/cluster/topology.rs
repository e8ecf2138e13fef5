use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TOPOLOGY_ZONE_LABEL: &str = "topology.kubernetes.io/zone";
pub const DEFAULT_NODE_IMAGE: &str = "kindest/node:v1.31.4";

/// Control-plane replicas per cluster. Zone labels are indexed, so raising
/// this needs no other change.
pub const CONTROL_PLANE_REPLICAS: u32 = 1;

const KIND_API_VERSION: &str = "kind.x-k8s.io/v1alpha4";
const KIND_CLUSTER_KIND: &str = "Cluster";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeRole {
    ControlPlane,
    Worker,
}

/// One node of the cluster, in kind's `v1alpha4` node shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub role: NodeRole,
    pub image: String,
    pub labels: BTreeMap<String, String>,
}

impl NodeSpec {
    fn zoned(role: NodeRole, image: &str, zone: String) -> Self {
        Self {
            role,
            image: image.to_string(),
            labels: BTreeMap::from([(TOPOLOGY_ZONE_LABEL.to_string(), zone)]),
        }
    }

    pub fn zone(&self) -> Option<&str> {
        self.labels.get(TOPOLOGY_ZONE_LABEL).map(String::as_str)
    }
}

pub fn control_plane_zone(index: u32) -> String {
    format!("zone-controlplane-{}", index)
}

pub fn worker_zone(index: u32) -> String {
    format!("zone-workers-{}", index)
}

/// Lays out the control plane followed by `zone_count` zones of
/// `nodes_per_zone` workers each, using the default node image.
pub fn compose_topology(zone_count: u32, nodes_per_zone: u32) -> Vec<NodeSpec> {
    compose_topology_with_image(zone_count, nodes_per_zone, DEFAULT_NODE_IMAGE)
}

pub fn compose_topology_with_image(
    zone_count: u32,
    nodes_per_zone: u32,
    image: &str,
) -> Vec<NodeSpec> {
    let workers = zone_count as usize * nodes_per_zone as usize;
    let mut nodes = Vec::with_capacity(CONTROL_PLANE_REPLICAS as usize + workers);

    for i in 0..CONTROL_PLANE_REPLICAS {
        nodes.push(NodeSpec::zoned(
            NodeRole::ControlPlane,
            image,
            control_plane_zone(i),
        ));
    }

    for zone in 0..zone_count {
        for _ in 0..nodes_per_zone {
            nodes.push(NodeSpec::zoned(NodeRole::Worker, image, worker_zone(zone)));
        }
    }

    nodes
}

/// Cluster document fed to `kind create cluster --config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindClusterConfig {
    pub kind: String,
    pub api_version: String,
    pub name: String,
    pub nodes: Vec<NodeSpec>,
}

impl KindClusterConfig {
    pub fn new(name: &str, nodes: &[NodeSpec]) -> Self {
        Self {
            kind: KIND_CLUSTER_KIND.to_string(),
            api_version: KIND_API_VERSION.to_string(),
            name: name.to_string(),
            nodes: nodes.to_vec(),
        }
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
