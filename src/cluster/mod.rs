pub mod kind;
pub mod topology;
pub mod workflow;

pub use kind::{ClusterCreateOptions, ClusterProvider, ClusterProviderError, KindProvider};
pub use topology::{compose_topology, KindClusterConfig, NodeRole, NodeSpec};
pub use workflow::{create_cluster, network_name_for, ClusterRequest};
