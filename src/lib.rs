pub mod cli;
pub mod cluster;
pub mod config;
pub mod core;
pub mod errors;

// Re-exports
pub use cluster::{compose_topology, create_cluster, ClusterProvider, ClusterRequest, KindProvider};
pub use core::{ensure_network, DockerManager, NetworkService};
pub use errors::{KindMultizoneError, Result};
