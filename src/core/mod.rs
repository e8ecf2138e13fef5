pub mod docker_manager;
pub mod errors;
pub mod network;

// exports
pub use docker_manager::DockerManager;
pub use errors::{NetworkServiceError, ProvisionError};
pub use network::{ensure_network, NetworkCreateOptions, NetworkService, NetworkSummary};
