use thiserror::Error;

/// Failures reported by a [`NetworkService`](crate::core::network::NetworkService) backend.
#[derive(Error, Debug)]
pub enum NetworkServiceError {
    #[error("Docker connection error: {0}")]
    Connection(String),

    #[error("Docker API error: {0}")]
    Api(#[from] bollard::errors::Error),

    #[error("Network service returned no id for network {0}")]
    MissingId(String),
}

/// Failures of the ensure-network protocol, one variant per stage.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Failed to list networks: {0}")]
    NetworkList(#[source] NetworkServiceError),

    #[error("Failed to delete network {name} ({id}): {source}")]
    NetworkDelete {
        name: String,
        id: String,
        #[source]
        source: NetworkServiceError,
    },

    #[error("Failed to create network {name}: {source}")]
    NetworkCreate {
        name: String,
        #[source]
        source: NetworkServiceError,
    },

    #[error("Invalid subnet {subnet:?}: {source}")]
    InvalidSubnet {
        subnet: String,
        #[source]
        source: ipnetwork::IpNetworkError,
    },
}
