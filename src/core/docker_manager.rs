use async_trait::async_trait;
use bollard::models::{Ipam, IpamConfig};
use bollard::network::{CreateNetworkOptions, ListNetworksOptions};
use bollard::Docker;
use std::collections::HashMap;
use tracing::{debug, info};

use super::errors::NetworkServiceError;
use super::network::{NetworkCreateOptions, NetworkService, NetworkSummary};

const BRIDGE_DRIVER: &str = "bridge";

/// [`NetworkService`] backed by the local Docker daemon.
#[derive(Clone)]
pub struct DockerManager {
    docker: Docker,
}

impl DockerManager {
    /// Connects using the local defaults (`DOCKER_HOST` or the unix socket).
    pub fn new() -> Result<Self, NetworkServiceError> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| NetworkServiceError::Connection(e.to_string()))?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl NetworkService for DockerManager {
    async fn list(&self) -> Result<Vec<NetworkSummary>, NetworkServiceError> {
        let networks = self
            .docker
            .list_networks(None::<ListNetworksOptions<String>>)
            .await?;

        Ok(networks
            .into_iter()
            .filter_map(|n| {
                Some(NetworkSummary {
                    id: n.id?,
                    name: n.name.unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn create(
        &self,
        name: &str,
        options: &NetworkCreateOptions,
    ) -> Result<String, NetworkServiceError> {
        info!("🐳 Creating docker network: {}", name);

        let ipam = match &options.ipam {
            Some(block) => Ipam {
                config: Some(vec![IpamConfig {
                    subnet: Some(block.subnet.clone()),
                    ip_range: Some(block.ip_range.clone()),
                    gateway: block.gateway.clone(),
                    ..Default::default()
                }]),
                ..Default::default()
            },
            None => Ipam::default(),
        };

        let driver_options: HashMap<&str, &str> = options
            .driver_options
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        let request = CreateNetworkOptions {
            name,
            check_duplicate: true,
            driver: BRIDGE_DRIVER,
            attachable: options.attachable,
            ipam,
            options: driver_options,
            ..Default::default()
        };

        let response = self.docker.create_network(request).await?;
        if let Some(warning) = response.warning.filter(|w| !w.is_empty()) {
            debug!(network = %name, %warning, "Docker returned a warning on create");
        }

        response
            .id
            .ok_or_else(|| NetworkServiceError::MissingId(name.to_string()))
    }

    async fn remove(&self, id: &str) -> Result<(), NetworkServiceError> {
        info!("🐳 Deleting docker network: {}", id);
        self.docker.remove_network(id).await?;
        Ok(())
    }
}
