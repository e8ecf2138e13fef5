//! In-memory stand-ins for docker and kind.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use kind_multizone::cluster::kind::{ClusterCreateOptions, ClusterProvider, ClusterProviderError};
use kind_multizone::cluster::topology::NodeSpec;
use kind_multizone::core::errors::NetworkServiceError;
use kind_multizone::core::network::{NetworkCreateOptions, NetworkService, NetworkSummary};

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkCall {
    List,
    Create(String, NetworkCreateOptions),
    Remove(String),
}

#[derive(Default)]
pub struct MockNetworkService {
    pub(crate) networks: Mutex<Vec<NetworkSummary>>,
    pub(crate) calls: Mutex<Vec<NetworkCall>>,
    pub(crate) next_id: AtomicUsize,
    pub fail_list: bool,
    pub fail_remove: bool,
    pub fail_create: bool,
}

impl MockNetworkService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_networks(networks: &[(&str, &str)]) -> Self {
        let service = Self::new();
        *service.networks.lock().unwrap() = networks
            .iter()
            .map(|(id, name)| NetworkSummary {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect();
        service
    }

    pub fn calls(&self) -> Vec<NetworkCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn networks(&self) -> Vec<NetworkSummary> {
        self.networks.lock().unwrap().clone()
    }

    pub fn named(&self, name: &str) -> Vec<NetworkSummary> {
        self.networks()
            .into_iter()
            .filter(|n| n.name == name)
            .collect()
    }

    pub fn mutating_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| !matches!(c, NetworkCall::List))
            .count()
    }

    fn api_error(&self, message: &str) -> NetworkServiceError {
        NetworkServiceError::Connection(message.to_string())
    }
}

#[async_trait]
impl NetworkService for MockNetworkService {
    async fn list(&self) -> Result<Vec<NetworkSummary>, NetworkServiceError> {
        self.calls.lock().unwrap().push(NetworkCall::List);
        if self.fail_list {
            return Err(self.api_error("daemon unreachable"));
        }
        Ok(self.networks())
    }

    async fn create(
        &self,
        name: &str,
        options: &NetworkCreateOptions,
    ) -> Result<String, NetworkServiceError> {
        self.calls
            .lock()
            .unwrap()
            .push(NetworkCall::Create(name.to_string(), options.clone()));
        if self.fail_create {
            return Err(self.api_error("create rejected"));
        }

        let mut networks = self.networks.lock().unwrap();
        // mirrors docker's check_duplicate
        if networks.iter().any(|n| n.name == name) {
            return Err(self.api_error("network with name already exists"));
        }
        let id = format!("net-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        networks.push(NetworkSummary {
            id: id.clone(),
            name: name.to_string(),
        });
        Ok(id)
    }

    async fn remove(&self, id: &str) -> Result<(), NetworkServiceError> {
        self.calls
            .lock()
            .unwrap()
            .push(NetworkCall::Remove(id.to_string()));
        if self.fail_remove {
            return Err(self.api_error("network has active endpoints"));
        }
        self.networks.lock().unwrap().retain(|n| n.id != id);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CreateCall {
    pub name: String,
    pub nodes: Vec<NodeSpec>,
    pub options: ClusterCreateOptions,
}

#[derive(Default)]
pub struct MockClusterProvider {
    pub(crate) creates: Mutex<Vec<CreateCall>>,
    pub existing: Vec<String>,
    pub fail_create: bool,
    pub fail_list: bool,
}

impl MockClusterProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn creates(&self) -> Vec<CreateCall> {
        self.creates.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClusterProvider for MockClusterProvider {
    async fn create(
        &self,
        name: &str,
        nodes: &[NodeSpec],
        options: &ClusterCreateOptions,
    ) -> Result<(), ClusterProviderError> {
        self.creates.lock().unwrap().push(CreateCall {
            name: name.to_string(),
            nodes: nodes.to_vec(),
            options: options.clone(),
        });
        if self.fail_create {
            return Err(ClusterProviderError::CommandFailed {
                command: "kind create cluster".to_string(),
                stderr: "ERROR: failed to create cluster: node(s) already exist".to_string(),
            });
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, ClusterProviderError> {
        if self.fail_list {
            return Err(ClusterProviderError::CommandFailed {
                command: "kind get clusters".to_string(),
                stderr: "boom".to_string(),
            });
        }
        Ok(self.existing.clone())
    }
}
