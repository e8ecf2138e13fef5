//! Cluster provider backed by the `kind` binary.

use std::process::Stdio;

use async_trait::async_trait;
use colored::Colorize;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use super::topology::{KindClusterConfig, NodeSpec};

/// Environment variable kind reads to pick the docker network for new nodes.
pub const KIND_NETWORK_ENV: &str = "KIND_EXPERIMENTAL_DOCKER_NETWORK";

#[derive(Error, Debug)]
pub enum ClusterProviderError {
    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Failed to render cluster config: {0}")]
    Render(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterCreateOptions {
    /// Keep nodes around when creation fails.
    pub retain: bool,
    pub display_usage: bool,
    /// Docker network the new nodes join.
    pub network: String,
}

#[async_trait]
pub trait ClusterProvider: Send + Sync {
    /// Materializes a cluster from `nodes`, keeping their order.
    async fn create(
        &self,
        name: &str,
        nodes: &[NodeSpec],
        options: &ClusterCreateOptions,
    ) -> Result<(), ClusterProviderError>;

    async fn list(&self) -> Result<Vec<String>, ClusterProviderError>;
}

#[derive(Debug, Clone)]
pub struct KindProvider {
    binary: String,
}

impl KindProvider {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn create_args(name: &str, retain: bool) -> Vec<String> {
        let mut args: Vec<String> = ["create", "cluster", "--name", name, "--config", "-"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        if retain {
            args.push("--retain".to_string());
        }
        args
    }

    fn spawn_error(&self, source: std::io::Error) -> ClusterProviderError {
        ClusterProviderError::Spawn {
            command: self.binary.clone(),
            source,
        }
    }
}

#[async_trait]
impl ClusterProvider for KindProvider {
    async fn create(
        &self,
        name: &str,
        nodes: &[NodeSpec],
        options: &ClusterCreateOptions,
    ) -> Result<(), ClusterProviderError> {
        let config = KindClusterConfig::new(name, nodes).to_yaml()?;
        debug!(cluster = %name, "Rendered kind config:\n{}", config);

        info!(
            cluster = %name,
            nodes = nodes.len(),
            network = %options.network,
            "Creating kind cluster"
        );

        // The network travels on the child's environment only, so it can
        // never leak into later operations in this process.
        let mut child = Command::new(&self.binary)
            .args(Self::create_args(name, options.retain))
            .env(KIND_NETWORK_ENV, &options.network)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(config.as_bytes())
                .await
                .map_err(|e| self.spawn_error(e))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(ClusterProviderError::CommandFailed {
                command: format!("{} create cluster", self.binary),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if options.display_usage {
            println!(
                "{} Cluster '{}' is up. Try:\n\n  kubectl cluster-info --context kind-{}\n",
                "✓".green(),
                name,
                name
            );
        }

        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, ClusterProviderError> {
        let output = Command::new(&self.binary)
            .args(["get", "clusters"])
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(ClusterProviderError::CommandFailed {
                command: format!("{} get clusters", self.binary),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(parse_cluster_list(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// `kind get clusters` prints one name per line, or a notice on stderr when
/// there are none.
fn parse_cluster_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
