//! Layered settings, lowest priority first:
//!
//! 1. hardcoded defaults
//! 2. `<CONFIG_PATH>/default.toml` (optional, `CONFIG_PATH` defaults to `config`)
//! 3. `<CONFIG_PATH>/local.toml` (optional)
//! 4. `KMZ__`-prefixed environment variables, e.g. `KMZ__NETWORK__SUBNET=10.0.0.0/24`
//!
//! An explicit file given with `--config` replaces layers 2 and 3.
//! Subnet and masquerade have no CLI flags; they are only reachable here.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::cluster::topology::DEFAULT_NODE_IMAGE;

pub const DEFAULT_CLUSTER_NAME: &str = "kind-multizone";
pub const DEFAULT_ZONES: u32 = 1;
pub const DEFAULT_NODES_PER_ZONE: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub cluster: ClusterSettings,
    pub network: NetworkSettings,
    pub kind: KindSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSettings {
    pub name: String,
    pub zones: u32,
    pub nodes_per_zone: u32,
    pub retain: bool,
    pub node_image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// Empty means the daemon picks the addressing.
    #[serde(default)]
    pub subnet: String,
    pub masquerade: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindSettings {
    pub binary: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config_path = std::env::var("CONFIG_PATH")
            .unwrap_or_else(|_| "config".to_string());

        info!("Loading configuration from path: {}", config_path);

        defaults()?
            .add_source(
                File::with_name(&format!("{}/default", config_path)).required(false),
            )
            .add_source(File::with_name(&format!("{}/local", config_path)).required(false))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    pub fn new_from_file(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading configuration from file: {}", path.display());

        defaults()?
            .add_source(File::from(path))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    pub fn subnet(&self) -> Option<&str> {
        Some(self.network.subnet.as_str()).filter(|s| !s.is_empty())
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("cluster.name", DEFAULT_CLUSTER_NAME)?
        .set_default("cluster.zones", i64::from(DEFAULT_ZONES))?
        .set_default("cluster.nodes_per_zone", i64::from(DEFAULT_NODES_PER_ZONE))?
        .set_default("cluster.retain", false)?
        .set_default("cluster.node_image", DEFAULT_NODE_IMAGE)?
        .set_default("network.subnet", "")?
        .set_default("network.masquerade", true)?
        .set_default("kind.binary", "kind")
}

fn environment() -> Environment {
    Environment::with_prefix("KMZ")
        .prefix_separator("__")
        .separator("__")
}

pub fn generate_default_config() -> Settings {
    Settings {
        cluster: ClusterSettings {
            name: DEFAULT_CLUSTER_NAME.to_string(),
            zones: DEFAULT_ZONES,
            nodes_per_zone: DEFAULT_NODES_PER_ZONE,
            retain: false,
            node_image: DEFAULT_NODE_IMAGE.to_string(),
        },
        network: NetworkSettings {
            subnet: String::new(),
            masquerade: true,
        },
        kind: KindSettings {
            binary: "kind".to_string(),
        },
    }
}
