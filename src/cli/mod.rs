//! Command line surface.
//!
//! ```text
//! kind-multizone
//! ├── create    [--name] [--retain] [--zones] [--nodes-per-zone]
//! ├── topology  [--name] [--zones] [--nodes-per-zone]   // print kind config, no docker
//! └── init      [--force]                               // write config/default.toml
//! ```
//!
//! Flags win over configuration, which wins over the built-in defaults.

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::cluster::kind::KindProvider;
use crate::cluster::topology::{compose_topology_with_image, KindClusterConfig};
use crate::cluster::workflow::{create_cluster, network_name_for, ClusterRequest};
use crate::config::Settings;
use crate::core::DockerManager;
use crate::errors::Result;

#[derive(Parser, Debug)]
#[command(name = "kind-multizone")]
#[command(about = "Create multi-zone KinD clusters", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, value_name = "CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a multi-zone KinD cluster.
    ///
    /// A multi-zone cluster has nodes that span multiple availability zones.
    Create {
        #[command(flatten)]
        shape: ShapeArgs,

        /// Whether to retain nodes in case of cluster creation failure
        /// (`--retain` or `--retain=false`) [default: false]
        #[arg(
            long,
            num_args = 0..=1,
            default_missing_value = "true",
            require_equals = true
        )]
        retain: Option<bool>,
    },
    /// Print the kind cluster config for a topology without creating anything
    Topology {
        #[command(flatten)]
        shape: ShapeArgs,
    },
    /// Generate default configuration
    Init {
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ShapeArgs {
    /// Cluster name [default: kind-multizone]
    #[arg(long)]
    pub name: Option<String>,

    /// Number of zones to create [default: 1]
    #[arg(long)]
    pub zones: Option<u32>,

    /// Number of nodes to create per zone [default: 1]
    #[arg(long = "nodes-per-zone")]
    pub nodes_per_zone: Option<u32>,
}

impl Cli {
    pub fn try_parse_args() -> Result<Self> {
        Ok(Self::try_parse()?)
    }
}

/// Merges flags over settings.
pub fn build_request(
    shape: &ShapeArgs,
    retain: Option<bool>,
    settings: &Settings,
) -> ClusterRequest {
    ClusterRequest {
        name: shape
            .name
            .clone()
            .unwrap_or_else(|| settings.cluster.name.clone()),
        zones: shape.zones.unwrap_or(settings.cluster.zones),
        nodes_per_zone: shape.nodes_per_zone.unwrap_or(settings.cluster.nodes_per_zone),
        retain: retain.unwrap_or(settings.cluster.retain),
        node_image: settings.cluster.node_image.clone(),
        subnet: settings.subnet().map(String::from),
        masquerade: settings.network.masquerade,
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Create { shape, retain } => {
            let settings = load_settings(cli.config.as_deref())?;
            let request = build_request(&shape, retain, &settings);
            handle_create_command(&request, &settings).await
        }
        Commands::Topology { shape } => {
            let settings = load_settings(cli.config.as_deref())?;
            handle_topology_command(&build_request(&shape, None, &settings))
        }
        Commands::Init { force } => handle_init_command(force),
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    Ok(match path {
        Some(path) => Settings::new_from_file(path)?,
        None => Settings::new()?,
    })
}

async fn handle_create_command(request: &ClusterRequest, settings: &Settings) -> Result<()> {
    println!("Number of zones: {}", request.zones);
    println!("Number of nodes per zone: {}", request.nodes_per_zone);
    println!("Cluster network: {}", network_name_for(&request.name));

    let docker = DockerManager::new()?;
    let provider = KindProvider::new(settings.kind.binary.clone());

    let network_id = create_cluster(&docker, &provider, request).await?;
    info!(cluster = %request.name, network_id = %network_id, "Cluster created");
    println!(
        "{} Cluster '{}' created on network {}",
        "✓".green(),
        request.name,
        network_name_for(&request.name)
    );
    Ok(())
}

fn handle_topology_command(request: &ClusterRequest) -> Result<()> {
    let nodes = compose_topology_with_image(
        request.zones,
        request.nodes_per_zone,
        &request.node_image,
    );
    let yaml = KindClusterConfig::new(&request.name, &nodes).to_yaml()?;
    print!("{}", yaml);
    Ok(())
}

fn handle_init_command(force: bool) -> Result<()> {
    let config_dir = PathBuf::from("config");
    let target = config_dir.join("default.toml");
    if target.exists() && !force {
        error!("Configuration file already exists. Use --force to overwrite.");
        return Ok(());
    }

    std::fs::create_dir_all(&config_dir)?;
    let default_config = crate::config::generate_default_config();
    let config_str = toml::to_string_pretty(&default_config)?;
    std::fs::write(&target, config_str)?;

    println!("{} Default configuration generated", "✓".green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::generate_default_config;

    #[test]
    fn test_parse_create_flags() {
        let cli = Cli::try_parse_from([
            "kind-multizone",
            "create",
            "--name",
            "demo",
            "--zones",
            "3",
            "--nodes-per-zone",
            "2",
            "--retain",
        ])
        .unwrap();

        match cli.command {
            Commands::Create { shape, retain } => {
                assert_eq!(shape.name.as_deref(), Some("demo"));
                assert_eq!(shape.zones, Some(3));
                assert_eq!(shape.nodes_per_zone, Some(2));
                assert_eq!(retain, Some(true));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_flag_is_rejected() {
        let err = Cli::try_parse_from(["kind-multizone", "create", "--zones", "many"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_request_falls_back_to_settings() {
        let mut settings = generate_default_config();
        settings.network.subnet = "10.0.0.0/24".to_string();

        let request = build_request(&ShapeArgs::default(), None, &settings);
        assert_eq!(request.name, "kind-multizone");
        assert_eq!(request.zones, 1);
        assert_eq!(request.nodes_per_zone, 1);
        assert!(!request.retain);
        assert!(request.masquerade);
        assert_eq!(request.subnet.as_deref(), Some("10.0.0.0/24"));
    }

    #[test]
    fn test_flags_override_settings() {
        let shape = ShapeArgs {
            name: Some("edge".to_string()),
            zones: Some(4),
            nodes_per_zone: Some(0),
        };
        let request = build_request(&shape, Some(true), &generate_default_config());
        assert_eq!(request.name, "edge");
        assert_eq!(request.zones, 4);
        assert_eq!(request.nodes_per_zone, 0);
        assert!(request.retain);
        assert_eq!(request.subnet, None);
    }

    #[test]
    fn test_retain_flag_can_disable_configured_retain() {
        let mut settings = generate_default_config();
        settings.cluster.retain = true;

        let cli =
            Cli::try_parse_from(["kind-multizone", "create", "--retain=false"]).unwrap();
        let retain = match cli.command {
            Commands::Create { retain, .. } => retain,
            other => panic!("unexpected command: {:?}", other),
        };
        assert_eq!(retain, Some(false));
        assert!(!build_request(&ShapeArgs::default(), retain, &settings).retain);

        let cli = Cli::try_parse_from(["kind-multizone", "create"]).unwrap();
        let retain = match cli.command {
            Commands::Create { retain, .. } => retain,
            other => panic!("unexpected command: {:?}", other),
        };
        assert_eq!(retain, None);
        assert!(build_request(&ShapeArgs::default(), retain, &settings).retain);
    }
}
