use thiserror::Error;

use crate::cluster::kind::ClusterProviderError;
use crate::core::errors::{NetworkServiceError, ProvisionError};

#[derive(Error, Debug)]
pub enum KindMultizoneError {
    #[error("Flag Error: {0}")]
    Flag(#[from] clap::Error),

    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Docker Error: {0}")]
    Docker(#[from] NetworkServiceError),

    #[error("Network Error: {0}")]
    Network(#[from] ProvisionError),

    #[error("failed to create cluster {name}: {source}")]
    ClusterCreate {
        name: String,
        #[source]
        source: ClusterProviderError,
    },

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization Error: {0}")]
    Serialize(String),
}

impl KindMultizoneError {
    /// Stage the failure belongs to, for log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Flag(_) => "flags",
            Self::Config(_) => "config",
            Self::Docker(_) | Self::Network(_) => "network",
            Self::ClusterCreate { .. } => "cluster",
            Self::Io(_) | Self::Serialize(_) => "io",
        }
    }
}

impl From<toml::ser::Error> for KindMultizoneError {
    fn from(err: toml::ser::Error) -> Self {
        KindMultizoneError::Serialize(err.to_string())
    }
}

impl From<serde_yaml::Error> for KindMultizoneError {
    fn from(err: serde_yaml::Error) -> Self {
        KindMultizoneError::Serialize(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KindMultizoneError>;
