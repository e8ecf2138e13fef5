pub mod settings;

pub use settings::{
    generate_default_config, ClusterSettings, KindSettings, NetworkSettings, Settings,
};
