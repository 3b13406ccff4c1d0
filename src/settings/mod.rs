//! Application configuration
//!
//! Groups the core configuration types under the tables used in
//! `config/default.toml`.

mod loader;

pub use loader::load_config;

use serde::Deserialize;
use vortex_core::{DiscoveryConfig, JoinTokenConfig, NodeConfig, SweeperConfig};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub join_token: JoinTokenConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub sweeper: SweeperConfig,
}

impl AppConfig {
    /// Node settings with the top-level token and discovery tables applied.
    pub fn node_config(&self) -> NodeConfig {
        NodeConfig {
            join_token: self.join_token.clone(),
            discovery: self.discovery.clone(),
            ..self.node.clone()
        }
    }
}
