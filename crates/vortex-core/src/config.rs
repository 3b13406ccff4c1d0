//! Configuration types for nodes and join tokens.
//!
//! Every struct deserializes from a partial TOML table; missing keys fall
//! back to the defaults below.

use crate::error::{Error, Result};
use crate::net::DEFAULT_PROBE_ADDR;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default RPC port advertised by a node.
pub const DEFAULT_NODE_PORT: u16 = 6414;

/// Default join token lifetime (5 minutes).
pub const DEFAULT_JOIN_TOKEN_TTL_SECS: u64 = 300;

/// Default join token value length.
pub const DEFAULT_JOIN_TOKEN_LENGTH: usize = 64;

/// Default period of the expired-token sweep.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Construction-time overrides for a [`Node`](crate::Node).
///
/// Unset fields are resolved when the node is built: the name from the
/// machine hostname, the host via primary address discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Display name
    pub name: Option<String>,
    /// Address peers should contact
    pub host: Option<String>,
    /// RPC port
    pub port: u16,
    /// Settings for tokens minted by this node
    pub join_token: JoinTokenConfig,
    /// Address discovery settings
    pub discovery: DiscoveryConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: None,
            host: None,
            port: DEFAULT_NODE_PORT,
            join_token: JoinTokenConfig::default(),
            discovery: DiscoveryConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Set the node name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the node host, skipping address discovery.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the node port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

/// Settings for minting a [`JoinToken`](crate::JoinToken).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinTokenConfig {
    /// Host the joiner should contact; discovered when unset
    pub host: Option<String>,
    /// Lifetime in seconds
    pub ttl_secs: u64,
    /// Number of symbols in the secret value
    pub length: usize,
}

impl Default for JoinTokenConfig {
    fn default() -> Self {
        Self {
            host: None,
            ttl_secs: DEFAULT_JOIN_TOKEN_TTL_SECS,
            length: DEFAULT_JOIN_TOKEN_LENGTH,
        }
    }
}

impl JoinTokenConfig {
    /// Set an explicit host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the lifetime.
    pub fn with_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Token lifetime as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Reject settings that would break the token invariants.
    ///
    /// A ttl that passes here can still overflow the calendar when added to
    /// the issue time; [`JoinToken::create`](crate::JoinToken::create)
    /// reports that case.
    pub fn validate(&self) -> Result<()> {
        if self.ttl_secs == 0 {
            return Err(Error::InvalidConfig {
                field: "join_token.ttl_secs".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        // chrono durations are bounded by i64 milliseconds
        if self.ttl_secs > i64::MAX as u64 / 1000 {
            return Err(Error::InvalidConfig {
                field: "join_token.ttl_secs".to_string(),
                message: "is too large".to_string(),
            });
        }
        if self.length == 0 {
            return Err(Error::InvalidConfig {
                field: "join_token.length".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if let Some(host) = &self.host {
            check_host("join_token.host", host)?;
        }
        Ok(())
    }
}

/// Reject a blank host override.
pub(crate) fn check_host(field: &str, host: &str) -> Result<()> {
    if host.trim().is_empty() {
        return Err(Error::InvalidConfig {
            field: field.to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Primary address discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Literal `ip:port` used to select the outbound interface
    pub probe_addr: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            probe_addr: DEFAULT_PROBE_ADDR.to_string(),
        }
    }
}

/// Expired-token sweep settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweeperConfig {
    /// Whether the sweep runs at all
    pub enabled: bool,
    /// Seconds between sweeps
    pub interval_secs: u64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

impl SweeperConfig {
    /// Sweep period, never shorter than one second.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs).max(crate::sweeper::MIN_SWEEP_PERIOD)
    }
}
