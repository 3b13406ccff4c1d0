//! Vortex Core - node membership and join tokens
//!
//! This crate provides the membership state of a Vortex instance:
//! - Node: local identity plus the set of trusted neighbors
//! - Join tokens: short-lived secrets that admit a new machine
//! - Secure random token values and primary address discovery
//! - A background sweeper for spent and expired tokens

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod join_token;
pub mod net;
pub mod node;
pub mod secure;
pub mod sweeper;

pub use config::{DiscoveryConfig, JoinTokenConfig, NodeConfig, SweeperConfig};
pub use error::{format_error_for_cli, Error, Result, UserFriendlyError};
pub use join_token::{JoinToken, JoinTokenState, TokenId};
pub use net::{primary_address, probe_address};
pub use node::{Node, NodeId, NodeIdentity};
pub use secure::generate_token;
pub use sweeper::spawn_token_sweeper;
