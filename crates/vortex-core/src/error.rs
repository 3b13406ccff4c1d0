//! Error types for vortex-core
//!
//! This module provides the error type shared by every membership operation
//! and user-friendly formatting for the command-line front end.

use crate::node::NodeId;
use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// The OS entropy source could not supply random bytes
    #[error("secure random generation failed: {0}")]
    Generation(#[source] rand::Error),

    /// No outbound route or interface could be found
    #[error("no outbound route: {0}")]
    NoRoute(#[source] std::io::Error),

    /// Hostname lookup failed while building a node
    #[error("hostname lookup failed: {0}")]
    Hostname(#[source] std::io::Error),

    /// Candidate is already a neighbor of this node
    #[error("node {name} ({id}) is already a neighbor")]
    AlreadyNeighbor {
        /// Candidate node ID
        id: NodeId,
        /// Candidate node name
        name: String,
    },

    /// A node cannot be its own neighbor
    #[error("node {0} cannot be its own neighbor")]
    SelfNeighbor(NodeId),

    /// No token with the presented value was issued by this node
    #[error("join token not found")]
    TokenNotFound,

    /// The token's lifetime has elapsed
    #[error("join token expired")]
    TokenExpired,

    /// The token was already used to admit a node
    #[error("join token already redeemed")]
    TokenAlreadyRedeemed,

    /// Invalid configuration
    #[error("invalid configuration: {field}")]
    InvalidConfig {
        /// Config field name
        field: String,
        /// Detailed message
        message: String,
    },
}

impl Error {
    /// Whether the caller can carry on after this error.
    ///
    /// Entropy, routing and hostname failures describe the host itself and
    /// will not go away on retry.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Error::Generation(_) | Error::NoRoute(_) | Error::Hostname(_)
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for user-friendly error messages
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get a suggestion for how to fix the error
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Error {
    fn user_message(&self) -> String {
        match self {
            Error::Generation(_) => {
                "🎲 The system entropy source is unavailable.".to_string()
            }
            Error::NoRoute(_) => "🌐 No outbound network route was found.".to_string(),
            Error::Hostname(_) => "🏷️ Could not read this machine's hostname.".to_string(),
            Error::AlreadyNeighbor { name, .. } => {
                format!("🔁 Node {} is already part of the network.", name)
            }
            Error::SelfNeighbor(_) => "🪞 A node cannot be its own neighbor.".to_string(),
            Error::TokenNotFound => "🔍 Unknown join token.".to_string(),
            Error::TokenExpired => "⏳ The join token has expired.".to_string(),
            Error::TokenAlreadyRedeemed => "🔒 The join token was already used.".to_string(),
            Error::InvalidConfig { field, message } => {
                format!("⚙️ Configuration error in '{}': {}", field, message)
            }
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Error::NoRoute(_) => Some(
                "💡 Pass an explicit host with `--host=<HOST>` or set VORTEX_NODE__HOST."
                    .to_string(),
            ),
            Error::Hostname(_) => {
                Some("💡 Set a node name with VORTEX_NODE__NAME.".to_string())
            }
            Error::TokenNotFound | Error::TokenExpired | Error::TokenAlreadyRedeemed => Some(
                "💡 Generate a fresh token on the issuing node with `vortex join-token`."
                    .to_string(),
            ),
            Error::InvalidConfig { field, .. } => Some(format!(
                "💡 Check the '{}' setting in config/default.toml or .env file.",
                field
            )),
            _ => None,
        }
    }
}

/// Format an error for display in the CLI
pub fn format_error_for_cli(error: &Error) -> String {
    let mut output = String::new();

    output.push_str(&error.user_message());
    output.push_str("\n\n");

    if let Some(suggestion) = error.suggestion() {
        output.push_str(&suggestion);
        output.push('\n');
    }

    output
}
