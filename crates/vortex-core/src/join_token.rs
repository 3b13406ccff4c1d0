//! Join tokens.
//!
//! A join token is a short-lived secret minted by a node. A machine that
//! presents the token's value to the issuer is admitted as a neighbor.
//!
//! Tokens are immutable once created and are shared as `Arc<JoinToken>`;
//! redemption state lives with the issuing [`Node`](crate::Node).

use crate::config::{DiscoveryConfig, JoinTokenConfig};
use crate::error::{Error, Result};
use crate::{net, secure};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;
use tracing::debug;
use uuid::Uuid;
use zeroize::Zeroizing;

/// Unique identifier of an issued join token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(Uuid);

impl TokenId {
    /// Generate a new random token ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Observable state of an issued token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinTokenState {
    /// Redeemable
    Valid,
    /// Lifetime elapsed without redemption
    Expired,
    /// Used to admit a node
    Redeemed,
}

impl fmt::Display for JoinTokenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Expired => write!(f, "expired"),
            Self::Redeemed => write!(f, "redeemed"),
        }
    }
}

/// A time-limited credential authorizing one machine to join the network.
#[derive(Clone)]
pub struct JoinToken {
    id: TokenId,
    value: Zeroizing<String>,
    host: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl JoinToken {
    /// Mint a token from `config`, discovering the host against the default
    /// probe target when `config.host` is unset.
    pub fn create(config: &JoinTokenConfig) -> Result<Self> {
        Self::create_with_discovery(config, &DiscoveryConfig::default())
    }

    /// Mint a token from `config`.
    ///
    /// The host comes from `config.host` when set, otherwise from primary
    /// address discovery against `discovery.probe_addr`.
    pub fn create_with_discovery(
        config: &JoinTokenConfig,
        discovery: &DiscoveryConfig,
    ) -> Result<Self> {
        config.validate()?;

        let value = Zeroizing::new(secure::generate_token(config.length)?);
        let host = match &config.host {
            Some(host) => host.clone(),
            None => net::probe_address(&discovery.probe_addr)?.to_string(),
        };

        let issued_at = Utc::now();
        let expires_at = expiry_after(issued_at, config.ttl_secs)?;
        let token = Self {
            id: TokenId::new(),
            value,
            host,
            issued_at,
            expires_at,
        };

        debug!(
            token_id = %token.id,
            host = %token.host,
            expires_at = %token.expires_at,
            "Join token created"
        );
        Ok(token)
    }

    /// Token ID.
    pub fn id(&self) -> TokenId {
        self.id
    }

    /// Secret value a joiner presents.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Host a joiner should contact.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Issue time (UTC).
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Expiry time (UTC).
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Lifetime of the token.
    pub fn ttl(&self) -> Duration {
        self.expires_at - self.issued_at
    }

    /// Whether the token has expired now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether the token is expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }

    /// Constant-time comparison against a presented value.
    pub fn matches(&self, presented: &str) -> bool {
        self.value.as_bytes().ct_eq(presented.as_bytes()).into()
    }
}

/// `issued_at + ttl_secs`, or `InvalidConfig` when the result leaves the
/// representable calendar range.
fn expiry_after(issued_at: DateTime<Utc>, ttl_secs: u64) -> Result<DateTime<Utc>> {
    i64::try_from(ttl_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|ttl| issued_at.checked_add_signed(ttl))
        .ok_or_else(|| Error::InvalidConfig {
            field: "join_token.ttl_secs".to_string(),
            message: "expiry falls outside the supported date range".to_string(),
        })
}

impl fmt::Debug for JoinToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinToken")
            .field("id", &self.id)
            .field("value", &"[REDACTED]")
            .field("host", &self.host)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
