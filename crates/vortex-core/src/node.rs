//! Node membership registry.
//!
//! A [`Node`] is the local identity of a Vortex instance. It tracks the
//! peers it trusts (its neighbors) and the join tokens it has issued.
//!
//! **Locking**: each node guards its mutable state with a single
//! `RwLock`. Identity fields are immutable and live outside the lock, so an
//! operation on one node never needs to lock another node, even when the
//! other node is passed in as an argument.

use crate::config::{check_host, DiscoveryConfig, JoinTokenConfig, NodeConfig};
use crate::error::{Error, Result};
use crate::join_token::{JoinToken, JoinTokenState, TokenId};
use crate::net;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Unique identifier of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Generate a new random node ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Read-only snapshot of a node's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeIdentity {
    /// Unique node ID
    pub id: NodeId,
    /// Display name
    pub name: String,
    /// Address peers should contact
    pub host: String,
    /// RPC port
    pub port: u16,
}

/// A token minted by this node and whether it has been spent.
struct IssuedToken {
    token: Arc<JoinToken>,
    redeemed_at: Option<DateTime<Utc>>,
}

impl IssuedToken {
    fn state_at(&self, now: DateTime<Utc>) -> JoinTokenState {
        if self.redeemed_at.is_some() {
            JoinTokenState::Redeemed
        } else if self.token.is_expired_at(now) {
            JoinTokenState::Expired
        } else {
            JoinTokenState::Valid
        }
    }
}

/// State guarded by the node lock.
#[derive(Default)]
struct Membership {
    neighbors: HashMap<NodeId, Arc<Node>>,
    issued_tokens: HashMap<TokenId, IssuedToken>,
}

/// A membership identity in the Vortex network.
pub struct Node {
    id: NodeId,
    name: String,
    host: String,
    port: u16,
    token_config: JoinTokenConfig,
    discovery: DiscoveryConfig,
    state: RwLock<Membership>,
}

impl Node {
    /// Build a node from defaults: hostname as name, discovered host.
    pub fn new() -> Result<Self> {
        Self::with_config(NodeConfig::default())
    }

    /// Build a node, applying the overrides in `config`.
    ///
    /// Hostname lookup and address discovery only run for fields the
    /// config leaves unset.
    pub fn with_config(config: NodeConfig) -> Result<Self> {
        let name = match config.name {
            Some(name) => name,
            None => hostname::get()
                .map_err(Error::Hostname)?
                .to_string_lossy()
                .into_owned(),
        };
        let host = match config.host {
            Some(host) => {
                check_host("node.host", &host)?;
                host
            }
            None => net::probe_address(&config.discovery.probe_addr)?.to_string(),
        };
        config.join_token.validate()?;

        let node = Self {
            id: NodeId::new(),
            name,
            host,
            port: config.port,
            token_config: config.join_token,
            discovery: config.discovery,
            state: RwLock::new(Membership::default()),
        };

        debug!(
            node_id = %node.id,
            node_name = %node.name,
            host = %node.host,
            port = node.port,
            "Node created"
        );
        Ok(node)
    }

    /// Node ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Address peers should contact.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// RPC port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Snapshot of the node identity.
    pub fn identity(&self) -> NodeIdentity {
        NodeIdentity {
            id: self.id,
            name: self.name.clone(),
            host: self.host.clone(),
            port: self.port,
        }
    }

    // ── Neighbors ──────────────────────────────────────────────────────

    /// Register `candidate` as a neighbor of this node.
    ///
    /// The relation is one-directional: `candidate` does not learn about
    /// this node. Fails without changing state if the candidate is this
    /// node or already a neighbor.
    pub async fn add_neighbor(&self, candidate: Arc<Node>) -> Result<()> {
        let mut state = self.state.write().await;
        self.check_candidate(&state, &candidate)?;
        self.insert_neighbor(&mut state, candidate);
        Ok(())
    }

    /// Whether `id` is a neighbor of this node.
    pub async fn is_neighbor(&self, id: NodeId) -> bool {
        self.state.read().await.neighbors.contains_key(&id)
    }

    /// Look up a neighbor by ID.
    pub async fn neighbor(&self, id: NodeId) -> Option<Arc<Node>> {
        self.state.read().await.neighbors.get(&id).cloned()
    }

    /// Identities of all neighbors.
    pub async fn neighbors(&self) -> Vec<NodeIdentity> {
        let state = self.state.read().await;
        state.neighbors.values().map(|n| n.identity()).collect()
    }

    /// Number of neighbors.
    pub async fn neighbor_count(&self) -> usize {
        self.state.read().await.neighbors.len()
    }

    fn check_candidate(&self, state: &Membership, candidate: &Node) -> Result<()> {
        if candidate.id == self.id {
            return Err(Error::SelfNeighbor(self.id));
        }
        if state.neighbors.contains_key(&candidate.id) {
            return Err(Error::AlreadyNeighbor {
                id: candidate.id,
                name: candidate.name.clone(),
            });
        }
        Ok(())
    }

    fn insert_neighbor(&self, state: &mut Membership, candidate: Arc<Node>) {
        info!(
            node_id = %self.id,
            neighbor_id = %candidate.id,
            neighbor = %candidate.name,
            "Neighbor added"
        );
        state.neighbors.insert(candidate.id, candidate);
    }

    // ── Join tokens ────────────────────────────────────────────────────

    /// Mint a join token pointing at this node's host and record it.
    pub async fn issue_join_token(&self) -> Result<Arc<JoinToken>> {
        let config = JoinTokenConfig {
            host: Some(self.host.clone()),
            ..self.token_config.clone()
        };
        self.issue_join_token_with(config).await
    }

    /// Mint a join token with explicit settings and record it.
    ///
    /// Without a host in `config`, the host is discovered with this node's
    /// discovery settings.
    pub async fn issue_join_token_with(&self, config: JoinTokenConfig) -> Result<Arc<JoinToken>> {
        // Entropy and discovery run before the lock is taken.
        let token = Arc::new(JoinToken::create_with_discovery(&config, &self.discovery)?);

        let mut state = self.state.write().await;
        state.issued_tokens.insert(
            token.id(),
            IssuedToken {
                token: token.clone(),
                redeemed_at: None,
            },
        );

        debug!(
            node_id = %self.id,
            token_id = %token.id(),
            outstanding = state.issued_tokens.len(),
            "Join token issued"
        );
        Ok(token)
    }

    /// Spend the token whose value is `value`.
    ///
    /// A token can be redeemed once, before it expires. Redemption happens
    /// under the write lock, so concurrent callers presenting the same
    /// value cannot both succeed. Failures leave the token untouched.
    pub async fn redeem_join_token(&self, value: &str) -> Result<Arc<JoinToken>> {
        self.redeem_join_token_at(value, Utc::now()).await
    }

    pub(crate) async fn redeem_join_token_at(
        &self,
        value: &str,
        now: DateTime<Utc>,
    ) -> Result<Arc<JoinToken>> {
        let mut state = self.state.write().await;
        self.redeem_locked(&mut state, value, now)
    }

    /// Redeem `value` and add `candidate` as a neighbor in one step.
    ///
    /// The candidate is checked first: a duplicate or self candidate is
    /// rejected without spending the token.
    pub async fn admit(&self, value: &str, candidate: Arc<Node>) -> Result<Arc<JoinToken>> {
        self.admit_at(value, candidate, Utc::now()).await
    }

    pub(crate) async fn admit_at(
        &self,
        value: &str,
        candidate: Arc<Node>,
        now: DateTime<Utc>,
    ) -> Result<Arc<JoinToken>> {
        let mut state = self.state.write().await;
        self.check_candidate(&state, &candidate)?;
        let token = self.redeem_locked(&mut state, value, now)?;
        self.insert_neighbor(&mut state, candidate);
        Ok(token)
    }

    fn redeem_locked(
        &self,
        state: &mut Membership,
        value: &str,
        now: DateTime<Utc>,
    ) -> Result<Arc<JoinToken>> {
        let issued = match state
            .issued_tokens
            .values_mut()
            .find(|issued| issued.token.matches(value))
        {
            Some(issued) => issued,
            None => {
                warn!(node_id = %self.id, "Rejected unknown join token");
                return Err(Error::TokenNotFound);
            }
        };

        match issued.state_at(now) {
            JoinTokenState::Redeemed => {
                warn!(node_id = %self.id, token_id = %issued.token.id(), "Rejected spent join token");
                Err(Error::TokenAlreadyRedeemed)
            }
            JoinTokenState::Expired => {
                warn!(node_id = %self.id, token_id = %issued.token.id(), "Rejected expired join token");
                Err(Error::TokenExpired)
            }
            JoinTokenState::Valid => {
                issued.redeemed_at = Some(now);
                debug!(node_id = %self.id, token_id = %issued.token.id(), "Join token redeemed");
                Ok(issued.token.clone())
            }
        }
    }

    /// Current state of an issued token, `None` if unknown or pruned.
    pub async fn token_state(&self, id: TokenId) -> Option<JoinTokenState> {
        let state = self.state.read().await;
        state
            .issued_tokens
            .get(&id)
            .map(|issued| issued.state_at(Utc::now()))
    }

    /// Number of tokens still held by this node, spent or not.
    pub async fn issued_token_count(&self) -> usize {
        self.state.read().await.issued_tokens.len()
    }

    /// Drop expired and redeemed tokens. Returns how many were removed.
    pub async fn prune_tokens(&self) -> usize {
        self.prune_tokens_at(Utc::now()).await
    }

    pub(crate) async fn prune_tokens_at(&self, now: DateTime<Utc>) -> usize {
        let mut state = self.state.write().await;
        let before = state.issued_tokens.len();
        state
            .issued_tokens
            .retain(|_, issued| issued.state_at(now) == JoinTokenState::Valid);
        before - state.issued_tokens.len()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
