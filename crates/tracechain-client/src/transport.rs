//! The seam between the proxy and the Internet Computer.
//!
//! A [`CanisterTransport`] moves Candid bytes to and from one canister on
//! behalf of one identity. [`AgentTransportFactory`] builds the production
//! transport on top of `ic-agent`; tests substitute their own.

use std::sync::Arc;

use async_trait::async_trait;
use candid::Principal;
use ic_agent::Agent;
use tracechain_auth::Identity;
use tracechain_config::Endpoint;
use url::Url;

use crate::error::{ClientError, Result};

/// How a canister method is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Read-only, answered by a single replica.
    Query,
    /// State-changing, goes through consensus.
    Update,
}

impl CallKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallKind::Query => "query",
            CallKind::Update => "update",
        }
    }
}

impl std::fmt::Display for CallKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures below the Candid layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The agent could not be constructed.
    #[error("failed to build agent: {0}")]
    Build(String),

    /// The call was sent but did not produce a reply.
    #[error("{0}")]
    Call(String),
}

/// Bytes-in, bytes-out access to one canister.
#[async_trait]
pub trait CanisterTransport: Send + Sync {
    async fn query(&self, method: &str, arg: Vec<u8>) -> std::result::Result<Vec<u8>, TransportError>;

    async fn update(&self, method: &str, arg: Vec<u8>) -> std::result::Result<Vec<u8>, TransportError>;

    async fn call(
        &self,
        kind: CallKind,
        method: &str,
        arg: Vec<u8>,
    ) -> std::result::Result<Vec<u8>, TransportError> {
        match kind {
            CallKind::Query => self.query(method, arg).await,
            CallKind::Update => self.update(method, arg).await,
        }
    }
}

/// Shared transport handle.
pub type SharedTransport = Arc<dyn CanisterTransport>;

/// Builds a transport bound to an identity.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn connect(&self, identity: &Identity) -> std::result::Result<SharedTransport, TransportError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// ic-agent transport
// ─────────────────────────────────────────────────────────────────────────────

/// Production factory: one `ic_agent::Agent` per identity.
#[derive(Debug, Clone)]
pub struct AgentTransportFactory {
    host: Url,
    canister_id: Principal,
    fetch_root_key: bool,
}

impl AgentTransportFactory {
    pub fn new(host: Url, canister_id: Principal, fetch_root_key: bool) -> Self {
        Self {
            host,
            canister_id,
            fetch_root_key,
        }
    }

    pub fn from_endpoint(endpoint: &Endpoint) -> Result<Self> {
        let canister_id = Principal::from_text(&endpoint.supply_chain_canister).map_err(|e| {
            ClientError::Config(format!(
                "invalid canister id {:?}: {}",
                endpoint.supply_chain_canister, e
            ))
        })?;
        // Never trust a fetched root key on mainnet.
        let fetch_root_key = endpoint.fetch_root_key && !endpoint.network.is_production();
        Ok(Self::new(endpoint.host.clone(), canister_id, fetch_root_key))
    }

    pub fn canister_id(&self) -> Principal {
        self.canister_id
    }
}

#[async_trait]
impl TransportFactory for AgentTransportFactory {
    async fn connect(&self, identity: &Identity) -> std::result::Result<SharedTransport, TransportError> {
        let agent = Agent::builder()
            .with_url(self.host.as_str())
            .with_arc_identity(identity.signer())
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        if self.fetch_root_key {
            // A local replica may be down; calls will fail on their own.
            if let Err(e) = agent.fetch_root_key().await {
                tracing::warn!(host = %self.host, error = %e, "Failed to fetch root key");
            }
        }

        tracing::debug!(
            host = %self.host,
            canister = %self.canister_id,
            principal = %identity,
            "Agent ready"
        );
        Ok(Arc::new(AgentTransport {
            agent,
            canister_id: self.canister_id,
        }))
    }
}

struct AgentTransport {
    agent: Agent,
    canister_id: Principal,
}

#[async_trait]
impl CanisterTransport for AgentTransport {
    async fn query(&self, method: &str, arg: Vec<u8>) -> std::result::Result<Vec<u8>, TransportError> {
        self.agent
            .query(&self.canister_id, method)
            .with_arg(arg)
            .call()
            .await
            .map_err(|e| TransportError::Call(e.to_string()))
    }

    async fn update(&self, method: &str, arg: Vec<u8>) -> std::result::Result<Vec<u8>, TransportError> {
        self.agent
            .update(&self.canister_id, method)
            .with_arg(arg)
            .call_and_wait()
            .await
            .map_err(|e| TransportError::Call(e.to_string()))
    }
}
