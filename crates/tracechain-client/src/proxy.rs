//! The remote service proxy.

use std::sync::Arc;

use async_trait::async_trait;
use candid::CandidType;
use candid::utils::ArgumentEncoder;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use tracechain_auth::{Identity, SessionListener};
use tracechain_types::RemoteResult;

use crate::error::{ClientError, Result};
use crate::transport::{CallKind, SharedTransport, TransportFactory};

/// Typed handle to the supply-chain canister.
///
/// The proxy holds at most one transport, bound to the identity of the
/// current session. It is installed and dropped by the session manager
/// through [`SessionListener`]; while it is absent every operation fails
/// with [`ClientError::NotAuthenticated`] without touching the network.
///
/// Operations live in [`crate::api`], grouped by domain.
pub struct RemoteServiceProxy {
    factory: Arc<dyn TransportFactory>,
    handle: RwLock<Option<SharedTransport>>,
}

impl RemoteServiceProxy {
    pub fn new(factory: Arc<dyn TransportFactory>) -> Self {
        Self {
            factory,
            handle: RwLock::new(None),
        }
    }

    /// Whether a remote handle is installed.
    pub fn is_connected(&self) -> bool {
        self.handle.read().is_some()
    }

    fn transport(&self) -> Result<SharedTransport> {
        self.handle
            .read()
            .clone()
            .ok_or(ClientError::NotAuthenticated)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal call helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Encode `args`, invoke `method`, and decode a single return value.
    pub(crate) async fn call<A, R>(&self, kind: CallKind, method: &str, args: A) -> Result<R>
    where
        A: ArgumentEncoder,
        R: CandidType + DeserializeOwned,
    {
        let transport = self.transport()?;

        let arg = candid::encode_args(args).map_err(|e| {
            ClientError::RemoteCallFailed(format!("failed to encode {} arguments: {}", method, e))
        })?;

        tracing::debug!(method, kind = %kind, bytes = arg.len(), "Calling canister");
        let reply = transport.call(kind, method, arg).await.map_err(|e| {
            tracing::debug!(method, error = %e, "Canister call failed");
            ClientError::from(e)
        })?;

        candid::decode_one(&reply).map_err(|e| {
            ClientError::RemoteCallFailed(format!("failed to decode {} reply: {}", method, e))
        })
    }

    /// Like [`call`](Self::call), for methods that answer with `Ok`/`Err`.
    pub(crate) async fn call_result<A, T>(&self, kind: CallKind, method: &str, args: A) -> Result<T>
    where
        A: ArgumentEncoder,
        T: CandidType + DeserializeOwned,
    {
        let reply: RemoteResult<T> = self.call(kind, method, args).await?;
        reply.map_err(|message| {
            tracing::debug!(method, %message, "Canister rejected call");
            ClientError::RemoteRejected(message)
        })
    }
}

#[async_trait]
impl SessionListener for RemoteServiceProxy {
    async fn on_authenticated(&self, identity: &Identity) -> std::result::Result<(), String> {
        let transport = self
            .factory
            .connect(identity)
            .await
            .map_err(|e| e.to_string())?;
        *self.handle.write() = Some(transport);
        tracing::debug!(principal = %identity, "Remote handle installed");
        Ok(())
    }

    async fn on_cleared(&self) {
        if self.handle.write().take().is_some() {
            tracing::debug!("Remote handle dropped");
        }
    }
}

impl std::fmt::Debug for RemoteServiceProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteServiceProxy")
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}
