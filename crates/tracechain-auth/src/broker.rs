//! The credential broker abstraction over the identity provider.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracechain_config::Endpoint;
use url::Url;

use crate::delegation::SessionKey;
use crate::error::{AuthError, Result};
use crate::identity::Identity;

/// Parameters of an interactive login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOptions {
    pub identity_provider: Url,
    /// Upper bound on the lifetime of the issued credential.
    pub max_time_to_live: Duration,
    /// Placement hints for the provider's login window.
    pub window_features: String,
}

impl LoginOptions {
    pub fn from_endpoint(endpoint: &Endpoint) -> Self {
        Self {
            identity_provider: endpoint.identity_provider.clone(),
            max_time_to_live: endpoint.max_time_to_live,
            window_features: endpoint.window_features.clone(),
        }
    }

    pub fn max_time_to_live_nanos(&self) -> u64 {
        u64::try_from(self.max_time_to_live.as_nanos()).unwrap_or(u64::MAX)
    }
}

/// Identity provider operations the session manager relies on.
#[async_trait]
pub trait CredentialBroker: Send + Sync + std::fmt::Debug {
    /// Recover a previously established identity, if one is still valid.
    async fn restore(&self) -> Result<Option<Identity>>;

    /// Run the interactive login flow to completion.
    async fn authenticate(&self, options: &LoginOptions) -> Result<Identity>;

    /// Whether the provider still considers the credential valid.
    async fn is_authenticated(&self) -> Result<bool>;

    /// Forget the credential at the provider side.
    async fn revoke(&self) -> Result<()>;
}

/// Shared broker handle.
pub type SharedBroker = Arc<dyn CredentialBroker>;

// ─────────────────────────────────────────────────────────────────────────────
// In-memory broker
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum ScriptedFailure {
    Deny(String),
    Unavailable(String),
}

/// Deterministic broker for tests and offline use.
///
/// Each successful `authenticate` mints a new identity with a distinct
/// principal. Failures can be queued ahead of time.
#[derive(Debug, Default)]
pub struct InMemoryBroker {
    stored: Mutex<Option<Identity>>,
    failures: Mutex<VecDeque<ScriptedFailure>>,
    unavailable: AtomicBool,
    revoke_fails: AtomicBool,
    minted: AtomicU32,
    authenticate_calls: AtomicU32,
    restore_calls: AtomicU32,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a restorable identity, as if a previous login persisted one.
    pub fn with_identity(identity: Identity) -> Self {
        let broker = Self::new();
        *broker.stored.lock() = Some(identity);
        broker
    }

    /// Deterministic identity for a given seed.
    pub fn identity_for_seed(seed: u32) -> Result<Identity> {
        let mut bytes = [0u8; 32];
        bytes[..4].copy_from_slice(&seed.to_le_bytes());
        Identity::from_signer(Arc::new(SessionKey::from_seed(bytes).signer()))
    }

    /// The next `authenticate` call fails with `AuthenticationDenied`.
    pub fn deny_next_login(&self, reason: impl Into<String>) {
        self.failures
            .lock()
            .push_back(ScriptedFailure::Deny(reason.into()));
    }

    /// The next `authenticate` call fails with `ProviderUnavailable`.
    pub fn fail_next_login(&self, reason: impl Into<String>) {
        self.failures
            .lock()
            .push_back(ScriptedFailure::Unavailable(reason.into()));
    }

    /// Make `restore` and `is_authenticated` fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make `revoke` fail (after clearing the credential).
    pub fn set_revoke_fails(&self, fails: bool) {
        self.revoke_fails.store(fails, Ordering::SeqCst);
    }

    /// Drop the credential behind the session's back.
    pub fn expire(&self) {
        *self.stored.lock() = None;
    }

    pub fn stored_identity(&self) -> Option<Identity> {
        self.stored.lock().clone()
    }

    pub fn authenticate_calls(&self) -> u32 {
        self.authenticate_calls.load(Ordering::SeqCst)
    }

    pub fn restore_calls(&self) -> u32 {
        self.restore_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuthError::ProviderUnavailable(
                "in-memory provider offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialBroker for InMemoryBroker {
    async fn restore(&self) -> Result<Option<Identity>> {
        self.restore_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.stored.lock().clone().filter(|id| !id.is_expired()))
    }

    async fn authenticate(&self, _options: &LoginOptions) -> Result<Identity> {
        self.authenticate_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(failure) = self.failures.lock().pop_front() {
            return Err(match failure {
                ScriptedFailure::Deny(reason) => AuthError::AuthenticationDenied(reason),
                ScriptedFailure::Unavailable(reason) => AuthError::ProviderUnavailable(reason),
            });
        }

        let seed = self.minted.fetch_add(1, Ordering::SeqCst) + 1;
        let identity = Self::identity_for_seed(seed)?;
        *self.stored.lock() = Some(identity.clone());
        Ok(identity)
    }

    async fn is_authenticated(&self) -> Result<bool> {
        self.check_available()?;
        Ok(self
            .stored
            .lock()
            .as_ref()
            .is_some_and(|id| !id.is_expired()))
    }

    async fn revoke(&self) -> Result<()> {
        *self.stored.lock() = None;
        if self.revoke_fails.load(Ordering::SeqCst) {
            return Err(AuthError::ProviderUnavailable(
                "in-memory provider refused logout".to_string(),
            ));
        }
        Ok(())
    }
}
