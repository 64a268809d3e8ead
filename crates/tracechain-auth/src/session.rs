//! Session state machine.
//!
//! ```text
//! Uninitialized ──initialize──▶ Checking ──┬──▶ Authenticated
//!                                           ├──▶ Unauthenticated
//!                                           └──▶ Error
//! Unauthenticated / Error ──login──▶ Checking ──▶ Authenticated | Error
//! Authenticated ──logout──▶ Unauthenticated
//! Authenticated ──is_authenticated() == false──▶ Unauthenticated
//! Unauthenticated / Error ──is_authenticated() == true──▶ Authenticated (stored identity)
//! ```
//!
//! `Error` is an unauthenticated resting state that remembers why the last
//! attempt failed. Every state is reachable again; the manager is reusable
//! across any number of login/logout cycles.

use std::sync::Arc;

use async_trait::async_trait;
use candid::Principal;
use parking_lot::RwLock;

use crate::broker::{LoginOptions, SharedBroker};
use crate::error::AuthError;
use crate::identity::Identity;

/// Current authentication status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Checking,
    Authenticated(Identity),
    Unauthenticated,
    Error(String),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Checking => "checking",
            SessionState::Authenticated(_) => "authenticated",
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Error(_) => "error",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reacts to identities appearing and disappearing.
///
/// Listeners run in registration order. `on_authenticated` may refuse the
/// identity, which aborts the transition.
#[async_trait]
pub trait SessionListener: Send + Sync {
    async fn on_authenticated(&self, identity: &Identity) -> std::result::Result<(), String>;

    /// The current identity is gone. Must be idempotent.
    async fn on_cleared(&self);
}

/// Tracks whether the user is authenticated and which identity is current.
pub struct SessionManager {
    broker: SharedBroker,
    options: LoginOptions,
    state: RwLock<SessionState>,
    last_error: RwLock<Option<String>>,
    listeners: Vec<Arc<dyn SessionListener>>,
}

impl SessionManager {
    pub fn new(broker: SharedBroker, options: LoginOptions) -> Self {
        Self {
            broker,
            options,
            state: RwLock::new(SessionState::Uninitialized),
            last_error: RwLock::new(None),
            listeners: Vec::new(),
        }
    }

    /// Register a listener for identity changes.
    pub fn with_listener(mut self, listener: Arc<dyn SessionListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    /// Why the last initialize or login attempt failed, if it did.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    /// The current identity, if authenticated. Never blocks on I/O.
    pub fn current_identity(&self) -> Option<Identity> {
        self.state.read().identity().cloned()
    }

    pub fn principal(&self) -> Option<Principal> {
        self.state.read().identity().map(Identity::principal)
    }

    pub fn login_options(&self) -> &LoginOptions {
        &self.options
    }

    pub fn broker(&self) -> &SharedBroker {
        &self.broker
    }

    /// Restore any existing session. Only the first call does work.
    pub async fn initialize(&self) {
        {
            let mut state = self.state.write();
            if !matches!(*state, SessionState::Uninitialized) {
                tracing::debug!(state = %*state, "Session already initialized");
                return;
            }
            *state = SessionState::Checking;
        }

        tracing::debug!("Checking for an existing session");
        match self.broker.restore().await {
            Ok(Some(identity)) => {
                tracing::info!(principal = %identity, "Restored existing session");
                self.establish(identity).await;
            }
            Ok(None) => {
                tracing::info!("No existing session");
                self.set_state(SessionState::Unauthenticated);
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// Run the interactive login flow. Returns whether it succeeded.
    ///
    /// A login always runs the provider flow, even when already
    /// authenticated.
    pub async fn login(&self) -> bool {
        if matches!(self.state(), SessionState::Uninitialized) {
            self.initialize().await;
        }

        tracing::info!(provider = %self.options.identity_provider, "Starting login");
        self.clear_listeners().await;
        self.set_state(SessionState::Checking);

        match self.broker.authenticate(&self.options).await {
            Ok(identity) => self.establish(identity).await,
            Err(e) => {
                self.fail(e).await;
                false
            }
        }
    }

    /// End the session. The provider is told best-effort.
    pub async fn logout(&self) {
        if let Err(e) = self.broker.revoke().await {
            tracing::warn!(error = %e, "Provider logout failed; clearing local session anyway");
        }

        self.clear_listeners().await;
        *self.last_error.write() = None;
        self.set_state(SessionState::Unauthenticated);
        tracing::info!("Logged out");
    }

    /// Ask the provider whether the credential is still valid, and bring
    /// the local state in line with the answer.
    ///
    /// A `false` answer while authenticated ends the local session. A
    /// `true` answer while unauthenticated (for example after a failed
    /// re-login) restores the stored identity, so a `true` result always
    /// comes with a [`current_identity`](Self::current_identity).
    pub async fn is_authenticated(&self) -> bool {
        match self.broker.is_authenticated().await {
            Ok(true) => self.adopt_stored_identity().await,
            Ok(false) => {
                if self.state().is_authenticated() {
                    tracing::info!("Credential no longer valid; ending session");
                    self.clear_listeners().await;
                    self.set_state(SessionState::Unauthenticated);
                }
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to check authentication status");
                false
            }
        }
    }

    async fn adopt_stored_identity(&self) -> bool {
        match self.state() {
            SessionState::Authenticated(_) | SessionState::Checking => return true,
            SessionState::Uninitialized => {
                self.initialize().await;
                return self.state().is_authenticated();
            }
            SessionState::Unauthenticated | SessionState::Error(_) => {}
        }

        match self.broker.restore().await {
            Ok(Some(identity)) => {
                tracing::info!(principal = %identity, "Credential still valid; restoring session");
                self.establish(identity).await
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to restore valid credential");
                false
            }
        }
    }

    async fn establish(&self, identity: Identity) -> bool {
        self.set_state(SessionState::Authenticated(identity.clone()));
        *self.last_error.write() = None;

        for listener in &self.listeners {
            if let Err(e) = listener.on_authenticated(&identity).await {
                tracing::error!(principal = %identity, error = %e, "Session listener rejected identity");
                self.fail_with(format!("failed to set up remote handle: {}", e))
                    .await;
                return false;
            }
        }

        tracing::info!(principal = %identity, "Authenticated");
        true
    }

    async fn fail(&self, error: AuthError) {
        self.fail_with(error.to_string()).await;
    }

    async fn fail_with(&self, message: String) {
        tracing::warn!(error = %message, "Session is unauthenticated");
        self.clear_listeners().await;
        *self.last_error.write() = Some(message.clone());
        self.set_state(SessionState::Error(message));
    }

    async fn clear_listeners(&self) {
        for listener in &self.listeners {
            listener.on_cleared().await;
        }
    }

    fn set_state(&self, next: SessionState) {
        let mut state = self.state.write();
        tracing::debug!(from = %*state, to = %next, "Session transition");
        *state = next;
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("broker", &self.broker)
            .field("state", &*self.state.read())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
