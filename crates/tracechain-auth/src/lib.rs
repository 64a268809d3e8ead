//! Internet Identity session management for the TraceChain client.
//!
//! # Components
//!
//! - [`identity`] - the authenticated [`Identity`] handed to remote calls
//! - [`broker`] - the [`CredentialBroker`] seam over the identity provider,
//!   plus an in-memory broker for tests
//! - [`delegation`] - delegation-chain format, session keys, and on-disk persistence
//! - [`loopback`] - production broker: browser login through a localhost relay page
//! - [`session`] - the [`SessionManager`] state machine and its listeners

pub mod broker;
pub mod delegation;
pub mod error;
pub mod identity;
pub mod loopback;
pub mod session;

pub use broker::{CredentialBroker, InMemoryBroker, LoginOptions, SharedBroker};
pub use delegation::{DelegationChain, DelegationStore, SessionKey, StoredDelegation};
pub use error::{AuthError, Result};
pub use identity::Identity;
pub use loopback::{AuthorizationRequest, LoopbackBroker, UrlHandler, open_in_browser, relay_page};
pub use session::{SessionListener, SessionManager, SessionState};
