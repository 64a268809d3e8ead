//! Client error types.

use thiserror::Error;

use crate::transport::TransportError;

/// Client error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// No authenticated session, so no remote handle.
    #[error("Not authenticated; run `tracechain auth login` first")]
    NotAuthenticated,

    /// The call did not complete: transport, replica or Candid failure.
    #[error("Remote call failed: {0}")]
    RemoteCallFailed(String),

    /// The canister answered with an `Err` value.
    #[error("Rejected by canister: {0}")]
    RemoteRejected(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Check if the canister itself refused the request.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ClientError::RemoteRejected(_))
    }

    /// Check if the call failed before producing an answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::RemoteCallFailed(_))
    }

    pub fn is_not_authenticated(&self) -> bool {
        matches!(self, ClientError::NotAuthenticated)
    }
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        ClientError::RemoteCallFailed(err.to_string())
    }
}

impl From<tracechain_config::ConfigError> for ClientError {
    fn from(err: tracechain_config::ConfigError) -> Self {
        ClientError::Config(err.to_string())
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
