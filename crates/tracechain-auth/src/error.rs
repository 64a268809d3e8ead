//! Error types for session management.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors raised while talking to the identity provider.
///
/// None of these escape [`SessionManager`](crate::SessionManager); it records
/// them and moves to an unauthenticated state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Provider unreachable or its response could not be used.
    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The user cancelled or the provider refused.
    #[error("Authentication denied: {0}")]
    AuthenticationDenied(String),

    /// Persisted credentials could not be read or written.
    #[error("Credential storage error: {0}")]
    Storage(String),
}

impl AuthError {
    /// Check if the user (rather than the system) ended the flow.
    pub fn is_denied(&self) -> bool {
        matches!(self, AuthError::AuthenticationDenied(_))
    }
}
