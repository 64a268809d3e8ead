//! The authenticated identity used to sign remote calls.

use std::sync::Arc;

use candid::Principal;
use ic_agent::Identity as Signer;

use crate::error::{AuthError, Result};

/// An authenticated principal together with the key material that signs
/// requests on its behalf.
///
/// Cloning is cheap and shares the signer. Two identities are equal when
/// their principals are equal.
#[derive(Clone)]
pub struct Identity {
    principal: Principal,
    signer: Arc<dyn Signer>,
    /// Expiry of the underlying credential, in nanoseconds since the epoch.
    expires_at: Option<u64>,
}

impl Identity {
    /// Wrap a signer, deriving the principal from it.
    pub fn from_signer(signer: Arc<dyn Signer>) -> Result<Self> {
        let principal = signer.sender().map_err(AuthError::ProviderUnavailable)?;
        Ok(Self {
            principal,
            signer,
            expires_at: None,
        })
    }

    /// Record when the credential stops being valid.
    pub fn with_expiration(mut self, expires_at_nanos: u64) -> Self {
        self.expires_at = Some(expires_at_nanos);
        self
    }

    pub fn principal(&self) -> Principal {
        self.principal
    }

    /// The signer to hand to an agent.
    pub fn signer(&self) -> Arc<dyn Signer> {
        self.signer.clone()
    }

    pub fn expires_at(&self) -> Option<u64> {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| now_nanos() >= at)
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.principal == other.principal
    }
}

impl Eq for Identity {}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("principal", &self.principal.to_text())
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.principal.to_text())
    }
}

/// Current wall-clock time in nanoseconds since the Unix epoch.
pub(crate) fn now_nanos() -> u64 {
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .map(|n| n.max(0) as u64)
        .unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegation::SessionKey;

    fn identity(seed: u8) -> Identity {
        Identity::from_signer(Arc::new(SessionKey::from_seed([seed; 32]).signer())).unwrap()
    }

    #[test]
    fn test_principal_derived_from_signer() {
        let key = SessionKey::from_seed([7; 32]);
        let expected = key.signer().sender().unwrap();
        assert_eq!(identity(7).principal(), expected);
        assert_ne!(identity(7).principal(), Principal::anonymous());
    }

    #[test]
    fn test_equality_by_principal() {
        assert_eq!(identity(1), identity(1));
        assert_ne!(identity(1), identity(2));
    }

    #[test]
    fn test_expiry() {
        let id = identity(3);
        assert!(!id.is_expired());
        assert!(id.clone().with_expiration(1).is_expired());
        assert!(!id.with_expiration(u64::MAX).is_expired());
    }

    #[test]
    fn test_display_is_textual_principal() {
        let id = identity(4);
        assert_eq!(id.to_string(), id.principal().to_text());
        assert!(format!("{:?}", id).contains(&id.principal().to_text()));
    }
}
