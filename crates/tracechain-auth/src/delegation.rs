//! Delegation chains, session keys, and their on-disk persistence.
//!
//! The identity provider never sees the client's private key. The client
//! generates an Ed25519 session key, sends the public half to the provider,
//! and receives a chain of signed delegations from the user's principal to
//! that session key. The chain arrives in the provider's JSON format:
//!
//! ```json
//! {
//!   "delegations": [
//!     { "delegation": { "pubkey": "<hex>", "expiration": "<hex ns>", "targets": ["<hex>"] },
//!       "signature": "<hex>" }
//!   ],
//!   "publicKey": "<hex DER>"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use candid::Principal;
use chrono::{DateTime, Utc};
use ed25519_consensus::SigningKey;
use ic_agent::Identity as Signer;
use ic_agent::identity::{BasicIdentity, DelegatedIdentity, Delegation, SignedDelegation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracechain_config::Network;
use url::Url;

use crate::error::{AuthError, Result};
use crate::identity::{Identity, now_nanos};

/// File name of the persisted delegation for `network` inside the data
/// directory. Each network keeps its own session.
pub fn delegation_file_name(network: Network) -> String {
    format!("delegation-{}.json", network.as_str())
}

// ─────────────────────────────────────────────────────────────────────────────
// Session key
// ─────────────────────────────────────────────────────────────────────────────

/// Ephemeral Ed25519 key the provider delegates to.
#[derive(Clone)]
pub struct SessionKey {
    seed: [u8; 32],
}

impl SessionKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut seed = [0u8; 32];
        rand::rng().fill_bytes(&mut seed);
        Self { seed }
    }

    /// Build a key from a known seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self { seed }
    }

    /// Parse a hex-encoded 32-byte seed.
    pub fn from_hex(value: &str) -> Result<Self> {
        let bytes = hex::decode(value)
            .map_err(|e| AuthError::Storage(format!("invalid session key: {}", e)))?;
        let seed: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            AuthError::Storage(format!("session key must be 32 bytes, got {}", b.len()))
        })?;
        Ok(Self { seed })
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.seed)
    }

    /// The signer backed by this key.
    pub fn signer(&self) -> BasicIdentity {
        BasicIdentity::from_signing_key(SigningKey::from(self.seed))
    }

    /// DER-encoded public key, hex encoded, as the provider expects it.
    pub fn public_key_hex(&self) -> String {
        self.signer()
            .public_key()
            .map(hex::encode)
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKey")
            .field("seed", &"<redacted>")
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Delegation chain (provider JSON format)
// ─────────────────────────────────────────────────────────────────────────────

/// A delegation chain as returned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationChain {
    pub delegations: Vec<SignedDelegationJson>,
    /// DER public key of the delegating (user) principal.
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedDelegationJson {
    pub delegation: DelegationJson,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationJson {
    pub pubkey: String,
    /// Nanoseconds since the epoch, hex encoded.
    pub expiration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<String>>,
}

impl DelegationJson {
    pub fn expiration_nanos(&self) -> Result<u64> {
        let digits = self.expiration.trim_start_matches("0x");
        u64::from_str_radix(digits, 16).map_err(|e| {
            malformed(format!("invalid expiration {:?}: {}", self.expiration, e))
        })
    }

    fn to_delegation(&self) -> Result<Delegation> {
        let targets = self
            .targets
            .as_ref()
            .map(|targets| {
                targets
                    .iter()
                    .map(|t| {
                        let bytes = decode_hex("target", t)?;
                        Principal::try_from_slice(&bytes)
                            .map_err(|e| malformed(format!("invalid target principal: {}", e)))
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        Ok(Delegation {
            pubkey: decode_hex("pubkey", &self.pubkey)?,
            expiration: self.expiration_nanos()?,
            targets,
        })
    }
}

impl DelegationChain {
    /// Earliest expiration across the chain, in nanoseconds.
    ///
    /// Fails on an empty chain or an unparseable expiration.
    pub fn expiration(&self) -> Result<u64> {
        self.delegations
            .iter()
            .map(|d| d.delegation.expiration_nanos())
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .min()
            .ok_or_else(|| malformed("empty delegation chain"))
    }

    pub fn is_expired(&self) -> bool {
        self.expiration().map_or(true, |at| now_nanos() >= at)
    }

    fn check_session_key(&self, session: &SessionKey) -> Result<()> {
        let Some(last) = self.delegations.last() else {
            return Err(malformed("empty delegation chain"));
        };
        let target = decode_hex("pubkey", &last.delegation.pubkey)?;
        if session.signer().public_key().as_deref() != Some(target.as_slice()) {
            return Err(AuthError::ProviderUnavailable(
                "delegation targets a different session key".to_string(),
            ));
        }
        Ok(())
    }

    fn signed_delegations(&self) -> Result<Vec<SignedDelegation>> {
        self.delegations
            .iter()
            .map(|d| {
                Ok(SignedDelegation {
                    delegation: d.delegation.to_delegation()?,
                    signature: decode_hex("signature", &d.signature)?,
                })
            })
            .collect()
    }

    /// Combine the chain with the session key it was issued for.
    ///
    /// The last delegation must name `session`'s public key.
    pub fn to_identity(&self, session: &SessionKey) -> Result<Identity> {
        let expiration = self.expiration()?;
        self.check_session_key(session)?;
        let delegated = DelegatedIdentity::new_unchecked(
            decode_hex("publicKey", &self.public_key)?,
            Box::new(session.signer()),
            self.signed_delegations()?,
        );
        Ok(Identity::from_signer(Arc::new(delegated))?.with_expiration(expiration))
    }
}

fn decode_hex(field: &str, value: &str) -> Result<Vec<u8>> {
    hex::decode(value).map_err(|e| malformed(format!("invalid hex in {}: {}", field, e)))
}

fn malformed(message: impl std::fmt::Display) -> AuthError {
    AuthError::ProviderUnavailable(format!("malformed delegation: {}", message))
}

// ─────────────────────────────────────────────────────────────────────────────
// Persistence
// ─────────────────────────────────────────────────────────────────────────────

/// What gets written to `delegation.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDelegation {
    /// Hex-encoded session key seed.
    pub session_key: String,
    pub chain: DelegationChain,
    /// Provider that issued the chain.
    #[serde(default)]
    pub identity_provider: String,
    pub saved_at: DateTime<Utc>,
}

impl StoredDelegation {
    pub fn identity(&self) -> Result<Identity> {
        let session = SessionKey::from_hex(&self.session_key)?;
        self.chain.to_identity(&session)
    }

    pub fn is_expired(&self) -> bool {
        self.chain.is_expired()
    }

    /// Whether `provider` issued this delegation.
    pub fn issued_by(&self, provider: &Url) -> bool {
        self.identity_provider == provider.as_str()
    }
}

/// File-backed store for the current delegation.
#[derive(Debug, Clone)]
pub struct DelegationStore {
    path: PathBuf,
}

impl DelegationStore {
    /// Store the delegation for `network` inside `data_dir`.
    pub fn new(data_dir: &Path, network: Network) -> Self {
        Self {
            path: data_dir.join(delegation_file_name(network)),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Persist a chain with the session key it belongs to and the
    /// provider that issued it.
    pub fn save(
        &self,
        session: &SessionKey,
        chain: &DelegationChain,
        identity_provider: &Url,
    ) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(storage)?;
        }

        let stored = StoredDelegation {
            session_key: session.to_hex(),
            chain: chain.clone(),
            identity_provider: identity_provider.to_string(),
            saved_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&stored)
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        fs::write(&self.path, json).map_err(storage)?;

        // The file holds a private key.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .map_err(storage)?;
        }

        tracing::debug!(path = %self.path.display(), "Saved delegation");
        Ok(())
    }

    /// Load whatever is on disk, expired or not.
    pub fn load(&self) -> Result<Option<StoredDelegation>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(storage)?;
        let stored = serde_json::from_str(&content).map_err(|e| {
            AuthError::Storage(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(Some(stored))
    }

    /// Load the delegation only if `provider` issued it and it is still
    /// valid.
    pub fn load_valid(&self, provider: &Url) -> Result<Option<StoredDelegation>> {
        Ok(self
            .load()?
            .filter(|stored| stored.issued_by(provider) && !stored.is_expired()))
    }

    pub fn delete(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(storage)?;
            tracing::debug!(path = %self.path.display(), "Removed delegation");
        }
        Ok(())
    }
}

fn storage(e: std::io::Error) -> AuthError {
    AuthError::Storage(e.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    pub(crate) const USER_PUBLIC_KEY: &str = "302a300506032b6570032100d1a2b3c4d5e6f708192a3b4c5d6e7f8091a2b3c4d5e6f708192a3b4c5d6e7f80";

    pub(crate) fn chain_for(session: &SessionKey, expiration: u64) -> DelegationChain {
        DelegationChain {
            delegations: vec![SignedDelegationJson {
                delegation: DelegationJson {
                    pubkey: session.public_key_hex(),
                    expiration: format!("{:x}", expiration),
                    targets: None,
                },
                signature: "ab".repeat(64),
            }],
            public_key: USER_PUBLIC_KEY.to_string(),
        }
    }

    pub(crate) fn provider() -> Url {
        Url::parse("https://identity.ic0.app").unwrap()
    }

    fn far_future() -> u64 {
        now_nanos() + 3_600_000_000_000
    }

    #[test]
    fn test_session_key_hex_roundtrip() {
        let key = SessionKey::generate();
        let parsed = SessionKey::from_hex(&key.to_hex()).unwrap();
        assert_eq!(parsed.public_key_hex(), key.public_key_hex());
        assert!(SessionKey::from_hex("abcd").is_err());
        assert!(!format!("{:?}", key).contains(&key.to_hex()));
    }

    #[test]
    fn test_chain_json_format() {
        let json = r#"{
            "delegations": [{
                "delegation": {"pubkey": "0102", "expiration": "17c2d0a8b5e3f000", "targets": ["00000000000000010101"]},
                "signature": "ff"
            }],
            "publicKey": "0a0b"
        }"#;
        let chain: DelegationChain = serde_json::from_str(json).unwrap();
        assert_eq!(chain.public_key, "0a0b");
        assert_eq!(chain.expiration().unwrap(), 0x17c2d0a8b5e3f000);

        let delegation = chain.delegations[0].delegation.to_delegation().unwrap();
        assert_eq!(delegation.pubkey, vec![1, 2]);
        assert_eq!(delegation.targets.unwrap().len(), 1);

        let out = serde_json::to_value(&chain).unwrap();
        assert!(out.get("publicKey").is_some());
    }

    #[test]
    fn test_chain_identity_is_user_principal() {
        let session = SessionKey::generate();
        let identity = chain_for(&session, far_future()).to_identity(&session).unwrap();
        let user_key = hex::decode(USER_PUBLIC_KEY).unwrap();
        assert_eq!(identity.principal(), Principal::self_authenticating(&user_key));
        assert!(!identity.is_expired());
    }

    #[test]
    fn test_malformed_chain_is_provider_error() {
        let session = SessionKey::generate();

        let mut chain = chain_for(&session, far_future());
        chain.public_key = "not hex".to_string();
        assert!(matches!(
            chain.to_identity(&session),
            Err(AuthError::ProviderUnavailable(_))
        ));

        let empty = DelegationChain {
            delegations: vec![],
            public_key: USER_PUBLIC_KEY.to_string(),
        };
        assert!(matches!(
            empty.to_identity(&session),
            Err(AuthError::ProviderUnavailable(_))
        ));
        assert!(empty.is_expired());
    }

    #[test]
    fn test_chain_for_other_session_key_rejected() {
        let session = SessionKey::generate();
        let chain = chain_for(&SessionKey::generate(), far_future());

        let err = chain.to_identity(&session).unwrap_err();
        assert_eq!(
            err,
            AuthError::ProviderUnavailable("delegation targets a different session key".into())
        );
    }

    #[test]
    fn test_earliest_expiration_wins() {
        let session = SessionKey::generate();
        let mut chain = chain_for(&session, far_future());
        let mut second = chain.delegations[0].clone();
        second.delegation.expiration = "1".to_string();
        chain.delegations.push(second);
        assert_eq!(chain.expiration().unwrap(), 1);
        assert!(chain.is_expired());
    }

    #[test]
    fn test_store_save_load_delete() {
        let dir = TempDir::new().unwrap();
        let store = DelegationStore::new(dir.path(), Network::Ic);
        assert!(store.load().unwrap().is_none());

        let session = SessionKey::generate();
        let chain = chain_for(&session, far_future());
        store.save(&session, &chain, &provider()).unwrap();
        assert!(store.exists());
        assert_eq!(store.path(), dir.path().join("delegation-ic.json"));

        let stored = store.load_valid(&provider()).unwrap().unwrap();
        assert_eq!(stored.chain, chain);
        assert!(stored.issued_by(&provider()));
        assert_eq!(stored.session_key, session.to_hex());
        let identity = stored.identity().unwrap();
        assert_eq!(
            identity,
            chain.to_identity(&session).unwrap()
        );

        store.delete().unwrap();
        assert!(!store.exists());
        store.delete().unwrap();
    }

    #[test]
    fn test_store_filters_expired() {
        let dir = TempDir::new().unwrap();
        let store = DelegationStore::new(dir.path(), Network::Ic);
        let session = SessionKey::generate();
        store.save(&session, &chain_for(&session, 1), &provider()).unwrap();

        assert!(store.load().unwrap().is_some());
        assert!(store.load_valid(&provider()).unwrap().is_none());
    }

    #[test]
    fn test_store_filters_other_provider() {
        let dir = TempDir::new().unwrap();
        let store = DelegationStore::new(dir.path(), Network::Local);
        let session = SessionKey::generate();
        let local = Url::parse("http://be2us-64aaa-aaaaa-qaabq-cai.localhost:4943").unwrap();
        store
            .save(&session, &chain_for(&session, far_future()), &local)
            .unwrap();

        assert!(store.load_valid(&local).unwrap().is_some());
        assert!(store.load_valid(&provider()).unwrap().is_none());
    }

    #[test]
    fn test_store_keyed_by_network() {
        let dir = TempDir::new().unwrap();
        let local = DelegationStore::new(dir.path(), Network::Local);
        let ic = DelegationStore::new(dir.path(), Network::Ic);
        assert_ne!(local.path(), ic.path());

        let session = SessionKey::generate();
        local
            .save(&session, &chain_for(&session, far_future()), &provider())
            .unwrap();
        assert!(ic.load().unwrap().is_none());
    }

    #[test]
    fn test_store_entry_without_provider_is_not_valid() {
        let dir = TempDir::new().unwrap();
        let store = DelegationStore::new(dir.path(), Network::Ic);
        let session = SessionKey::generate();
        let legacy = serde_json::json!({
            "session_key": session.to_hex(),
            "chain": chain_for(&session, far_future()),
            "saved_at": Utc::now(),
        });
        fs::write(store.path(), legacy.to_string()).unwrap();

        assert!(store.load().unwrap().is_some());
        assert!(store.load_valid(&provider()).unwrap().is_none());
    }

    #[test]
    fn test_store_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let store = DelegationStore::new(dir.path(), Network::Ic);
        fs::write(store.path(), "{ not json").unwrap();
        assert!(matches!(store.load(), Err(AuthError::Storage(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_store_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = DelegationStore::new(&dir.path().join("nested"), Network::Ic);
        let session = SessionKey::generate();
        store
            .save(&session, &chain_for(&session, far_future()), &provider())
            .unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
