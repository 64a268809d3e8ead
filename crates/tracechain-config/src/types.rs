//! Configuration file types.
//!
//! ```toml
//! [network]
//! name = "local"                  # "local" | "ic"
//! host = "http://localhost:4943"  # optional, defaults by network
//! fetch_root_key = true           # optional, never honoured on "ic"
//!
//! [canisters]
//! supply_chain = "rdmx6-jaaaa-aaaaa-aaadq-cai"
//! internet_identity = "be2us-64aaa-aaaaa-qaabq-cai"
//!
//! [identity]
//! provider = "https://identity.ic0.app"
//! max_time_to_live_secs = 604800
//! window_features = "toolbar=0,location=0,menubar=0,width=500,height=500,left=100,top=100"
//! login_timeout_secs = 300
//! data_dir = "~/.local/share/tracechain"
//! ```
//!
//! Every field is optional so that layers can be merged field by field.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Environment variables
// ─────────────────────────────────────────────────────────────────────────────

/// Selects the network (`local` or `ic`).
pub const ENV_NETWORK: &str = "TRACECHAIN_NETWORK";
/// Overrides the replica / boundary node URL.
pub const ENV_HOST: &str = "TRACECHAIN_HOST";
/// Overrides the supply-chain canister id.
pub const ENV_CANISTER_ID: &str = "TRACECHAIN_CANISTER_ID";
/// Overrides the Internet Identity canister id (local network only).
pub const ENV_II_CANISTER_ID: &str = "TRACECHAIN_II_CANISTER_ID";
/// Overrides the identity provider URL.
pub const ENV_IDENTITY_PROVIDER: &str = "TRACECHAIN_IDENTITY_PROVIDER";
/// Overrides where delegations are persisted.
pub const ENV_DATA_DIR: &str = "TRACECHAIN_DATA_DIR";

// ─────────────────────────────────────────────────────────────────────────────
// Root
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracechainConfig {
    pub network: NetworkSection,
    pub canisters: CanisterSection,
    pub identity: IdentitySection,
}

impl TracechainConfig {
    /// Create an empty config (all defaults).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: TracechainConfig) {
        self.network.merge(other.network);
        self.canisters.merge(other.canisters);
        self.identity.merge(other.identity);
    }

    /// Apply `TRACECHAIN_*` environment variable overrides.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(network) = get(ENV_NETWORK) {
            self.network.name = Some(network.parse::<Network>().map_err(|message| {
                ConfigError::InvalidValue {
                    key: ENV_NETWORK.to_string(),
                    message,
                }
            })?);
        }
        if let Some(host) = get(ENV_HOST) {
            self.network.host = Some(host);
        }
        if let Some(id) = get(ENV_CANISTER_ID) {
            self.canisters.supply_chain = Some(id);
        }
        if let Some(id) = get(ENV_II_CANISTER_ID) {
            self.canisters.internet_identity = Some(id);
        }
        if let Some(provider) = get(ENV_IDENTITY_PROVIDER) {
            self.identity.provider = Some(provider);
        }
        if let Some(dir) = get(ENV_DATA_DIR) {
            self.identity.data_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Network
// ─────────────────────────────────────────────────────────────────────────────

/// Which Internet Computer deployment to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// A local development replica. Requires fetching its root key.
    #[default]
    Local,
    /// The Internet Computer mainnet.
    Ic,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Ic => "ic",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Ic)
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "ic" | "mainnet" => Ok(Self::Ic),
            other => Err(format!("unknown network '{}' (expected local or ic)", other)),
        }
    }
}

/// `[network]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSection {
    /// Network selector. Default: `local`.
    pub name: Option<Network>,
    /// Replica or boundary node URL. Default depends on the network.
    pub host: Option<String>,
    /// Fetch the replica's root key before the first call.
    /// Default: true on `local`. Ignored on `ic`.
    pub fetch_root_key: Option<bool>,
}

impl NetworkSection {
    fn merge(&mut self, other: NetworkSection) {
        if other.name.is_some() {
            self.name = other.name;
        }
        if other.host.is_some() {
            self.host = other.host;
        }
        if other.fetch_root_key.is_some() {
            self.fetch_root_key = other.fetch_root_key;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Canisters
// ─────────────────────────────────────────────────────────────────────────────

/// `[canisters]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanisterSection {
    /// Supply-chain service canister id.
    pub supply_chain: Option<String>,
    /// Internet Identity canister id on a local replica.
    pub internet_identity: Option<String>,
}

impl CanisterSection {
    fn merge(&mut self, other: CanisterSection) {
        if other.supply_chain.is_some() {
            self.supply_chain = other.supply_chain;
        }
        if other.internet_identity.is_some() {
            self.internet_identity = other.internet_identity;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Identity
// ─────────────────────────────────────────────────────────────────────────────

/// `[identity]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySection {
    /// Identity provider URL. Default depends on the network.
    pub provider: Option<String>,
    /// Maximum lifetime of a delegation, in seconds. Default: 7 days.
    pub max_time_to_live_secs: Option<u64>,
    /// Window placement hints passed to the provider surface.
    pub window_features: Option<String>,
    /// How long to wait for the provider before giving up, in seconds.
    /// Default: 300.
    pub login_timeout_secs: Option<u64>,
    /// Directory holding the persisted delegation.
    pub data_dir: Option<PathBuf>,
}

impl IdentitySection {
    fn merge(&mut self, other: IdentitySection) {
        if other.provider.is_some() {
            self.provider = other.provider;
        }
        if other.max_time_to_live_secs.is_some() {
            self.max_time_to_live_secs = other.max_time_to_live_secs;
        }
        if other.window_features.is_some() {
            self.window_features = other.window_features;
        }
        if other.login_timeout_secs.is_some() {
            self.login_timeout_secs = other.login_timeout_secs;
        }
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
    }
}
