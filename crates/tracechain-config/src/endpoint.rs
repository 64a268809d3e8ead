//! Resolved connection settings.
//!
//! [`Endpoint`] is what the rest of the client consumes: every default
//! filled in, every URL parsed, and the production rules applied (no root
//! key fetch on mainnet).

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::discovery::default_data_dir;
use crate::{ConfigError, Network, Result, TracechainConfig};

/// Local replica URL used by `dfx start`.
pub const LOCAL_HOST: &str = "http://localhost:4943";

/// Mainnet boundary node URL.
pub const IC_HOST: &str = "https://ic0.app";

/// Mainnet Internet Identity frontend.
pub const IC_IDENTITY_PROVIDER: &str = "https://identity.ic0.app";

/// Internet Identity canister on mainnet.
pub const IC_INTERNET_IDENTITY_CANISTER: &str = "rdmx6-jaaaa-aaaaa-aaadq-cai";

/// Internet Identity canister id `dfx` assigns on a fresh local replica.
pub const LOCAL_INTERNET_IDENTITY_CANISTER: &str = "be2us-64aaa-aaaaa-qaabq-cai";

/// Supply-chain canister id used when none is configured.
pub const DEFAULT_SUPPLY_CHAIN_CANISTER: &str = "rdmx6-jaaaa-aaaaa-aaadq-cai";

/// Default maximum delegation lifetime: 7 days.
pub const DEFAULT_MAX_TIME_TO_LIVE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Default window placement hints for the provider surface.
pub const DEFAULT_WINDOW_FEATURES: &str =
    "toolbar=0,location=0,menubar=0,width=500,height=500,left=100,top=100";

/// Default time to wait for the identity provider.
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(300);

/// Fully resolved connection settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub network: Network,
    /// Replica or boundary node the agent talks to.
    pub host: Url,
    /// Supply-chain service canister id (textual principal).
    pub supply_chain_canister: String,
    /// Internet Identity canister id (textual principal).
    pub internet_identity_canister: String,
    /// Where the interactive login is performed.
    pub identity_provider: Url,
    /// Whether to fetch the replica root key. Always false on mainnet.
    pub fetch_root_key: bool,
    pub max_time_to_live: Duration,
    pub window_features: String,
    pub login_timeout: Duration,
    /// Directory holding the persisted delegation.
    pub data_dir: PathBuf,
}

impl Endpoint {
    /// Resolve a merged config into an endpoint.
    pub fn resolve(config: &TracechainConfig) -> Result<Self> {
        let network = config.network.name.unwrap_or_default();

        let host_str = config.network.host.clone().unwrap_or_else(|| {
            match network {
                Network::Ic => IC_HOST,
                Network::Local => LOCAL_HOST,
            }
            .to_string()
        });
        let host = parse_url("network.host", &host_str)?;

        let internet_identity_canister = match network {
            Network::Ic => IC_INTERNET_IDENTITY_CANISTER.to_string(),
            Network::Local => config
                .canisters
                .internet_identity
                .clone()
                .unwrap_or_else(|| LOCAL_INTERNET_IDENTITY_CANISTER.to_string()),
        };

        let provider_str = match (&config.identity.provider, network) {
            (Some(provider), _) => provider.clone(),
            (None, Network::Ic) => IC_IDENTITY_PROVIDER.to_string(),
            (None, Network::Local) => format!(
                "http://{}.localhost:{}",
                internet_identity_canister,
                host.port_or_known_default().unwrap_or(4943)
            ),
        };
        let identity_provider = parse_url("identity.provider", &provider_str)?;

        let supply_chain_canister = config
            .canisters
            .supply_chain
            .clone()
            .unwrap_or_else(|| DEFAULT_SUPPLY_CHAIN_CANISTER.to_string());
        if supply_chain_canister.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "canisters.supply_chain".to_string(),
                message: "canister id must not be empty".to_string(),
            });
        }

        let fetch_root_key = match network {
            Network::Ic => false,
            Network::Local => config.network.fetch_root_key.unwrap_or(true),
        };

        let max_time_to_live = config
            .identity
            .max_time_to_live_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_MAX_TIME_TO_LIVE);
        if max_time_to_live.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "identity.max_time_to_live_secs".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            network,
            host,
            supply_chain_canister,
            internet_identity_canister,
            identity_provider,
            fetch_root_key,
            max_time_to_live,
            window_features: config
                .identity
                .window_features
                .clone()
                .unwrap_or_else(|| DEFAULT_WINDOW_FEATURES.to_string()),
            login_timeout: config
                .identity
                .login_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_LOGIN_TIMEOUT),
            data_dir: config
                .identity
                .data_dir
                .clone()
                .unwrap_or_else(default_data_dir),
        })
    }
}

fn parse_url(key: &str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        key: key.to_string(),
        value: value.to_string(),
        source,
    })
}
