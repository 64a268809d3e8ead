//! Configuration system for the TraceChain client.
//!
//! Provides TOML-based configuration with:
//! - Network selection (`local` replica or the `ic` mainnet)
//! - Canister ids for the supply-chain service and Internet Identity
//! - Identity provider and login settings
//! - Config file layering (XDG user config + project-local overrides)
//! - Environment variable overrides applied on top of the files
//!
//! The merged [`TracechainConfig`] is resolved once at startup into an
//! [`Endpoint`], the validated view every other crate consumes.

pub mod discovery;
pub mod endpoint;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, default_data_dir, load_config, load_config_file,
    load_config_with_options, xdg_config_dir, xdg_config_path,
};
pub use endpoint::{
    DEFAULT_LOGIN_TIMEOUT, DEFAULT_MAX_TIME_TO_LIVE, DEFAULT_WINDOW_FEATURES, Endpoint, IC_HOST,
    IC_IDENTITY_PROVIDER, LOCAL_HOST,
};
pub use error::{ConfigError, Result};
pub use types::*;
