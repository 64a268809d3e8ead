//! Typed client for the TraceChain supply-chain canister.
//!
//! The [`RemoteServiceProxy`] exposes one async method per canister method.
//! It only works while a [`SessionManager`](tracechain_auth::SessionManager)
//! holds an authenticated identity; [`Connection`] wires the two together.
//!
//! # Example
//!
//! ```no_run
//! use tracechain_client::{Connection, Result};
//! use tracechain_config::{Endpoint, load_config};
//!
//! # async fn example() -> Result<()> {
//! let mut config = load_config(None)?.config;
//! config.apply_env()?;
//! let endpoint = Endpoint::resolve(&config)?;
//! let connection = Connection::from_config(&endpoint)?;
//!
//! connection.session().initialize().await;
//! if !connection.session().state().is_authenticated() {
//!     connection.session().login().await;
//! }
//!
//! let status = connection.proxy().get_canister_status().await?;
//! println!("canister v{} holds {} products", status.version, status.total_products);
//! # Ok(())
//! # }
//! ```
//!
//! # Operations
//!
//! - **Users**: `register_user`, `get_user`, `update_user_verification`
//! - **Products**: `register_product`, `get_product`, `search_products`
//! - **Supply chain**: `add_supply_chain_event`, `get_supply_chain_events`
//! - **Partners**: `register_partner`, `get_partners`
//! - **System**: `get_analytics`, `get_canister_status`, `test_connection`

pub mod api;
pub mod connection;
pub mod error;
pub mod proxy;
pub mod transport;

pub use connection::Connection;
pub use error::{ClientError, Result};
pub use proxy::RemoteServiceProxy;
pub use transport::{
    AgentTransportFactory, CallKind, CanisterTransport, SharedTransport, TransportError,
    TransportFactory,
};
