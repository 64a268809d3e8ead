//! Wiring of one session manager to one proxy.

use std::sync::Arc;

use tracechain_auth::{LoginOptions, LoopbackBroker, SessionManager, SharedBroker};
use tracechain_config::Endpoint;

use crate::error::Result;
use crate::proxy::RemoteServiceProxy;
use crate::transport::{AgentTransportFactory, TransportFactory};

/// A session manager and the proxy it drives.
///
/// The proxy is registered as a session listener, so its remote handle
/// always tracks the session's current identity.
#[derive(Debug, Clone)]
pub struct Connection {
    session: Arc<SessionManager>,
    proxy: Arc<RemoteServiceProxy>,
}

impl Connection {
    /// Wire an arbitrary broker and transport factory.
    pub fn new(
        broker: SharedBroker,
        factory: Arc<dyn TransportFactory>,
        options: LoginOptions,
    ) -> Self {
        let proxy = Arc::new(RemoteServiceProxy::new(factory));
        let session = Arc::new(SessionManager::new(broker, options).with_listener(proxy.clone()));
        Self { session, proxy }
    }

    /// Production wiring: loopback Internet Identity login and an ic-agent
    /// transport for the configured canister.
    pub fn from_config(endpoint: &Endpoint) -> Result<Self> {
        Self::with_broker(endpoint, Arc::new(LoopbackBroker::from_endpoint(endpoint)))
    }

    /// The ic-agent transport for the configured canister, with a caller
    /// supplied broker.
    pub fn with_broker(endpoint: &Endpoint, broker: SharedBroker) -> Result<Self> {
        let factory = AgentTransportFactory::from_endpoint(endpoint)?;
        Ok(Self::new(
            broker,
            Arc::new(factory),
            LoginOptions::from_endpoint(endpoint),
        ))
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn proxy(&self) -> &RemoteServiceProxy {
        &self.proxy
    }
}
