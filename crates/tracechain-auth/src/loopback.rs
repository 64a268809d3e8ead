//! Browser login against Internet Identity through a localhost relay page.
//!
//! Internet Identity only talks to the window that opened it, over
//! `postMessage`. The broker therefore serves a small relay page on
//! loopback and opens that page in the browser:
//!
//! 1. Generate a session key and bind the relay server on `127.0.0.1`.
//! 2. Hand the relay URL to a URL handler, which by default opens the
//!    system browser.
//! 3. The relay page opens the provider's `#authorize` page in a popup,
//!    answers `authorize-ready` with the session public key and the maximum
//!    credential lifetime, and receives `authorize-client-success` (or
//!    `authorize-client-failure`).
//! 4. The page POSTs the delegation chain (or the error) to `/callback`.
//! 5. The broker checks the chain against the session key, persists it,
//!    and returns the delegated identity.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use parking_lot::Mutex;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracechain_config::{DEFAULT_LOGIN_TIMEOUT, Endpoint};
use url::Url;

use crate::broker::{CredentialBroker, LoginOptions};
use crate::delegation::{DelegationChain, DelegationStore, SessionKey, StoredDelegation};
use crate::error::{AuthError, Result};
use crate::identity::Identity;

const RELAY_PAGE: &str = include_str!("relay.html");

/// What the URL handler receives for each login attempt.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Local relay page to open in a browser.
    pub url: String,
    /// Provider page the relay opens in a popup.
    pub provider_url: String,
    /// Hex DER public key of this attempt's session key.
    pub session_public_key: String,
    pub callback_url: String,
    pub window_features: String,
}

/// Callback invoked with the relay URL. It may block.
pub type UrlHandler = Arc<dyn Fn(&AuthorizationRequest) + Send + Sync>;

/// Production credential broker.
pub struct LoopbackBroker {
    store: DelegationStore,
    identity_provider: Url,
    bind_addr: SocketAddr,
    timeout: Duration,
    url_handler: UrlHandler,
}

impl LoopbackBroker {
    /// Broker for delegations issued by `identity_provider`.
    pub fn new(store: DelegationStore, identity_provider: Url) -> Self {
        Self {
            store,
            identity_provider,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            timeout: DEFAULT_LOGIN_TIMEOUT,
            url_handler: Arc::new(open_in_browser),
        }
    }

    /// Broker storing the endpoint network's delegation in its data directory.
    pub fn from_endpoint(endpoint: &Endpoint) -> Self {
        Self::new(
            DelegationStore::new(&endpoint.data_dir, endpoint.network),
            endpoint.identity_provider.clone(),
        )
        .with_timeout(endpoint.login_timeout)
    }

    /// How long to wait for the provider before giving up.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Replace the default browser launcher.
    pub fn with_url_handler(
        mut self,
        handler: impl Fn(&AuthorizationRequest) + Send + Sync + 'static,
    ) -> Self {
        self.url_handler = Arc::new(handler);
        self
    }

    pub fn store(&self) -> &DelegationStore {
        &self.store
    }

    pub fn identity_provider(&self) -> &Url {
        &self.identity_provider
    }

    /// The stored delegation, if this broker's provider issued it and it
    /// has not expired. Expired entries are deleted.
    fn load_current(&self) -> Result<Option<StoredDelegation>> {
        let Some(stored) = self.store.load()? else {
            return Ok(None);
        };

        if !stored.issued_by(&self.identity_provider) {
            tracing::info!(
                issued_by = %stored.identity_provider,
                provider = %self.identity_provider,
                "Stored delegation belongs to another identity provider; ignoring"
            );
            return Ok(None);
        }

        if stored.is_expired() {
            tracing::info!("Stored delegation expired; discarding");
            self.store.delete()?;
            return Ok(None);
        }

        Ok(Some(stored))
    }
}

impl std::fmt::Debug for LoopbackBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopbackBroker")
            .field("store", &self.store)
            .field("identity_provider", &self.identity_provider.as_str())
            .field("bind_addr", &self.bind_addr)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// The provider's authorization page.
pub fn authorization_url(identity_provider: &Url) -> String {
    let mut url = identity_provider.clone();
    url.set_fragment(Some("authorize"));
    url.to_string()
}

/// Render the relay page for one login attempt.
pub fn relay_page(
    provider_url: &str,
    session_public_key: &str,
    max_time_to_live_nanos: u64,
    window_features: &str,
) -> String {
    let login = serde_json::json!({
        "provider": provider_url,
        "sessionPublicKey": session_public_key,
        "maxTimeToLive": max_time_to_live_nanos.to_string(),
        "windowFeatures": window_features,
    });
    // Must not close the surrounding script element.
    let login = login.to_string().replace("</", "<\\/");
    RELAY_PAGE.replace("__LOGIN__", &login)
}

#[async_trait]
impl CredentialBroker for LoopbackBroker {
    async fn restore(&self) -> Result<Option<Identity>> {
        match self.load_current()? {
            Some(stored) => stored.identity().map(Some),
            None => Ok(None),
        }
    }

    async fn authenticate(&self, options: &LoginOptions) -> Result<Identity> {
        let session = SessionKey::generate();

        let listener = TcpListener::bind(self.bind_addr).await.map_err(|e| {
            AuthError::ProviderUnavailable(format!("failed to bind login relay: {}", e))
        })?;
        let local_addr = listener.local_addr().map_err(|e| {
            AuthError::ProviderUnavailable(format!("failed to bind login relay: {}", e))
        })?;

        let request = AuthorizationRequest {
            url: format!("http://{}/", local_addr),
            provider_url: authorization_url(&options.identity_provider),
            session_public_key: session.public_key_hex(),
            callback_url: format!("http://{}/callback", local_addr),
            window_features: options.window_features.clone(),
        };
        let page = relay_page(
            &request.provider_url,
            &request.session_public_key,
            options.max_time_to_live_nanos(),
            &request.window_features,
        );

        let (outcome_tx, outcome_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let router = relay_router(Arc::new(RelayState {
            page,
            outcome: Mutex::new(Some(outcome_tx)),
        }));
        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .ok();
        });

        tracing::info!(
            relay = %request.url,
            provider = %request.provider_url,
            window = %request.window_features,
            "Waiting for identity provider"
        );
        // Not awaited: the login timeout covers a slow or stuck handler.
        let handler = self.url_handler.clone();
        let handoff = request.clone();
        tokio::task::spawn_blocking(move || handler(&handoff));

        let outcome = tokio::time::timeout(self.timeout, outcome_rx).await;
        shutdown_tx.send(()).ok();

        let chain = match outcome {
            Err(_) => {
                return Err(AuthError::AuthenticationDenied(format!(
                    "no response from identity provider within {}s",
                    self.timeout.as_secs()
                )));
            }
            Ok(Err(_)) => {
                return Err(AuthError::AuthenticationDenied(
                    "login surface closed".to_string(),
                ));
            }
            Ok(Ok(CallbackOutcome::Denied(reason))) => {
                return Err(AuthError::AuthenticationDenied(reason));
            }
            Ok(Ok(CallbackOutcome::Malformed(reason))) => {
                return Err(AuthError::ProviderUnavailable(format!(
                    "malformed provider response: {}",
                    reason
                )));
            }
            Ok(Ok(CallbackOutcome::Delegation(chain))) => chain,
        };

        let identity = chain.to_identity(&session)?;
        if identity.is_expired() {
            return Err(AuthError::ProviderUnavailable(
                "provider issued an expired delegation".to_string(),
            ));
        }

        self.store
            .save(&session, &chain, &options.identity_provider)?;
        tracing::info!(principal = %identity, "Delegation received");
        Ok(identity)
    }

    async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.store.load_valid(&self.identity_provider)?.is_some())
    }

    async fn revoke(&self) -> Result<()> {
        self.store.delete()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Relay server
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum CallbackOutcome {
    Delegation(DelegationChain),
    Denied(String),
    Malformed(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CallbackPayload {
    Delegation { delegation: DelegationChain },
    Error { error: String },
}

struct RelayState {
    page: String,
    outcome: Mutex<Option<oneshot::Sender<CallbackOutcome>>>,
}

fn relay_router(state: Arc<RelayState>) -> Router {
    Router::new()
        .route("/", get(handle_relay_page))
        .route("/callback", post(handle_callback))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Handle GET /
async fn handle_relay_page(State(state): State<Arc<RelayState>>) -> Html<String> {
    Html(state.page.clone())
}

/// Handle POST /callback
async fn handle_callback(State(state): State<Arc<RelayState>>, body: String) -> impl IntoResponse {
    let outcome = match serde_json::from_str::<CallbackPayload>(&body) {
        Ok(CallbackPayload::Delegation { delegation }) => CallbackOutcome::Delegation(delegation),
        Ok(CallbackPayload::Error { error }) => CallbackOutcome::Denied(error),
        Err(e) => CallbackOutcome::Malformed(e.to_string()),
    };

    let Some(sender) = state.outcome.lock().take() else {
        return (StatusCode::CONFLICT, "Login already completed.");
    };

    sender.send(outcome).ok();
    (
        StatusCode::OK,
        "Login complete. You can close this window and return to the terminal.",
    )
}

/// Default URL handler: open the system browser.
pub fn open_in_browser(request: &AuthorizationRequest) {
    tracing::debug!(url = %request.url, "Opening login relay");
    if let Err(e) = launch_browser(&request.url) {
        tracing::warn!(error = %e, "Could not open a browser; open the login URL manually");
    }
}

/// Start the platform opener without waiting for it to exit.
fn launch_browser(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", url])
            .spawn()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegation::tests::{USER_PUBLIC_KEY, chain_for, provider};
    use crate::identity::now_nanos;
    use candid::Principal;
    use tempfile::TempDir;
    use tokio::sync::mpsc;
    use tracechain_config::Network;

    fn options() -> LoginOptions {
        LoginOptions {
            identity_provider: provider(),
            max_time_to_live: Duration::from_secs(3600),
            window_features: "width=500".to_string(),
        }
    }

    fn store(dir: &TempDir) -> DelegationStore {
        DelegationStore::new(dir.path(), Network::Ic)
    }

    /// Broker whose URL handler forwards each request to the test.
    fn broker(dir: &TempDir) -> (LoopbackBroker, mpsc::UnboundedReceiver<AuthorizationRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let broker = LoopbackBroker::new(store(dir), provider())
            .with_timeout(Duration::from_secs(10))
            .with_url_handler(move |req| {
                tx.send(req.clone()).ok();
            });
        (broker, rx)
    }

    /// Start a login in the background and wait for its relay request.
    async fn start_login(
        broker: &Arc<LoopbackBroker>,
        requests: &mut mpsc::UnboundedReceiver<AuthorizationRequest>,
    ) -> (tokio::task::JoinHandle<Result<Identity>>, AuthorizationRequest) {
        let login = tokio::spawn({
            let broker = broker.clone();
            async move { broker.authenticate(&options()).await }
        });
        let request = requests.recv().await.unwrap();
        (login, request)
    }

    async fn post(url: &str, body: String) -> reqwest::StatusCode {
        reqwest::Client::new()
            .post(url)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap()
            .status()
    }

    fn far_future() -> u64 {
        now_nanos() + 3_600_000_000_000
    }

    #[test]
    fn test_authorization_url() {
        assert_eq!(
            authorization_url(&provider()),
            "https://identity.ic0.app/#authorize"
        );
        let local = Url::parse("http://be2us-64aaa-aaaaa-qaabq-cai.localhost:4943/#old").unwrap();
        assert_eq!(
            authorization_url(&local),
            "http://be2us-64aaa-aaaaa-qaabq-cai.localhost:4943/#authorize"
        );
    }

    #[test]
    fn test_relay_page_embeds_login_parameters() {
        let page = relay_page("https://identity.ic0.app/#authorize", "3c30", 42, "</script>");
        assert!(page.contains(r#""sessionPublicKey":"3c30""#));
        assert!(page.contains(r#""maxTimeToLive":"42""#));
        assert!(page.contains(r#""provider":"https://identity.ic0.app/#authorize""#));
        assert!(page.contains(r#""windowFeatures":"<\/script>""#));
        assert!(!page.contains("__LOGIN__"));
        assert!(page.contains("authorize-client"));
    }

    #[tokio::test]
    async fn test_relay_page_served_for_login() {
        let dir = TempDir::new().unwrap();
        let (broker, mut requests) = broker(&dir);
        let broker = Arc::new(broker);
        let (login, request) = start_login(&broker, &mut requests).await;

        assert!(request.url.starts_with("http://127.0.0.1:"));
        assert_eq!(request.provider_url, "https://identity.ic0.app/#authorize");
        assert_eq!(request.window_features, "width=500");

        let response = reqwest::get(&request.url).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let page = response.text().await.unwrap();
        assert!(page.contains(&format!(
            r#""sessionPublicKey":"{}""#,
            request.session_public_key
        )));
        assert!(page.contains(r#""maxTimeToLive":"3600000000000""#));

        let body = serde_json::json!({ "error": "UserInterrupt" }).to_string();
        post(&request.callback_url, body).await;
        assert!(login.await.unwrap().unwrap_err().is_denied());
    }

    #[tokio::test]
    async fn test_login_success_persists_delegation() {
        let dir = TempDir::new().unwrap();
        let (broker, mut requests) = broker(&dir);
        let broker = Arc::new(broker);
        let (login, request) = start_login(&broker, &mut requests).await;

        // The delegation targets the session key the provider was given.
        let mut chain = chain_for(&SessionKey::generate(), far_future());
        chain.delegations[0].delegation.pubkey = request.session_public_key.clone();
        let body = serde_json::json!({ "delegation": chain }).to_string();
        assert_eq!(post(&request.callback_url, body).await, reqwest::StatusCode::OK);

        let identity = login.await.unwrap().unwrap();
        let user_key = hex::decode(USER_PUBLIC_KEY).unwrap();
        assert_eq!(identity.principal(), Principal::self_authenticating(&user_key));

        assert!(broker.store().exists());
        assert!(broker.store().load().unwrap().unwrap().issued_by(&provider()));
        assert!(broker.is_authenticated().await.unwrap());
        let restored = broker.restore().await.unwrap().unwrap();
        assert_eq!(restored, identity);

        broker.revoke().await.unwrap();
        assert!(!broker.is_authenticated().await.unwrap());
        assert!(broker.restore().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_for_other_session_key_rejected() {
        let dir = TempDir::new().unwrap();
        let (broker, mut requests) = broker(&dir);
        let broker = Arc::new(broker);
        let (login, request) = start_login(&broker, &mut requests).await;

        let chain = chain_for(&SessionKey::generate(), far_future());
        let body = serde_json::json!({ "delegation": chain }).to_string();
        post(&request.callback_url, body).await;

        let err = login.await.unwrap().unwrap_err();
        assert_eq!(
            err,
            AuthError::ProviderUnavailable("delegation targets a different session key".into())
        );
        assert!(!broker.store().exists());
    }

    #[tokio::test]
    async fn test_login_error_payload_is_denied() {
        let dir = TempDir::new().unwrap();
        let (broker, mut requests) = broker(&dir);
        let broker = Arc::new(broker);
        let (login, request) = start_login(&broker, &mut requests).await;

        let body = serde_json::json!({ "error": "UserInterrupt" }).to_string();
        post(&request.callback_url, body).await;

        let err = login.await.unwrap().unwrap_err();
        assert_eq!(err, AuthError::AuthenticationDenied("UserInterrupt".into()));
        assert!(!broker.store().exists());
    }

    #[tokio::test]
    async fn test_login_malformed_payload_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let (broker, mut requests) = broker(&dir);
        let broker = Arc::new(broker);
        let (login, request) = start_login(&broker, &mut requests).await;

        post(&request.callback_url, r#"{"delegation": {"publicKey": 5}}"#.to_string()).await;

        let err = login.await.unwrap().unwrap_err();
        assert!(matches!(err, AuthError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn test_login_timeout_is_denied() {
        let dir = TempDir::new().unwrap();
        let (broker, _requests) = broker(&dir);
        let broker = broker.with_timeout(Duration::from_millis(50));

        let err = broker.authenticate(&options()).await.unwrap_err();
        assert!(err.is_denied());
    }

    #[tokio::test]
    async fn test_blocking_url_handler_does_not_delay_timeout() {
        let dir = TempDir::new().unwrap();
        let broker = LoopbackBroker::new(store(&dir), provider())
            .with_timeout(Duration::from_millis(50))
            .with_url_handler(|_| std::thread::sleep(Duration::from_secs(1)));

        let started = std::time::Instant::now();
        let err = broker.authenticate(&options()).await.unwrap_err();
        assert!(err.is_denied());
        assert!(started.elapsed() < Duration::from_millis(900));
    }

    #[tokio::test]
    async fn test_restore_discards_expired() {
        let dir = TempDir::new().unwrap();
        let (broker, _requests) = broker(&dir);
        let session = SessionKey::generate();
        broker
            .store()
            .save(&session, &chain_for(&session, 1), &provider())
            .unwrap();

        assert!(!broker.is_authenticated().await.unwrap());
        assert!(broker.restore().await.unwrap().is_none());
        assert!(!broker.store().exists());
    }

    #[tokio::test]
    async fn test_restore_ignores_other_provider() {
        let dir = TempDir::new().unwrap();
        let (broker, _requests) = broker(&dir);
        let session = SessionKey::generate();
        let local = Url::parse("http://be2us-64aaa-aaaaa-qaabq-cai.localhost:4943").unwrap();
        broker
            .store()
            .save(&session, &chain_for(&session, far_future()), &local)
            .unwrap();

        assert!(!broker.is_authenticated().await.unwrap());
        assert!(broker.restore().await.unwrap().is_none());
        // Still usable by a broker for the provider that issued it.
        assert!(broker.store().exists());
        let local_broker = LoopbackBroker::new(store(&dir), local);
        assert!(local_broker.restore().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_from_endpoint_keys_store_by_network() {
        let dir = TempDir::new().unwrap();
        let mut config = tracechain_config::TracechainConfig::new();
        config.identity.data_dir = Some(dir.path().to_path_buf());
        let local = Endpoint::resolve(&config).unwrap();
        config.network.name = Some(Network::Ic);
        let ic = Endpoint::resolve(&config).unwrap();

        let local_broker = LoopbackBroker::from_endpoint(&local);
        let ic_broker = LoopbackBroker::from_endpoint(&ic);
        assert_ne!(local_broker.store().path(), ic_broker.store().path());
        assert_eq!(ic_broker.identity_provider(), &ic.identity_provider);

        let session = SessionKey::generate();
        local_broker
            .store()
            .save(&session, &chain_for(&session, far_future()), &local.identity_provider)
            .unwrap();
        assert!(local_broker.restore().await.unwrap().is_some());
        assert!(ic_broker.restore().await.unwrap().is_none());
    }
}
