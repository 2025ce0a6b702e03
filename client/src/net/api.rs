//! HTTP client core: the single point of egress to the remote API.
//!
//! REQUEST PHASE
//! =============
//! Every request carries `Content-Type: application/json`; when an access
//! token is stored it is attached as `Authorization: Bearer <token>`. A
//! missing token is not an error here, the server decides.
//!
//! RESPONSE PHASE
//! ==============
//! `classify` is the pure decision: deliver, refresh-and-replay, or reject.
//! A 401 on the initial attempt triggers one refresh call and one replay.
//! A 401 on the replay is returned as-is. Other failures go through the
//! notification side-channel before being returned; 401s never do.
//!
//! CONCURRENCY
//! ===========
//! Refreshes are coalesced. They serialize on `refresh_lock`, which also keeps
//! the outcome of the last refresh. Every refresh bumps `refresh_generation`;
//! a request sent before the current generation shares that outcome instead of
//! refreshing again: it replays after a success, or fails with the same error
//! after a failure without repeating the logout side effect.

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::transport::{OutgoingRequest, RawResponse, ReqwestTransport, Transport};
use super::types::{RefreshResponse, RefreshTokenBody};
use crate::config::ApiConfig;
use crate::error::{ApiError, INVALID_RESPONSE_MESSAGE};
use crate::state::auth::SessionState;
use crate::state::tokens::{TokenKind, TokenStore};
use crate::util::nav::{LOGIN_PATH, LogNavigator, LogNotifier, Navigator, Notice, Notifier};

// =============================================================================
// REQUEST
// =============================================================================

/// Whether a 401 on this request may trigger the refresh protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    #[default]
    OnUnauthorized,
    /// Credential endpoints: a 401 means bad credentials, not a stale token.
    Never,
}

/// Which pass of a request is on the wire. Advances at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Initial,
    Replay,
}

/// A logical API call. Immutable once built; replays reuse it unchanged.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub refresh: RefreshPolicy,
    /// Suppress failure notifications (best-effort calls).
    pub quiet: bool,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            refresh: RefreshPolicy::default(),
            quiet: false,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Encode`] if `body` cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?);
        Ok(self)
    }

    #[must_use]
    pub fn query_pairs(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    #[must_use]
    pub fn without_refresh(mut self) -> Self {
        self.refresh = RefreshPolicy::Never;
        self
    }

    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }
}

// =============================================================================
// DECISION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// 2xx: hand the response to the caller unchanged.
    Deliver,
    /// 401 on the initial attempt: refresh the access token, then replay.
    Refresh,
    /// Give the failure to the caller, notifying first when `notify` is set.
    Reject { notify: bool },
}

/// Decide what to do with an outcome. `status` is `None` when no response
/// was received at all.
#[must_use]
pub fn classify(status: Option<u16>, attempt: Attempt, policy: RefreshPolicy, quiet: bool) -> Disposition {
    match status {
        Some(200..=299) => Disposition::Deliver,
        Some(401) if attempt == Attempt::Initial && policy == RefreshPolicy::OnUnauthorized => Disposition::Refresh,
        Some(401) => Disposition::Reject { notify: false },
        _ => Disposition::Reject { notify: !quiet },
    }
}

/// Result of one refresh attempt, kept for requests that waited on it.
#[derive(Debug, Clone)]
enum RefreshOutcome {
    Refreshed,
    /// No refresh token stored.
    Unavailable,
    /// The refresh endpoint rejected the token or could not be reached.
    Failed(ApiError),
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct ApiClient {
    config: ApiConfig,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    session: SessionState,
    refresh_lock: tokio::sync::Mutex<Option<RefreshOutcome>>,
    refresh_generation: AtomicU64,
}

impl ApiClient {
    /// Client with log-only navigation and notification effects.
    #[must_use]
    pub fn new(config: ApiConfig, transport: Arc<dyn Transport>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            config,
            transport,
            tokens,
            navigator: Arc::new(LogNavigator),
            notifier: Arc::new(LogNotifier),
            session: SessionState::new(),
            refresh_lock: tokio::sync::Mutex::new(None),
            refresh_generation: AtomicU64::new(0),
        }
    }

    /// Client over a `reqwest` transport built from `config.timeouts`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn from_config(config: ApiConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let transport = Arc::new(ReqwestTransport::new(config.timeouts)?);
        Ok(Self::new(config, transport, tokens))
    }

    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    #[must_use]
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub(crate) fn navigate(&self, path: &str) {
        self.navigator.navigate(path);
    }

    pub(crate) fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    /// Send a request and deserialize a success body.
    ///
    /// # Errors
    ///
    /// Any error from [`ApiClient::send`], or [`ApiError::Decode`].
    pub async fn send_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        self.send(request).await?.json()
    }

    /// Send a request through the full auth envelope.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Status`] for a non-success response (including a 401
    ///   that could not be recovered because no refresh token was stored),
    /// - [`ApiError::RefreshFailed`] when the refresh call itself failed,
    /// - [`ApiError::Transport`] when no response was received.
    pub async fn send(&self, request: &ApiRequest) -> Result<RawResponse, ApiError> {
        let mut attempt = Attempt::Initial;
        loop {
            let generation = self.refresh_generation.load(Ordering::Acquire);
            let access = self.tokens.get(TokenKind::Access);
            let outgoing = self.prepare(request, access.as_deref())?;
            let outcome = self.transport.send(outgoing).await;
            let status = outcome.as_ref().ok().map(|resp| resp.status);

            match classify(status, attempt, request.refresh, request.quiet) {
                Disposition::Deliver => return outcome,
                Disposition::Refresh => {
                    attempt = Attempt::Replay;
                    let original = into_error(outcome);
                    match self.refresh_access_token(generation).await {
                        RefreshOutcome::Refreshed => {
                            tracing::debug!(path = %request.path, "replaying request after token refresh");
                        }
                        RefreshOutcome::Unavailable => return Err(original),
                        RefreshOutcome::Failed(e) => return Err(ApiError::RefreshFailed(Box::new(e))),
                    }
                }
                Disposition::Reject { notify } => {
                    let err = into_error(outcome);
                    if notify {
                        self.notifier.notify(Notice::error(err.user_message()));
                    }
                    return Err(err);
                }
            }
        }
    }

    fn prepare(&self, request: &ApiRequest, access: Option<&str>) -> Result<OutgoingRequest, ApiError> {
        let mut headers = json_headers();
        if let Some(token) = access {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ApiError::Transport(format!("invalid authorization header: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        } else {
            tracing::debug!(path = %request.path, "no access token; sending without bearer");
        }
        Ok(OutgoingRequest {
            method: request.method.clone(),
            url: self.url_with_query(&request.path, &request.query)?,
            headers,
            body: request.body.clone(),
        })
    }

    fn url_with_query(&self, path: &str, query: &[(String, String)]) -> Result<String, ApiError> {
        let raw = self.config.url(path);
        if query.is_empty() {
            return Ok(raw);
        }
        let mut url = reqwest::Url::parse(&raw).map_err(|e| ApiError::Config(format!("invalid URL {raw}: {e}")))?;
        url.query_pairs_mut().extend_pairs(query);
        Ok(url.into())
    }

    /// Mint a new access token, or share the outcome of a refresh that
    /// completed after `seen` was read. A failed refresh ends the session
    /// while the lock is still held, so waiters never observe half a logout.
    async fn refresh_access_token(&self, seen: u64) -> RefreshOutcome {
        let mut last = self.refresh_lock.lock().await;

        if self.refresh_generation.load(Ordering::Acquire) != seen {
            if let Some(outcome) = last.clone() {
                tracing::debug!("sharing the outcome of a concurrent refresh");
                return outcome;
            }
        }

        let outcome = match self.tokens.get(TokenKind::Refresh) {
            None => {
                tracing::warn!("401 with no refresh token; ending session");
                self.clear_session();
                RefreshOutcome::Unavailable
            }
            Some(refresh_token) => match self.request_access_token(&refresh_token).await {
                Ok(access) => {
                    self.tokens.set(TokenKind::Access, &access, self.config.lifetimes.access);
                    tracing::info!("access token refreshed");
                    RefreshOutcome::Refreshed
                }
                Err(e) => {
                    tracing::warn!(error = %e, "token refresh failed; ending session");
                    self.clear_session();
                    RefreshOutcome::Failed(e)
                }
            },
        };

        *last = Some(outcome.clone());
        self.refresh_generation.fetch_add(1, Ordering::Release);
        outcome
    }

    /// The dedicated refresh call. Goes straight to the transport: no bearer,
    /// no interception, no notification.
    async fn request_access_token(&self, refresh_token: &str) -> Result<String, ApiError> {
        let body = serde_json::to_value(RefreshTokenBody { refresh_token })
            .map_err(|e| ApiError::Encode(e.to_string()))?;
        let outgoing = OutgoingRequest {
            method: Method::POST,
            url: self.config.url(&self.config.endpoints.refresh),
            headers: json_headers(),
            body: Some(body),
        };

        let resp = self.transport.send(outgoing).await?;
        if !resp.is_success() {
            return Err(ApiError::from_status(resp.status, &resp.body));
        }
        resp.json::<RefreshResponse>()?
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::InvalidResponse(INVALID_RESPONSE_MESSAGE))
    }

    /// Logout side effect: clear both tokens, drop the session, and force
    /// navigation to the login entry point.
    pub(crate) fn clear_session(&self) {
        self.tokens.clear_all();
        self.session.set_anonymous();
        self.navigator.navigate(LOGIN_PATH);
    }
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

fn into_error(outcome: Result<RawResponse, ApiError>) -> ApiError {
    match outcome {
        Ok(resp) => ApiError::from_status(resp.status, &resp.body),
        Err(e) => e,
    }
}
