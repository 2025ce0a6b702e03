//! Shared fakes for unit tests: a scripted transport and recording effects.

use std::sync::{Arc, Mutex};

use reqwest::header::AUTHORIZATION;

use crate::config::{ApiConfig, EndpointNaming};
use crate::error::ApiError;
use crate::net::api::ApiClient;
use crate::net::transport::{OutgoingRequest, RawResponse, Transport};
use crate::net::types::User;
use crate::state::tokens::{CookieTokenStore, TokenStore};
use crate::util::nav::{Navigator, Notice, Notifier};

pub const BASE_URL: &str = "http://api.test/api/v1";

type Handler = dyn Fn(&OutgoingRequest) -> Result<RawResponse, ApiError> + Send + Sync;

/// A request as the transport saw it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: reqwest::Method,
    pub path: String,
    pub bearer: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<serde_json::Value>,
}

/// Transport that answers from a closure and records every request. It
/// yields once before answering so concurrent callers interleave.
pub struct ScriptedTransport {
    handler: Box<Handler>,
    seen: Mutex<Vec<Seen>>,
}

impl ScriptedTransport {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&OutgoingRequest) -> Result<RawResponse, ApiError> + Send + Sync + 'static,
    {
        Arc::new(Self { handler: Box::new(handler), seen: Mutex::new(Vec::new()) })
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.seen().iter().filter(|s| s.path == path).count()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, ApiError> {
        tokio::task::yield_now().await;
        self.seen.lock().unwrap().push(Seen {
            method: request.method.clone(),
            path: path_of(&request.url),
            bearer: bearer_of(&request),
            content_type: request
                .headers
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
            body: request.body.clone(),
        });
        (self.handler)(&request)
    }
}

/// Path relative to [`BASE_URL`], query string stripped.
pub fn path_of(url: &str) -> String {
    let rest = url.strip_prefix(BASE_URL).unwrap_or(url);
    rest.split('?').next().unwrap_or(rest).to_owned()
}

pub fn bearer_of(request: &OutgoingRequest) -> Option<String> {
    request
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_owned)
}

pub fn respond(status: u16, body: serde_json::Value) -> Result<RawResponse, ApiError> {
    Ok(RawResponse { status, body: body.to_string() })
}

pub fn respond_empty(status: u16) -> Result<RawResponse, ApiError> {
    Ok(RawResponse { status, body: String::new() })
}

#[derive(Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_owned());
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// Everything a test needs to drive and inspect one client.
pub struct Harness {
    pub client: Arc<ApiClient>,
    pub transport: Arc<ScriptedTransport>,
    pub tokens: Arc<CookieTokenStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn harness(transport: Arc<ScriptedTransport>) -> Harness {
    let tokens = Arc::new(CookieTokenStore::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let client = ApiClient::new(
        ApiConfig::new(BASE_URL, EndpointNaming::Login),
        transport.clone(),
        tokens.clone() as Arc<dyn TokenStore>,
    )
    .with_navigator(navigator.clone())
    .with_notifier(notifier.clone());
    Harness { client: Arc::new(client), transport, tokens, navigator, notifier }
}

pub fn user_json(id: &str) -> serde_json::Value {
    serde_json::json!({ "id": id, "email": "a@b.com", "name": "Ada", "role": "member" })
}

pub fn user(id: &str) -> User {
    serde_json::from_value(user_json(id)).unwrap()
}
