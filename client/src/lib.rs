//! # client
//!
//! Session client for the Meetscribe REST API.
//!
//! This crate owns the auth lifecycle: the cookie-backed token store, the
//! HTTP client core that attaches bearer tokens and transparently refreshes
//! them on a 401, the observable session context, and the route guard. Both
//! the `meetscribe` CLI and the `meetscribe-edge` router build on it.

pub mod config;
pub mod error;
pub mod net;
pub mod state;
pub mod util;

#[cfg(test)]
mod test_helpers;

pub use config::{ApiConfig, EndpointNaming};
pub use error::ApiError;
pub use net::api::ApiClient;
pub use state::auth::{Session, SessionState, SessionStatus};
pub use state::session::SessionContext;
pub use state::tokens::{CookieTokenStore, FileTokenStore, TokenKind, TokenStore};
pub use util::auth::{Guard, GuardDecision, PathCategory};
