//! Session context: the identity operations observers never perform directly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Owns the shared [`ApiClient`] and drives the session channel it carries.
//! Front-ends call `start` once at boot, then `login`/`register`/`logout` in
//! response to user actions, and subscribe to re-render.
//!
//! NOTIFICATIONS
//! =============
//! The HTTP core already notifies non-401 failures. Identity operations only
//! notify failures the core kept silent, so the user never sees two toasts
//! for one error.

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::sync::Arc;

use tokio::sync::watch;

use super::auth::Session;
use super::tokens::TokenKind;
use crate::error::{ApiError, INVALID_RESPONSE_MESSAGE};
use crate::net::api::ApiClient;
use crate::net::auth::AuthService;
use crate::net::types::{AuthResponse, RegisterData, User};
use crate::util::nav::{DASHBOARD_PATH, Notice};

const LOGIN_SUCCESS: &str = "Login successful!";
const LOGIN_FAILED: &str = "Login failed";
const REGISTER_SUCCESS: &str = "Registration successful!";
const REGISTER_FAILED: &str = "Registration failed";
const LOGOUT_SUCCESS: &str = "Logged out successfully";

#[derive(Clone)]
pub struct SessionContext {
    client: Arc<ApiClient>,
    auth: AuthService,
}

impl SessionContext {
    #[must_use]
    pub fn new(client: Arc<ApiClient>) -> Self {
        let auth = AuthService::new(client.clone());
        Self { client, auth }
    }

    #[must_use]
    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    #[must_use]
    pub fn session(&self) -> Session {
        self.client.session().current()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.client.session().subscribe()
    }

    /// Startup reconciliation. Resolves a `Loading` session from whatever
    /// tokens survived the last run.
    pub async fn start(&self) -> Session {
        let state = self.client.session();
        if !self.client.tokens().has(TokenKind::Access) {
            tracing::debug!("no stored access token; starting anonymous");
            state.settle(Session::Anonymous, || {});
            return state.current();
        }

        match self.auth.profile().await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "session restored");
                state.settle(Session::Authenticated(user), || {});
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored session rejected; clearing tokens");
                let tokens = self.client.tokens();
                state.settle(Session::Anonymous, || tokens.clear_all());
            }
        }
        state.current()
    }

    /// Sign in and start a session.
    ///
    /// # Errors
    ///
    /// The client error, or [`ApiError::InvalidResponse`] when the response
    /// lacks the user or either token. The session is left unchanged.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let outcome = self.auth.login(email, password).await;
        self.establish(outcome, LOGIN_SUCCESS, LOGIN_FAILED)
    }

    /// Create an account and start a session.
    ///
    /// # Errors
    ///
    /// Same contract as [`SessionContext::login`].
    pub async fn register(&self, data: &RegisterData) -> Result<User, ApiError> {
        let outcome = self.auth.register(data).await;
        self.establish(outcome, REGISTER_SUCCESS, REGISTER_FAILED)
    }

    fn establish(
        &self,
        outcome: Result<AuthResponse, ApiError>,
        success: &str,
        failure: &str,
    ) -> Result<User, ApiError> {
        let credentials = outcome.and_then(|resp| {
            resp.into_credentials()
                .ok_or(ApiError::InvalidResponse(INVALID_RESPONSE_MESSAGE))
        });

        match credentials {
            Ok(creds) => {
                let lifetimes = self.client.config().lifetimes;
                self.client
                    .tokens()
                    .set_pair(&creds.access_token, &creds.refresh_token, lifetimes);
                self.client.session().set_authenticated(creds.user.clone());
                tracing::info!(user_id = %creds.user.id, "session established");
                self.client.navigate(DASHBOARD_PATH);
                self.client.notify(Notice::success(success));
                Ok(creds.user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "{failure}");
                if !e.surfaced() {
                    self.client.notify(Notice::error(e.user_message_or(failure)));
                }
                Err(e)
            }
        }
    }

    /// End the session. Never fails: the server call is best-effort and the
    /// local teardown always happens.
    pub async fn logout(&self) {
        if let Some(refresh_token) = self.client.tokens().get(TokenKind::Refresh) {
            if let Err(e) = self.auth.logout(&refresh_token).await {
                tracing::warn!(error = %e, "sign-out request failed; clearing session anyway");
            }
        }
        self.client.clear_session();
        tracing::info!("logged out");
        self.client.notify(Notice::success(LOGOUT_SUCCESS));
    }

    /// Re-fetch the profile for an authenticated session.
    ///
    /// # Errors
    ///
    /// Propagates the client error. A session that stopped being
    /// authenticated meanwhile is not resurrected.
    pub async fn refresh_profile(&self) -> Result<User, ApiError> {
        let user = self.auth.profile().await?;
        self.client.session().replace_user(user.clone());
        Ok(user)
    }
}
