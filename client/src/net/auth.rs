//! Auth endpoint wrappers.
//!
//! Credential endpoints never enter the refresh protocol: a 401 from sign-in
//! is a wrong password, and sign-out is best-effort.

use std::sync::Arc;

use super::api::{ApiClient, ApiRequest};
use super::types::{AuthResponse, LoginRequest, RefreshTokenBody, RegisterData, User};
use crate::error::ApiError;

#[derive(Clone)]
pub struct AuthService {
    client: Arc<ApiClient>,
}

impl AuthService {
    #[must_use]
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// `POST {sign_in}` with `{email, password}`.
    ///
    /// # Errors
    ///
    /// Propagates the client error.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let request = ApiRequest::post(&self.client.config().endpoints.sign_in)
            .json(&LoginRequest { email, password })?
            .without_refresh();
        self.client.send_json(&request).await
    }

    /// `POST {sign_up}` with the registration payload.
    ///
    /// # Errors
    ///
    /// Propagates the client error.
    pub async fn register(&self, data: &RegisterData) -> Result<AuthResponse, ApiError> {
        let request = ApiRequest::post(&self.client.config().endpoints.sign_up)
            .json(data)?
            .without_refresh();
        self.client.send_json(&request).await
    }

    /// `GET users/me` through the full auth envelope.
    ///
    /// # Errors
    ///
    /// Propagates the client error.
    pub async fn profile(&self) -> Result<User, ApiError> {
        self.client
            .send_json(&ApiRequest::get(&self.client.config().endpoints.profile))
            .await
    }

    /// `POST {sign_out}` with `{refreshToken}`. Failures are not notified.
    ///
    /// # Errors
    ///
    /// Propagates the client error so the caller can log it.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), ApiError> {
        let request = ApiRequest::post(&self.client.config().endpoints.sign_out)
            .json(&RefreshTokenBody { refresh_token })?
            .without_refresh()
            .quiet();
        self.client.send(&request).await.map(|_| ())
    }
}
