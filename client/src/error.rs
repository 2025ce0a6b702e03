//! Errors produced by the session client.
//!
//! DESIGN
//! ======
//! One enum covers the whole egress path so callers (forms, the CLI) can match
//! on the failure class: transport, HTTP status, refresh, or a malformed body.
//! `user_message` is the single place that turns an error into the text shown
//! through the notification side-channel.

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

use serde::Deserialize;

pub const FALLBACK_MESSAGE: &str = "An error occurred";
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid response from server";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No response was received (connection refused, timeout, TLS failure).
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("{}", status_display(.status, .message.as_deref(), .error.as_deref()))]
    Status { status: u16, message: Option<String>, error: Option<String> },

    /// The dedicated token refresh call failed; the session has been ended.
    #[error("token refresh failed: {0}")]
    RefreshFailed(Box<ApiError>),

    /// A success response was missing fields the protocol requires.
    #[error("{0}")]
    InvalidResponse(&'static str),

    /// A request body could not be serialized.
    #[error("request body encode failed: {0}")]
    Encode(String),

    /// A success response body could not be deserialized.
    #[error("response parse failed: {0}")]
    Decode(String),

    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    Config(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn status_display(status: &u16, message: Option<&str>, error: Option<&str>) -> String {
    message
        .or(error)
        .map_or_else(|| generic_status_message(*status), str::to_owned)
}

fn generic_status_message(status: u16) -> String {
    format!("Request failed with status code {status}")
}

impl ApiError {
    /// Build a status error from a raw response body, pulling out the
    /// server-provided `message` and `error` fields when the body is JSON.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorBody>(body).unwrap_or_default();
        Self::Status { status, message: parsed.message.and_then(ErrorMessage::into_text), error: parsed.error }
    }

    /// `true` for a 401 from the remote API.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }

    /// `true` when the HTTP client core has already pushed this error through
    /// the notification side-channel. 401s and refresh failures are silent.
    #[must_use]
    pub fn surfaced(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status != 401,
            _ => false,
        }
    }

    /// Human-readable text for notifications: server message, then server
    /// error field, then the generic transport/status message, then a fallback.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.user_message_or(FALLBACK_MESSAGE)
    }

    /// Same as [`ApiError::user_message`] with a caller-chosen fallback.
    #[must_use]
    pub fn user_message_or(&self, fallback: &str) -> String {
        let text = match self {
            Self::Status { status, message, error } => message
                .clone()
                .or_else(|| error.clone())
                .unwrap_or_else(|| generic_status_message(*status)),
            Self::Transport(msg) => msg.clone(),
            Self::RefreshFailed(inner) => return inner.user_message_or(fallback),
            Self::InvalidResponse(msg) => (*msg).to_owned(),
            Self::Encode(_) | Self::Decode(_) | Self::Config(_) | Self::HttpClientBuild(_) => String::new(),
        };
        if text.trim().is_empty() { fallback.to_owned() } else { text }
    }
}

// =============================================================================
// WIRE SHAPE
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<ErrorMessage>,
    #[serde(default)]
    error: Option<String>,
}

/// Validation failures come back with `message` as a list of strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    Text(String),
    List(Vec<String>),
}

impl ErrorMessage {
    fn into_text(self) -> Option<String> {
        let text = match self {
            Self::Text(text) => text,
            Self::List(items) => items.join(", "),
        };
        (!text.trim().is_empty()).then_some(text)
    }
}
