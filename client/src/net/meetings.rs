//! Meetings endpoint wrappers.

#[cfg(test)]
#[path = "meetings_test.rs"]
mod tests;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::api::{ApiClient, ApiRequest};
use crate::error::ApiError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// RFC 3339 timestamp as sent by the API.
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub status: String,
    #[serde(default)]
    pub host: serde_json::Value,
    #[serde(default)]
    pub participants: Vec<serde_json::Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingData {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendee_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderator_password: Option<String>,
}

/// Partial update; only present fields are sent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeetingData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendee_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderator_password: Option<String>,
}

/// `/meetings/{id}[/{action}]` with `id` percent-encoded as one path segment,
/// so an id can never change the request target.
fn meeting_path(id: &str, action: Option<&str>) -> Result<String, ApiError> {
    let mut url = reqwest::Url::parse("http://api.invalid/meetings")
        .map_err(|e| ApiError::Config(format!("meetings path base: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| ApiError::Config("meetings path base cannot carry segments".to_owned()))?
        .push(id)
        .extend(action);
    Ok(url.path().to_owned())
}

#[derive(Clone)]
pub struct MeetingsService {
    client: Arc<ApiClient>,
}

impl MeetingsService {
    #[must_use]
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// Propagates the client error.
    pub async fn list(&self) -> Result<Vec<Meeting>, ApiError> {
        self.client.send_json(&ApiRequest::get("/meetings")).await
    }

    /// # Errors
    ///
    /// Propagates the client error.
    pub async fn get(&self, id: &str) -> Result<Meeting, ApiError> {
        self.client.send_json(&ApiRequest::get(meeting_path(id, None)?)).await
    }

    /// # Errors
    ///
    /// Propagates the client error.
    pub async fn create(&self, data: &CreateMeetingData) -> Result<Meeting, ApiError> {
        self.client
            .send_json(&ApiRequest::post("/meetings").json(data)?)
            .await
    }

    /// # Errors
    ///
    /// Propagates the client error.
    pub async fn update(&self, id: &str, data: &UpdateMeetingData) -> Result<Meeting, ApiError> {
        self.client
            .send_json(&ApiRequest::patch(meeting_path(id, None)?).json(data)?)
            .await
    }

    /// # Errors
    ///
    /// Propagates the client error.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .send(&ApiRequest::delete(meeting_path(id, None)?))
            .await
            .map(|_| ())
    }

    /// # Errors
    ///
    /// Propagates the client error.
    pub async fn join(&self, id: &str) -> Result<serde_json::Value, ApiError> {
        self.client
            .send_json(&ApiRequest::post(meeting_path(id, Some("join"))?))
            .await
    }

    /// # Errors
    ///
    /// Propagates the client error.
    pub async fn leave(&self, id: &str) -> Result<serde_json::Value, ApiError> {
        self.client
            .send_json(&ApiRequest::post(meeting_path(id, Some("leave"))?))
            .await
    }

    /// # Errors
    ///
    /// Propagates the client error.
    pub async fn analytics(&self, id: &str) -> Result<serde_json::Value, ApiError> {
        self.client
            .send_json(&ApiRequest::get(meeting_path(id, Some("analytics"))?))
            .await
    }
}
