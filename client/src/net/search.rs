//! Transcript search endpoint wrappers.
//!
//! Results are passed through as JSON; their shape belongs to the search
//! backend. Query construction is pure so it can be checked without a wire.

#[cfg(test)]
#[path = "search_test.rs"]
mod tests;

use std::sync::Arc;

use super::api::{ApiClient, ApiRequest};
use crate::error::ApiError;

pub const DEFAULT_LIMIT: u32 = 20;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub meeting_ids: Vec<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl SearchFilters {
    fn push_params(&self, params: &mut Vec<(String, String)>) {
        if !self.meeting_ids.is_empty() {
            params.push(("meetingIds".to_owned(), self.meeting_ids.join(",")));
        }
        if let Some(from) = &self.date_from {
            params.push(("dateFrom".to_owned(), from.clone()));
        }
        if let Some(to) = &self.date_to {
            params.push(("dateTo".to_owned(), to.clone()));
        }
    }
}

pub(crate) fn fulltext_params(query: &str, filters: &SearchFilters, limit: u32, offset: u32) -> Vec<(String, String)> {
    let mut params = vec![
        ("q".to_owned(), query.to_owned()),
        ("limit".to_owned(), limit.to_string()),
        ("offset".to_owned(), offset.to_string()),
    ];
    filters.push_params(&mut params);
    params
}

pub(crate) fn semantic_params(query: &str, filters: &SearchFilters, limit: u32) -> Vec<(String, String)> {
    let mut params = vec![("q".to_owned(), query.to_owned()), ("limit".to_owned(), limit.to_string())];
    filters.push_params(&mut params);
    params
}

#[derive(Clone)]
pub struct SearchService {
    client: Arc<ApiClient>,
}

impl SearchService {
    #[must_use]
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// `GET search/fulltext`.
    ///
    /// # Errors
    ///
    /// Propagates the client error.
    pub async fn fulltext(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: u32,
        offset: u32,
    ) -> Result<serde_json::Value, ApiError> {
        let request = ApiRequest::get("/search/fulltext").query_pairs(fulltext_params(query, filters, limit, offset));
        self.client.send_json(&request).await
    }

    /// `GET search/semantic`.
    ///
    /// # Errors
    ///
    /// Propagates the client error.
    pub async fn semantic(&self, query: &str, filters: &SearchFilters, limit: u32) -> Result<serde_json::Value, ApiError> {
        let request = ApiRequest::get("/search/semantic").query_pairs(semantic_params(query, filters, limit));
        self.client.send_json(&request).await
    }

    /// `GET search/qa`: ask a question about one meeting's transcript.
    ///
    /// # Errors
    ///
    /// Propagates the client error.
    pub async fn ask(&self, meeting_id: &str, question: &str) -> Result<serde_json::Value, ApiError> {
        let request = ApiRequest::get("/search/qa").query_pairs(vec![
            ("meetingId".to_owned(), meeting_id.to_owned()),
            ("question".to_owned(), question.to_owned()),
        ]);
        self.client.send_json(&request).await
    }
}
