// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar API client.
//!
//! Handles:
//! - Calendar list lookup and calendar creation
//! - Event listing over a time window with a text filter
//! - Event create / update / delete
//!
//! Every call takes the bearer token explicitly; token lifecycle belongs to
//! the sync engine.

use crate::error::ApiError;
use crate::models::calendar::{CalendarEvent, CalendarListEntry};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Time window and free-text filter for an event listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    /// Inclusive lower bound (RFC 3339)
    pub time_min: String,
    /// Exclusive upper bound (RFC 3339)
    pub time_max: String,
    /// Free-text search applied by the calendar service
    pub text: String,
}

/// Calendar collaborator.
#[async_trait]
pub trait CalendarApi: Send + Sync {
    async fn list_calendars(&self, token: &str) -> Result<Vec<CalendarListEntry>, ApiError>;

    async fn create_calendar(
        &self,
        token: &str,
        summary: &str,
    ) -> Result<CalendarListEntry, ApiError>;

    async fn list_events(
        &self,
        token: &str,
        calendar_id: &str,
        query: &EventQuery,
    ) -> Result<Vec<CalendarEvent>, ApiError>;

    async fn insert_event(
        &self,
        token: &str,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<CalendarEvent, ApiError>;

    async fn update_event(
        &self,
        token: &str,
        calendar_id: &str,
        event_id: &str,
        event: &CalendarEvent,
    ) -> Result<CalendarEvent, ApiError>;

    async fn delete_event(
        &self,
        token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<(), ApiError>;
}

/// Paged list envelope used by both list endpoints.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Google Calendar v3 REST client.
#[derive(Clone)]
pub struct GoogleCalendarClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for GoogleCalendarClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GoogleCalendarClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        )
    }

    fn event_url(&self, calendar_id: &str, event_id: &str) -> String {
        format!(
            "{}/{}",
            self.events_url(calendar_id),
            urlencoding::encode(event_id)
        )
    }

    /// Follow `nextPageToken` until the listing is exhausted.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.http.get(url).bearer_auth(token).query(params);
            if let Some(ref pt) = page_token {
                request = request.query(&[("pageToken", pt.as_str())]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| ApiError::no_response(e.to_string()))?;
            let page: Page<T> = check_response_json(response).await?;

            items.extend(page.items);
            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarClient {
    async fn list_calendars(&self, token: &str) -> Result<Vec<CalendarListEntry>, ApiError> {
        let url = format!("{}/users/me/calendarList", self.base_url);
        self.get_all_pages(&url, token, &[]).await
    }

    async fn create_calendar(
        &self,
        token: &str,
        summary: &str,
    ) -> Result<CalendarListEntry, ApiError> {
        let url = format!("{}/calendars", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&serde_json::json!({ "summary": summary }))
            .send()
            .await
            .map_err(|e| ApiError::no_response(e.to_string()))?;

        check_response_json(response).await
    }

    async fn list_events(
        &self,
        token: &str,
        calendar_id: &str,
        query: &EventQuery,
    ) -> Result<Vec<CalendarEvent>, ApiError> {
        let url = self.events_url(calendar_id);
        self.get_all_pages(
            &url,
            token,
            &[
                ("timeMin", query.time_min.as_str()),
                ("timeMax", query.time_max.as_str()),
                ("singleEvents", "true"),
                ("q", query.text.as_str()),
            ],
        )
        .await
    }

    async fn insert_event(
        &self,
        token: &str,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<CalendarEvent, ApiError> {
        let response = self
            .http
            .post(self.events_url(calendar_id))
            .bearer_auth(token)
            .json(event)
            .send()
            .await
            .map_err(|e| ApiError::no_response(e.to_string()))?;

        check_response_json(response).await
    }

    async fn update_event(
        &self,
        token: &str,
        calendar_id: &str,
        event_id: &str,
        event: &CalendarEvent,
    ) -> Result<CalendarEvent, ApiError> {
        let response = self
            .http
            .put(self.event_url(calendar_id, event_id))
            .bearer_auth(token)
            .json(event)
            .send()
            .await
            .map_err(|e| ApiError::no_response(e.to_string()))?;

        check_response_json(response).await
    }

    async fn delete_event(
        &self,
        token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(self.event_url(calendar_id, event_id))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ApiError::no_response(e.to_string()))?;

        // Already gone counts as deleted
        if response.status().as_u16() == 410 {
            tracing::debug!(event_id, "Event already deleted");
            return Ok(());
        }

        check_response(response).await
    }
}

/// Check response status and return error if not successful.
async fn check_response(response: reqwest::Response) -> Result<(), ApiError> {
    if response.status().is_success() {
        return Ok(());
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_body(status, &body))
}

/// Check response and parse JSON body.
async fn check_response_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status().as_u16();
    if !response.status().is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::from_body(status, &body));
    }

    response
        .json()
        .await
        .map_err(|e| ApiError::new(status, format!("JSON parse error: {}", e)))
}
