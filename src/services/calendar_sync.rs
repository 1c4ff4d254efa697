// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar sync engine.
//!
//! Keeps exactly one dashboard event per plan session date in a dedicated
//! calendar. Each `sync` call:
//! 1. Resolves (or creates) the training calendar
//! 2. Finds every event that belongs to the session date
//! 3. Deletes all but the first match (heals earlier duplicates)
//! 4. Updates the survivor in place, or creates the event
//!
//! Token and calendar ID live in an explicit [`SyncSession`] owned by the
//! caller. A rejected token triggers one re-authentication and one retry.

use crate::error::{ApiError, AppError, Result};
use crate::models::calendar::{CalendarEvent, EventTime};
use crate::models::plan::{PlannedSession, SessionType};
use crate::services::google_calendar::{CalendarApi, EventQuery};
use crate::services::google_oauth::TokenProvider;
use crate::time_utils::start_of_day_rfc3339;
use chrono::{Duration, NaiveDate};
use std::future::Future;
use std::sync::Arc;

/// Marker embedded in descriptions of events this dashboard manages.
pub const SENTINEL_TAG: &str = "[MarathonDashboard]";

/// Summary fragment of events created before descriptions were tagged.
const RUN_MARKER: &str = "Run:";

/// Free-text filter sent with event listings.
const SEARCH_TEXT: &str = "Run";

const SERVICE: &str = "Google Calendar";

/// Where the engine is in acquiring calendar access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    TokenRequested,
    Authenticated,
}

/// Process-local calendar session: access token and resolved calendar ID.
///
/// The calendar ID is only valid for the token it was resolved with; any
/// token change clears it.
#[derive(Debug, Default)]
pub struct SyncSession {
    state: AuthState,
    access_token: Option<String>,
    calendar_id: Option<String>,
}

impl SyncSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auth_state(&self) -> AuthState {
        self.state
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn calendar_id(&self) -> Option<&str> {
        self.calendar_id.as_deref()
    }

    /// Drop the token and everything derived from it.
    pub fn invalidate(&mut self) {
        self.state = AuthState::Unauthenticated;
        self.access_token = None;
        self.calendar_id = None;
    }

    /// Install a newly granted token; the cached calendar ID is discarded.
    pub fn replace_token(&mut self, token: String) {
        self.state = AuthState::Authenticated;
        self.access_token = Some(token);
        self.calendar_id = None;
    }

    fn begin_token_request(&mut self) {
        self.state = AuthState::TokenRequested;
        self.access_token = None;
        self.calendar_id = None;
    }

    fn cache_calendar_id(&mut self, calendar_id: String) {
        self.calendar_id = Some(calendar_id);
    }
}

/// Bounded retry for calls that fail with an auth error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; 2 means one re-auth + retry.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 2 }
    }
}

/// Whether `sync` wrote a new event or rewrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Created,
    Updated,
}

/// Result of syncing one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    pub action: SyncAction,
    pub event: CalendarEvent,
    pub duplicates_removed: usize,
}

// ─── Matching ──────────────────────────────────────────────────────────

/// Tier 1: the event carries the dashboard sentinel.
pub fn is_tagged(event: &CalendarEvent) -> bool {
    event
        .description
        .as_deref()
        .is_some_and(|d| d.contains(SENTINEL_TAG))
}

/// Tier 2: untagged legacy events named like "Easy Run: 8 km".
pub fn looks_like_run(event: &CalendarEvent) -> bool {
    event
        .summary
        .as_deref()
        .is_some_and(|s| s.contains(RUN_MARKER))
}

/// Whether `event` is the dashboard event for `date`.
pub fn matches_session_date(event: &CalendarEvent, date: NaiveDate) -> bool {
    event.start_date() == Some(date) && (is_tagged(event) || looks_like_run(event))
}

/// Keep events belonging to `date`, tagged ones first, otherwise in listing order.
pub fn select_matches(events: Vec<CalendarEvent>, date: NaiveDate) -> Vec<CalendarEvent> {
    let mut matches: Vec<CalendarEvent> = events
        .into_iter()
        .filter(|e| matches_session_date(e, date))
        .collect();
    // Stable sort keeps listing order within each tier
    matches.sort_by_key(|e| !is_tagged(e));
    matches
}

// ─── Payload ───────────────────────────────────────────────────────────

/// Calendar palette ID for a workout type.
pub fn color_id(session_type: SessionType) -> &'static str {
    match session_type {
        SessionType::Easy => "10",    // Basil (green)
        SessionType::Long => "9",     // Blueberry (blue)
        SessionType::Tempo => "6",    // Tangerine (orange)
        SessionType::Interval => "11", // Tomato (red)
        SessionType::Race => "3",     // Grape (purple)
    }
}

/// Canonical event for a session in the given completion state.
pub fn build_event(session: &PlannedSession, completed: bool) -> CalendarEvent {
    let glyph = if completed { "✅" } else { "🏃" };
    let status = if completed { "Completed" } else { "Planned" };

    let summary = format!(
        "{} {} Run: {} km",
        glyph, session.session_type, session.distance
    );
    let description = format!(
        "{}\n\nType: {}\nDistance: {} km\nStatus: {}\n\n{}",
        session.notes, session.session_type, session.distance, status, SENTINEL_TAG
    );

    CalendarEvent {
        id: None,
        summary: Some(summary),
        description: Some(description),
        start: EventTime::all_day(session.date),
        // All-day end dates are exclusive
        end: EventTime::all_day(session.date + Duration::days(1)),
        color_id: Some(color_id(session.session_type).to_string()),
    }
}

/// Listing window of one day either side of `date`.
fn window_around(date: NaiveDate) -> EventQuery {
    EventQuery {
        time_min: start_of_day_rfc3339(date - Duration::days(1)),
        time_max: start_of_day_rfc3339(date + Duration::days(1)),
        text: SEARCH_TEXT.to_string(),
    }
}

// ─── Engine ────────────────────────────────────────────────────────────

/// Calendar sync engine.
#[derive(Clone)]
pub struct CalendarSync {
    api: Arc<dyn CalendarApi>,
    tokens: Arc<dyn TokenProvider>,
    calendar_name: String,
    retry: RetryPolicy,
}

impl CalendarSync {
    pub fn new(
        api: Arc<dyn CalendarApi>,
        tokens: Arc<dyn TokenProvider>,
        calendar_name: impl Into<String>,
    ) -> Self {
        Self {
            api,
            tokens,
            calendar_name: calendar_name.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn calendar_name(&self) -> &str {
        &self.calendar_name
    }

    /// Return the cached token, or request one from the provider.
    async fn ensure_token(&self, state: &mut SyncSession) -> Result<String> {
        if let Some(token) = state.access_token() {
            return Ok(token.to_string());
        }

        state.begin_token_request();
        match self.tokens.request_access_token().await {
            Ok(token) => {
                state.replace_token(token.clone());
                Ok(token)
            }
            Err(e) => {
                state.invalidate();
                Err(e)
            }
        }
    }

    /// Run one collaborator call under the retry policy.
    ///
    /// `call` receives the current access token. An auth failure drops the
    /// token, obtains a new one and tries again until `max_attempts` is used.
    async fn authorized<T, F, Fut>(&self, state: &mut SyncSession, op: &'static str, call: F) -> Result<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = std::result::Result<T, ApiError>>,
    {
        let mut attempt = 1;
        loop {
            let token = self.ensure_token(state).await?;
            match call(token).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_auth_failure() => {
                    state.invalidate();
                    if attempt >= self.retry.max_attempts {
                        tracing::error!(op, attempt, "Calendar token rejected after re-authentication");
                        return Err(AppError::Auth(format!(
                            "{}: access token rejected ({})",
                            op, e.message
                        )));
                    }
                    tracing::warn!(op, attempt, "Calendar token rejected, re-authenticating");
                    attempt += 1;
                }
                Err(e) => return Err(e.into_app_error(SERVICE)),
            }
        }
    }

    /// ID of the training calendar, creating the calendar on first use.
    pub async fn resolve_calendar_id(&self, state: &mut SyncSession) -> Result<String> {
        if let Some(id) = state.calendar_id() {
            return Ok(id.to_string());
        }

        let api = self.api.as_ref();
        let name = self.calendar_name.as_str();

        let calendars = self
            .authorized(state, "list calendars", move |token| async move {
                api.list_calendars(&token).await
            })
            .await?;

        let id = match calendars.into_iter().find(|c| c.summary == name) {
            Some(existing) => {
                tracing::debug!(calendar_id = %existing.id, "Found training calendar");
                existing.id
            }
            None => {
                let created = self
                    .authorized(state, "create calendar", move |token| async move {
                        api.create_calendar(&token, name).await
                    })
                    .await?;
                tracing::info!(calendar_id = %created.id, name, "Created training calendar");
                created.id
            }
        };

        state.cache_calendar_id(id.clone());
        Ok(id)
    }

    /// All dashboard events for `date`, best match first.
    pub async fn find_events(
        &self,
        state: &mut SyncSession,
        date: NaiveDate,
    ) -> Result<Vec<CalendarEvent>> {
        let calendar_id = self.resolve_calendar_id(state).await?;
        let api = self.api.as_ref();
        let cal = calendar_id.as_str();
        let query = window_around(date);
        let query = &query;

        let events = self
            .authorized(state, "list events", move |token| async move {
                api.list_events(&token, cal, query).await
            })
            .await?;

        let matches = select_matches(events, date);
        tracing::debug!(calendar_id = %calendar_id, date = %date, count = matches.len(), "Matched events");
        Ok(matches)
    }

    async fn delete_event(
        &self,
        state: &mut SyncSession,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<bool> {
        let Some(event_id) = event.id.as_deref() else {
            return Ok(false);
        };
        let api = self.api.as_ref();

        self.authorized(state, "delete event", move |token| async move {
            api.delete_event(&token, calendar_id, event_id).await
        })
        .await?;

        tracing::info!(calendar_id, event_id, "Deleted calendar event");
        Ok(true)
    }

    /// Ensure exactly one event reflects `session` in the given state.
    pub async fn sync(
        &self,
        state: &mut SyncSession,
        session: &PlannedSession,
        completed: bool,
    ) -> Result<SyncOutcome> {
        let calendar_id = self.resolve_calendar_id(state).await?;
        let mut matches = self.find_events(state, session.date).await?.into_iter();
        let survivor = matches.next();

        let mut duplicates_removed = 0;
        for duplicate in matches {
            tracing::warn!(
                date = %session.date,
                event_id = ?duplicate.id,
                "Removing duplicate calendar event"
            );
            if self.delete_event(state, &calendar_id, &duplicate).await? {
                duplicates_removed += 1;
            }
        }

        let payload = build_event(session, completed);
        let api = self.api.as_ref();
        let cal = calendar_id.as_str();
        let body = &payload;

        let (action, event) = match survivor.and_then(|e| e.id) {
            Some(event_id) => {
                let id = event_id.as_str();
                let event = self
                    .authorized(state, "update event", move |token| async move {
                        api.update_event(&token, cal, id, body).await
                    })
                    .await?;
                (SyncAction::Updated, event)
            }
            None => {
                let event = self
                    .authorized(state, "create event", move |token| async move {
                        api.insert_event(&token, cal, body).await
                    })
                    .await?;
                (SyncAction::Created, event)
            }
        };

        tracing::info!(
            calendar_id = %calendar_id,
            date = %session.date,
            event_id = ?event.id,
            action = ?action,
            completed,
            "Synced session to calendar"
        );

        Ok(SyncOutcome {
            action,
            event,
            duplicates_removed,
        })
    }

    /// Remove every dashboard event for `date`. Returns the number removed.
    pub async fn delete_for_date(&self, state: &mut SyncSession, date: NaiveDate) -> Result<usize> {
        let calendar_id = self.resolve_calendar_id(state).await?;
        let matches = self.find_events(state, date).await?;

        let mut removed = 0;
        for event in &matches {
            if self.delete_event(state, &calendar_id, event).await? {
                removed += 1;
            }
        }

        Ok(removed)
    }
}
