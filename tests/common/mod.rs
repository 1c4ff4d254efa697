// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use marathon_dashboard::config::Config;
use marathon_dashboard::db::{FirestoreDb, RunStore};
use marathon_dashboard::error::{ApiError, AppError, IdentityError};
use marathon_dashboard::models::{
    CalendarEvent, CalendarListEntry, NewRun, PlannedSession, RunRecord, SessionType,
};
use marathon_dashboard::services::{
    AuthUser, CalendarApi, CalendarSync, EventQuery, IdentityService, PlanCatalog, TokenProvider,
};
use marathon_dashboard::Dashboard;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

pub const TEST_EMAIL: &str = "runner@example.com";
pub const TEST_PASSWORD: &str = "hunter22";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

#[allow(dead_code)]
pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

#[allow(dead_code)]
pub fn session(date: &str, session_type: SessionType, distance: f64) -> PlannedSession {
    PlannedSession {
        date: d(date),
        session_type,
        distance,
        notes: format!("{} km {}", distance, session_type),
    }
}

/// Two weeks of plan around 2026-03-02 plus the race.
#[allow(dead_code)]
pub fn test_catalog() -> PlanCatalog {
    PlanCatalog::new(
        "test",
        d("2026-04-19"),
        vec![
            session("2026-02-24", SessionType::Easy, 6.0),
            session("2026-02-28", SessionType::Long, 16.0),
            session("2026-03-02", SessionType::Easy, 8.0),
            session("2026-03-05", SessionType::Tempo, 10.0),
            session("2026-03-07", SessionType::Long, 20.0),
            session("2026-04-19", SessionType::Race, 42.195),
        ],
    )
    .expect("valid test catalog")
}

// ─── Run store ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryRunStore {
    runs: Mutex<Vec<RunRecord>>,
    next_id: AtomicUsize,
}

#[allow(dead_code)]
impl MemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored run regardless of owner.
    pub fn all(&self) -> Vec<RunRecord> {
        self.runs.lock().unwrap().clone()
    }

    /// Insert a record as-is, bypassing the tracker (simulates a racing client).
    pub fn insert_raw(&self, record: RunRecord) {
        self.runs.lock().unwrap().push(record);
    }
}

#[async_trait]
impl RunStore for MemoryRunStore {
    async fn create_run(&self, user_id: &str, run: &NewRun) -> Result<RunRecord, AppError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = RunRecord {
            id: format!("run-{}", id),
            user_id: user_id.to_string(),
            date: run.date,
            distance: run.distance,
            duration: run.duration,
            notes: run.notes.clone(),
            is_plan_run: run.is_plan_run,
            plan_date: run.plan_date,
            created_at: "2026-03-02T18:00:00Z".to_string(),
        };
        self.runs.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn list_runs(&self, user_id: &str) -> Result<Vec<RunRecord>, AppError> {
        let mut runs: Vec<RunRecord> = self
            .runs
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        runs.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(runs)
    }

    async fn delete_run(&self, run_id: &str) -> Result<(), AppError> {
        self.runs.lock().unwrap().retain(|r| r.id != run_id);
        Ok(())
    }

    async fn delete_runs_by_plan_date(
        &self,
        user_id: &str,
        plan_date: NaiveDate,
    ) -> Result<usize, AppError> {
        let mut runs = self.runs.lock().unwrap();
        let before = runs.len();
        runs.retain(|r| !(r.user_id == user_id && r.plan_date == Some(plan_date)));
        Ok(before - runs.len())
    }
}

// ─── Identity ──────────────────────────────────────────────────────────

pub struct FakeIdentity {
    accounts: Mutex<HashMap<String, (String, String)>>,
    current: watch::Sender<Option<AuthUser>>,
}

#[allow(dead_code)]
impl FakeIdentity {
    /// Identity with the default test account registered.
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        let mut accounts = HashMap::new();
        accounts.insert(
            TEST_EMAIL.to_string(),
            (TEST_PASSWORD.to_string(), "user-1".to_string()),
        );
        Self {
            accounts: Mutex::new(accounts),
            current,
        }
    }
}

#[async_trait]
impl IdentityService for FakeIdentity {
    fn current_user(&self) -> Option<AuthUser> {
        self.current.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.current.subscribe()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AppError> {
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(email) {
            Some((stored, uid)) if stored == password => {
                let user = AuthUser {
                    uid: uid.clone(),
                    email: Some(email.to_string()),
                };
                self.current.send_replace(Some(user.clone()));
                Ok(user)
            }
            _ => Err(IdentityError::InvalidCredential.into()),
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AppError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(IdentityError::EmailAlreadyInUse.into());
        }
        if password.len() < 6 {
            return Err(IdentityError::WeakPassword.into());
        }
        let uid = format!("user-{}", accounts.len() + 1);
        accounts.insert(email.to_string(), (password.to_string(), uid.clone()));
        let user = AuthUser {
            uid,
            email: Some(email.to_string()),
        };
        self.current.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        self.current.send_replace(None);
        Ok(())
    }
}

// ─── Token provider ────────────────────────────────────────────────────

/// Issues `token-1`, `token-2`, ... or refuses every grant.
#[derive(Default)]
pub struct ScriptedTokenProvider {
    issued: AtomicUsize,
    deny: bool,
}

#[allow(dead_code)]
impl ScriptedTokenProvider {
    pub fn issuing() -> Self {
        Self::default()
    }

    pub fn denying() -> Self {
        Self {
            issued: AtomicUsize::new(0),
            deny: true,
        }
    }

    /// Number of grants requested so far.
    pub fn requests(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for ScriptedTokenProvider {
    async fn request_access_token(&self) -> Result<String, AppError> {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        if self.deny {
            return Err(AppError::Auth("access_denied".to_string()));
        }
        Ok(format!("token-{}", n))
    }
}

// ─── Calendar ──────────────────────────────────────────────────────────

#[derive(Default)]
struct CalendarState {
    calendars: Vec<CalendarListEntry>,
    events: HashMap<String, Vec<CalendarEvent>>,
    next_id: usize,
    rejected_tokens: Vec<String>,
    reject_all: bool,
    calls: Vec<&'static str>,
}

/// In-memory calendar service with 401 injection.
#[derive(Default)]
pub struct FakeCalendar {
    state: Mutex<CalendarState>,
}

#[allow(dead_code)]
impl FakeCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer 401 to every call made with `token`.
    pub fn expire_token(&self, token: &str) {
        self.state.lock().unwrap().rejected_tokens.push(token.to_string());
    }

    /// Answer 401 to every call.
    pub fn reject_all_tokens(&self) {
        self.state.lock().unwrap().reject_all = true;
    }

    pub fn add_calendar(&self, summary: &str) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("cal-{}", state.next_id);
        state.calendars.push(CalendarListEntry {
            id: id.clone(),
            summary: summary.to_string(),
        });
        id
    }

    pub fn add_event(&self, calendar_id: &str, mut event: CalendarEvent) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("evt-{}", state.next_id);
        event.id = Some(id.clone());
        state
            .events
            .entry(calendar_id.to_string())
            .or_default()
            .push(event);
        id
    }

    /// Store an event exactly as given, leaving `id` unset.
    pub fn add_event_without_id(&self, calendar_id: &str, event: CalendarEvent) {
        self.state
            .lock()
            .unwrap()
            .events
            .entry(calendar_id.to_string())
            .or_default()
            .push(event);
    }

    pub fn calendars(&self) -> Vec<CalendarListEntry> {
        self.state.lock().unwrap().calendars.clone()
    }

    pub fn events(&self, calendar_id: &str) -> Vec<CalendarEvent> {
        self.state
            .lock()
            .unwrap()
            .events
            .get(calendar_id)
            .cloned()
            .unwrap_or_default()
    }

    /// How many times `op` was called (including rejected calls).
    pub fn calls(&self, op: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| **c == op)
            .count()
    }

    fn begin(&self, op: &'static str, token: &str) -> Result<std::sync::MutexGuard<'_, CalendarState>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(op);
        if state.reject_all || state.rejected_tokens.iter().any(|t| t == token) {
            return Err(ApiError::new(401, "Invalid Credentials"));
        }
        Ok(state)
    }
}

fn window_date(rfc3339: &str) -> NaiveDate {
    NaiveDate::parse_from_str(&rfc3339[..10], "%Y-%m-%d").expect("RFC 3339 date")
}

fn text_matches(event: &CalendarEvent, text: &str) -> bool {
    let needle = text.to_lowercase();
    [&event.summary, &event.description]
        .iter()
        .any(|field| field.as_deref().is_some_and(|f| f.to_lowercase().contains(&needle)))
}

#[async_trait]
impl CalendarApi for FakeCalendar {
    async fn list_calendars(&self, token: &str) -> Result<Vec<CalendarListEntry>, ApiError> {
        let state = self.begin("list_calendars", token)?;
        Ok(state.calendars.clone())
    }

    async fn create_calendar(
        &self,
        token: &str,
        summary: &str,
    ) -> Result<CalendarListEntry, ApiError> {
        let mut state = self.begin("create_calendar", token)?;
        state.next_id += 1;
        let entry = CalendarListEntry {
            id: format!("cal-{}", state.next_id),
            summary: summary.to_string(),
        };
        state.calendars.push(entry.clone());
        Ok(entry)
    }

    async fn list_events(
        &self,
        token: &str,
        calendar_id: &str,
        query: &EventQuery,
    ) -> Result<Vec<CalendarEvent>, ApiError> {
        let state = self.begin("list_events", token)?;
        let (min, max) = (window_date(&query.time_min), window_date(&query.time_max));
        Ok(state
            .events
            .get(calendar_id)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| e.start_date().is_some_and(|s| s >= min && s <= max))
                    .filter(|e| text_matches(e, &query.text))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_event(
        &self,
        token: &str,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<CalendarEvent, ApiError> {
        let mut state = self.begin("insert_event", token)?;
        state.next_id += 1;
        let mut stored = event.clone();
        stored.id = Some(format!("evt-{}", state.next_id));
        state
            .events
            .entry(calendar_id.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn update_event(
        &self,
        token: &str,
        calendar_id: &str,
        event_id: &str,
        event: &CalendarEvent,
    ) -> Result<CalendarEvent, ApiError> {
        let mut state = self.begin("update_event", token)?;
        let existing = state
            .events
            .get_mut(calendar_id)
            .and_then(|events| events.iter_mut().find(|e| e.id.as_deref() == Some(event_id)))
            .ok_or_else(|| ApiError::new(404, "Not Found"))?;
        *existing = CalendarEvent {
            id: Some(event_id.to_string()),
            ..event.clone()
        };
        Ok(existing.clone())
    }

    async fn delete_event(
        &self,
        token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<(), ApiError> {
        let mut state = self.begin("delete_event", token)?;
        let events = state.events.entry(calendar_id.to_string()).or_default();
        let before = events.len();
        events.retain(|e| e.id.as_deref() != Some(event_id));
        if events.len() == before {
            return Err(ApiError::new(404, "Not Found"));
        }
        Ok(())
    }
}

// ─── Wiring ────────────────────────────────────────────────────────────

/// Handles to the fakes behind a test dashboard.
#[allow(dead_code)]
pub struct TestHarness {
    pub dashboard: Dashboard,
    pub store: Arc<MemoryRunStore>,
    pub calendar: Arc<FakeCalendar>,
    pub tokens: Arc<ScriptedTokenProvider>,
}

/// Dashboard over in-memory fakes, signed in as the test user.
#[allow(dead_code)]
pub async fn test_dashboard(with_calendar: bool) -> TestHarness {
    let store = Arc::new(MemoryRunStore::new());
    let identity = Arc::new(FakeIdentity::new());
    identity
        .sign_in(TEST_EMAIL, TEST_PASSWORD)
        .await
        .expect("test account signs in");

    let calendar = Arc::new(FakeCalendar::new());
    let tokens = Arc::new(ScriptedTokenProvider::issuing());

    let mut dashboard = Dashboard::new(
        Config::test_default(),
        store.clone(),
        identity,
        test_catalog(),
    );
    if with_calendar {
        dashboard = dashboard.with_calendar(CalendarSync::new(
            calendar.clone(),
            tokens.clone(),
            "Marathon Training",
        ));
    }

    TestHarness {
        dashboard,
        store,
        calendar,
        tokens,
    }
}
