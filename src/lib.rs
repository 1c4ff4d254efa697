// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Marathon Dashboard: track a marathon training plan
//!
//! This crate reconciles logged runs against a static training plan and
//! mirrors each plan session into a dedicated Google Calendar.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;

use chrono::NaiveDate;
use config::Config;
use db::RunStore;
use error::{AppError, Result};
use models::{DashboardStats, NewRun, RunRecord};
use services::calendar_sync::{CalendarSync, SyncOutcome, SyncSession};
use services::identity::{AuthUser, IdentityService};
use services::reconcile::{completed_dates, Reconciliation};
use services::{PlanCatalog, PlanTracker};
use std::sync::Arc;
use tokio::sync::Mutex;

/// What happened on the calendar after a plan toggle.
#[derive(Debug, Clone, PartialEq)]
pub enum CalendarOutcome {
    /// Calendar sync is not configured
    Disabled,
    Synced(SyncOutcome),
    /// The run store was updated but the calendar was not
    Failed(String),
}

/// Result of checking or unchecking a plan session.
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleOutcome {
    /// Run set freshly listed from the store after the write
    pub runs: Vec<RunRecord>,
    pub calendar: CalendarOutcome,
}

/// Shared application state: the collaborators plus the plan catalog.
pub struct Dashboard {
    config: Config,
    identity: Arc<dyn IdentityService>,
    tracker: PlanTracker,
    calendar: Option<CalendarSync>,
    // One calendar operation at a time
    sync_session: Mutex<SyncSession>,
}

impl Dashboard {
    pub fn new(
        config: Config,
        store: Arc<dyn RunStore>,
        identity: Arc<dyn IdentityService>,
        catalog: PlanCatalog,
    ) -> Self {
        Self {
            config,
            identity,
            tracker: PlanTracker::new(store, Arc::new(catalog)),
            calendar: None,
            sync_session: Mutex::new(SyncSession::new()),
        }
    }

    /// Enable calendar mirroring.
    pub fn with_calendar(mut self, calendar: CalendarSync) -> Self {
        self.calendar = Some(calendar);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &PlanCatalog {
        self.tracker.catalog()
    }

    pub fn identity(&self) -> &dyn IdentityService {
        self.identity.as_ref()
    }

    pub fn calendar_enabled(&self) -> bool {
        self.calendar.is_some()
    }

    /// The signed-in user, or `Auth` when nobody is signed in.
    pub fn require_user(&self) -> Result<AuthUser> {
        self.identity
            .current_user()
            .ok_or_else(|| AppError::Auth("Not signed in".to_string()))
    }

    pub async fn runs(&self) -> Result<Vec<RunRecord>> {
        let user = self.require_user()?;
        self.tracker.list_runs(&user.uid).await
    }

    pub fn reconcile<'a>(&'a self, runs: &[RunRecord], today: NaiveDate) -> Reconciliation<'a> {
        Reconciliation::new(self.catalog(), runs, today)
    }

    pub fn stats(&self, runs: &[RunRecord], today: NaiveDate) -> DashboardStats {
        DashboardStats::from_runs(runs, today, &self.config.goal_time)
    }

    /// Check off or uncheck the session on `date`, then mirror it to the calendar.
    ///
    /// A calendar failure does not undo the store write; it is reported in
    /// the outcome and healed by the next sync of that date.
    pub async fn set_session_done(
        &self,
        date: NaiveDate,
        done: bool,
        duration: Option<f64>,
    ) -> Result<ToggleOutcome> {
        let user = self.require_user()?;
        let runs = self
            .tracker
            .set_session_done(&user.uid, date, done, duration)
            .await?;

        let calendar = match self.sync_date(date, done).await {
            Ok(Some(outcome)) => CalendarOutcome::Synced(outcome),
            Ok(None) => CalendarOutcome::Disabled,
            Err(e) => {
                tracing::error!(error = %e, %date, "Calendar sync failed after plan update");
                CalendarOutcome::Failed(e.to_string())
            }
        };

        Ok(ToggleOutcome { runs, calendar })
    }

    pub async fn add_run(&self, run: NewRun) -> Result<Vec<RunRecord>> {
        let user = self.require_user()?;
        self.tracker.add_run(&user.uid, run).await
    }

    pub async fn delete_run(&self, run_id: &str) -> Result<Vec<RunRecord>> {
        let user = self.require_user()?;
        self.tracker.delete_run(&user.uid, run_id).await
    }

    fn calendar(&self) -> Result<&CalendarSync> {
        self.calendar
            .as_ref()
            .ok_or_else(|| AppError::Validation("Calendar sync is not enabled".to_string()))
    }

    async fn sync_date(&self, date: NaiveDate, completed: bool) -> Result<Option<SyncOutcome>> {
        let Some(calendar) = self.calendar.as_ref() else {
            return Ok(None);
        };
        let session = self.tracker.session(date)?;
        let mut sync_session = self.sync_session.lock().await;
        calendar
            .sync(&mut sync_session, session, completed)
            .await
            .map(Some)
    }

    /// Sync one session with its current completion state.
    pub async fn sync_session(&self, date: NaiveDate) -> Result<SyncOutcome> {
        let calendar = self.calendar()?;
        let session = self.tracker.session(date)?;
        let completed = completed_dates(&self.runs().await?).contains(&date);

        let mut sync_session = self.sync_session.lock().await;
        calendar.sync(&mut sync_session, session, completed).await
    }

    /// Sync every session of the plan, in date order. Stops at the first failure.
    pub async fn sync_all(&self) -> Result<Vec<SyncOutcome>> {
        let calendar = self.calendar()?;
        let completed = completed_dates(&self.runs().await?);

        let mut sync_session = self.sync_session.lock().await;
        let mut outcomes = Vec::with_capacity(self.catalog().len());
        for session in self.catalog().sessions() {
            let outcome = calendar
                .sync(&mut sync_session, session, completed.contains(&session.date))
                .await?;
            outcomes.push(outcome);
        }

        tracing::info!(count = outcomes.len(), "Synced full plan to calendar");
        Ok(outcomes)
    }

    /// Remove all dashboard events for `date`.
    pub async fn delete_calendar_events(&self, date: NaiveDate) -> Result<usize> {
        let calendar = self.calendar()?;
        let mut sync_session = self.sync_session.lock().await;
        calendar.delete_for_date(&mut sync_session, date).await
    }
}
