// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plan tracker: the write side of plan reconciliation.
//!
//! Handles:
//! 1. Checking off a plan session (creates one linked run)
//! 2. Unchecking a session (deletes every run linked to that date)
//! 3. Manual run logging and deletion
//!
//! Every mutation is followed by a fresh listing from the store, which is
//! what callers get back.

use crate::db::RunStore;
use crate::error::{AppError, Result};
use crate::models::plan::PlannedSession;
use crate::models::run::{NewRun, RunRecord};
use crate::services::catalog::PlanCatalog;
use chrono::NaiveDate;
use std::sync::Arc;
use validator::Validate;

pub struct PlanTracker {
    store: Arc<dyn RunStore>,
    catalog: Arc<PlanCatalog>,
}

impl PlanTracker {
    pub fn new(store: Arc<dyn RunStore>, catalog: Arc<PlanCatalog>) -> Self {
        Self { store, catalog }
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    /// Session planned on `date`, or `NotFound`.
    pub fn session(&self, date: NaiveDate) -> Result<&PlannedSession> {
        self.catalog
            .find(date)
            .ok_or_else(|| AppError::NotFound(format!("No plan session on {}", date)))
    }

    pub async fn list_runs(&self, user_id: &str) -> Result<Vec<RunRecord>> {
        self.store.list_runs(user_id).await
    }

    /// Mark the session on `date` done or not done.
    ///
    /// Done creates exactly one run linked to the session, with `duration`
    /// defaulting to 0. A second check-off of the same date is rejected.
    /// Not done deletes all linked runs; with none present it is a no-op.
    pub async fn set_session_done(
        &self,
        user_id: &str,
        date: NaiveDate,
        done: bool,
        duration: Option<f64>,
    ) -> Result<Vec<RunRecord>> {
        let session = self.session(date)?;

        if done {
            let existing = self.store.list_runs(user_id).await?;
            if existing.iter().any(|r| r.plan_date == Some(date)) {
                return Err(AppError::Validation(format!(
                    "Session on {} is already marked done",
                    date
                )));
            }

            let duration = duration.unwrap_or(0.0);
            if !duration.is_finite() {
                return Err(AppError::Validation("duration must be a finite number".to_string()));
            }

            let run = NewRun {
                date,
                distance: session.distance,
                duration,
                notes: session.notes.clone(),
                is_plan_run: true,
                plan_date: Some(date),
            };
            validate(&run)?;

            let record = self.store.create_run(user_id, &run).await?;
            tracing::info!(user_id, %date, run_id = %record.id, "Session marked done");
        } else {
            let deleted = self.store.delete_runs_by_plan_date(user_id, date).await?;
            tracing::info!(user_id, %date, deleted, "Session marked not done");
        }

        self.store.list_runs(user_id).await
    }

    /// Log a run that is not tied to the plan.
    pub async fn add_run(&self, user_id: &str, run: NewRun) -> Result<Vec<RunRecord>> {
        validate(&run)?;
        if !run.distance.is_finite() || run.distance <= 0.0 {
            return Err(AppError::Validation("distance must be positive".to_string()));
        }
        if !run.duration.is_finite() || run.duration <= 0.0 {
            return Err(AppError::Validation("duration must be positive".to_string()));
        }

        let record = self.store.create_run(user_id, &run).await?;
        tracing::info!(user_id, run_id = %record.id, date = %record.date, "Run logged");

        self.store.list_runs(user_id).await
    }

    /// Delete one of the user's runs; ids the user does not own are `NotFound`.
    pub async fn delete_run(&self, user_id: &str, run_id: &str) -> Result<Vec<RunRecord>> {
        let runs = self.store.list_runs(user_id).await?;
        if !runs.iter().any(|r| r.id == run_id) {
            return Err(AppError::NotFound(format!("Run not found: {}", run_id)));
        }

        self.store.delete_run(run_id).await?;
        tracing::info!(user_id, run_id, "Run deleted");

        self.store.list_runs(user_id).await
    }
}

fn validate(run: &NewRun) -> Result<()> {
    run.validate()
        .map_err(|e| AppError::Validation(e.to_string().replace('\n', "; ")))
}
