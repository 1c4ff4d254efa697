// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plan reconciliation: matching logged runs against the training plan.
//!
//! Everything here is pure. Status is derived from the run set handed in and
//! is recomputed on every refresh; nothing is cached or persisted.

use crate::models::plan::{PlannedSession, SessionStatus};
use crate::models::run::RunRecord;
use crate::services::catalog::PlanCatalog;
use crate::time_utils::week_start;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

/// Weeks shown before the current week in the default plan view.
const VISIBLE_WEEKS_BEFORE: i64 = 1;
/// Weeks shown after the current week in the default plan view.
const VISIBLE_WEEKS_AFTER: i64 = 3;

/// Plan dates that have at least one run linked to them.
pub fn completed_dates(runs: &[RunRecord]) -> HashSet<NaiveDate> {
    runs.iter().filter_map(|r| r.plan_date).collect()
}

/// Classify one session against the set of completed plan dates.
pub fn classify_session(
    session: &PlannedSession,
    completed: &HashSet<NaiveDate>,
    today: NaiveDate,
) -> SessionStatus {
    if completed.contains(&session.date) {
        SessionStatus::Completed
    } else if session.date < today {
        SessionStatus::Missed
    } else {
        SessionStatus::Upcoming
    }
}

/// Classify every session of `plan`, in plan order.
pub fn classify(
    plan: &[PlannedSession],
    runs: &[RunRecord],
    today: NaiveDate,
) -> Vec<(NaiveDate, SessionStatus)> {
    let completed = completed_dates(runs);
    plan.iter()
        .map(|s| (s.date, classify_session(s, &completed, today)))
        .collect()
}

/// Earliest session on or after `today` without a linked run.
pub fn next_session<'a>(
    plan: &'a [PlannedSession],
    runs: &[RunRecord],
    today: NaiveDate,
) -> Option<&'a PlannedSession> {
    let completed = completed_dates(runs);
    plan.iter()
        .find(|s| s.date >= today && !completed.contains(&s.date))
}

/// Percentage of past sessions that were completed; 100 before any are due.
pub fn consistency(completed: usize, missed: usize) -> u32 {
    let due = completed + missed;
    if due == 0 {
        return 100;
    }
    percentage(completed, due)
}

/// Percentage of the whole plan (past and future) completed so far.
pub fn overall_progress(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    percentage(completed, total)
}

fn percentage(part: usize, whole: usize) -> u32 {
    (100.0 * part as f64 / whole as f64).round() as u32
}

/// 1-based week number of `date` counted from the plan `epoch` (a Monday).
///
/// Defined for every date: weeks before the epoch are zero or negative.
pub fn week_number(date: NaiveDate, epoch: NaiveDate) -> i64 {
    let days = (week_start(date) - week_start(epoch)).num_days();
    days.div_euclid(7) + 1
}

/// Whole days from `today` until the race (negative once it has passed).
pub fn days_until(race_date: NaiveDate, today: NaiveDate) -> i64 {
    (race_date - today).num_days()
}

/// Aggregate completion counts and the two progress metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanProgress {
    pub completed: usize,
    pub missed: usize,
    pub upcoming: usize,
    pub total: usize,
    /// Completed share of sessions dated before today
    pub consistency: u32,
    /// Completed share of the entire plan
    pub overall_progress: u32,
}

impl PlanProgress {
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = SessionStatus>,
    {
        let (mut completed, mut missed, mut upcoming) = (0, 0, 0);
        for status in statuses {
            match status {
                SessionStatus::Completed => completed += 1,
                SessionStatus::Missed => missed += 1,
                SessionStatus::Upcoming => upcoming += 1,
            }
        }
        let total = completed + missed + upcoming;
        Self {
            completed,
            missed,
            upcoming,
            total,
            consistency: consistency(completed, missed),
            overall_progress: overall_progress(completed, total),
        }
    }
}

/// One session with its derived state.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport<'a> {
    pub session: &'a PlannedSession,
    pub status: SessionStatus,
    pub week: i64,
    pub is_today: bool,
}

/// Sessions of one plan week.
#[derive(Debug, Clone, Serialize)]
pub struct PlanWeek<'a> {
    pub week: i64,
    pub total_km: f64,
    pub sessions: Vec<SessionReport<'a>>,
}

/// Full reconciliation of a catalog against a run set on a given day.
#[derive(Debug, Clone, Serialize)]
pub struct Reconciliation<'a> {
    pub today: NaiveDate,
    pub current_week: i64,
    pub days_until_race: i64,
    pub progress: PlanProgress,
    pub next_session: Option<&'a PlannedSession>,
    pub sessions: Vec<SessionReport<'a>>,
}

impl<'a> Reconciliation<'a> {
    pub fn new(catalog: &'a PlanCatalog, runs: &[RunRecord], today: NaiveDate) -> Self {
        let completed = completed_dates(runs);
        let epoch = catalog.epoch();

        let sessions: Vec<SessionReport<'a>> = catalog
            .sessions()
            .iter()
            .map(|session| SessionReport {
                session,
                status: classify_session(session, &completed, today),
                week: week_number(session.date, epoch),
                is_today: session.date == today,
            })
            .collect();

        let progress = PlanProgress::from_statuses(sessions.iter().map(|r| r.status));

        Self {
            today,
            current_week: week_number(today, epoch),
            days_until_race: days_until(catalog.race_date(), today),
            progress,
            next_session: next_session(catalog.sessions(), runs, today),
            sessions,
        }
    }

    /// Status of the session planned on `date`, if there is one.
    pub fn status_of(&self, date: NaiveDate) -> Option<SessionStatus> {
        self.sessions
            .iter()
            .find(|r| r.session.date == date)
            .map(|r| r.status)
    }

    /// Sessions grouped by plan week, in week order.
    pub fn weeks(&self) -> Vec<PlanWeek<'a>> {
        let mut weeks: Vec<PlanWeek<'a>> = Vec::new();
        for report in &self.sessions {
            match weeks.last_mut() {
                Some(week) if week.week == report.week => {
                    week.total_km += report.session.distance;
                    week.sessions.push(report.clone());
                }
                _ => weeks.push(PlanWeek {
                    week: report.week,
                    total_km: report.session.distance,
                    sessions: vec![report.clone()],
                }),
            }
        }
        weeks
    }

    /// Weeks around the current one, or every week when `show_all` is set.
    pub fn visible_weeks(&self, show_all: bool) -> Vec<PlanWeek<'a>> {
        let lo = self.current_week - VISIBLE_WEEKS_BEFORE;
        let hi = self.current_week + VISIBLE_WEEKS_AFTER;
        self.weeks()
            .into_iter()
            .filter(|w| show_all || (lo..=hi).contains(&w.week))
            .collect()
    }
}
