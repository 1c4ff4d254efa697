// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard statistics derived from the run log.
//!
//! Computed on demand from the listed runs; nothing here is stored.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::run::RunRecord;
use crate::time_utils::week_start;

/// Number of weeks in the mileage chart.
const MILEAGE_WEEKS: usize = 8;

/// Distance logged in one Monday-anchored week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklyMileage {
    pub week_start: NaiveDate,
    /// Kilometers, rounded to 0.1
    pub km: f64,
}

/// Summary figures shown at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    // ─── Headline figures ────────────────────────────────────────
    /// Distance of runs dated within the last 7 days (km, 0.1 precision)
    pub weekly_distance: f64,
    /// Longest single run (km, 0.1 precision)
    pub longest_run: f64,
    /// Average pace over all runs, "m:ss" per km
    pub average_pace: String,
    pub goal_time: String,

    // ─── Totals ──────────────────────────────────────────────────
    pub total_runs: usize,
    pub total_distance: f64,
    /// Minutes
    pub total_duration: f64,

    // ─── Time series ─────────────────────────────────────────────
    /// Most recent weeks with logged runs, oldest first
    pub weekly_mileage: Vec<WeeklyMileage>,
}

impl DashboardStats {
    pub fn from_runs(runs: &[RunRecord], today: NaiveDate, goal_time: &str) -> Self {
        let week_ago = today - Duration::days(7);

        let weekly_distance: f64 = runs
            .iter()
            .filter(|r| r.date >= week_ago)
            .map(|r| r.distance)
            .sum();
        let longest_run = runs.iter().map(|r| r.distance).fold(0.0, f64::max);
        let total_distance: f64 = runs.iter().map(|r| r.distance).sum();
        let total_duration: f64 = runs.iter().map(|r| r.duration).sum();

        Self {
            weekly_distance: round_tenth(weekly_distance),
            longest_run: round_tenth(longest_run),
            average_pace: format_pace(total_distance, total_duration),
            goal_time: goal_time.to_string(),
            total_runs: runs.len(),
            total_distance: round_tenth(total_distance),
            total_duration,
            weekly_mileage: weekly_mileage(runs),
        }
    }
}

/// Pace in minutes per km as "m:ss"; "0:00" when no distance is logged.
pub fn format_pace(distance_km: f64, duration_min: f64) -> String {
    if distance_km <= 0.0 || !distance_km.is_finite() {
        return "0:00".to_string();
    }
    let total_secs = (duration_min / distance_km * 60.0).round().max(0.0) as u64;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Runs bucketed by week start, last `MILEAGE_WEEKS` weeks that have runs.
pub fn weekly_mileage(runs: &[RunRecord]) -> Vec<WeeklyMileage> {
    let mut weeks: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for run in runs {
        *weeks.entry(week_start(run.date)).or_insert(0.0) += run.distance;
    }

    let skip = weeks.len().saturating_sub(MILEAGE_WEEKS);
    weeks
        .into_iter()
        .skip(skip)
        .map(|(week_start, km)| WeeklyMileage {
            week_start,
            km: round_tenth(km),
        })
        .collect()
}

fn round_tenth(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}
