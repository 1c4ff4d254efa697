// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run record model for storage and display.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A logged run, as returned by the run store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    /// Opaque document ID assigned by the store
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Date the run took place
    pub date: NaiveDate,
    /// Distance in kilometers
    pub distance: f64,
    /// Duration in minutes (0 when unknown)
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub notes: String,
    /// Whether this run was created by checking off a plan session
    #[serde(default)]
    pub is_plan_run: bool,
    /// Date of the plan session this run fulfills
    #[serde(default)]
    pub plan_date: Option<NaiveDate>,
    /// When the record was written (RFC 3339)
    #[serde(default)]
    pub created_at: String,
}

/// Fields for a run that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewRun {
    pub date: NaiveDate,
    #[validate(range(min = 0.0, message = "distance must not be negative"))]
    pub distance: f64,
    #[validate(range(min = 0.0, message = "duration must not be negative"))]
    pub duration: f64,
    #[validate(length(max = 500, message = "notes are too long"))]
    pub notes: String,
    pub is_plan_run: bool,
    pub plan_date: Option<NaiveDate>,
}

impl NewRun {
    /// A manually logged run (not tied to the plan).
    pub fn manual(date: NaiveDate, distance: f64, duration: f64, notes: impl Into<String>) -> Self {
        Self {
            date,
            distance,
            duration,
            notes: notes.into(),
            is_plan_run: false,
            plan_date: None,
        }
    }
}
