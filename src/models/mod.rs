// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod calendar;
pub mod plan;
pub mod run;
pub mod stats;

pub use calendar::{CalendarEvent, CalendarListEntry, EventTime};
pub use plan::{PlannedSession, SessionStatus, SessionType};
pub use run::{NewRun, RunRecord};
pub use stats::{DashboardStats, WeeklyMileage};
