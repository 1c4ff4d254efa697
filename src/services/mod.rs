// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod calendar_sync;
pub mod catalog;
pub mod google_calendar;
pub mod google_oauth;
pub mod identity;
pub mod reconcile;
pub mod tracker;

pub use calendar_sync::{CalendarSync, RetryPolicy, SyncAction, SyncOutcome, SyncSession};
pub use catalog::{CatalogError, PlanCatalog};
pub use google_calendar::{CalendarApi, EventQuery, GoogleCalendarClient};
pub use google_oauth::{GoogleTokenProvider, TokenProvider};
pub use identity::{AuthUser, FirebaseAuth, IdentityService};
pub use reconcile::{PlanProgress, Reconciliation};
pub use tracker::PlanTracker;
