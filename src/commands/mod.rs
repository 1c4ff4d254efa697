// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

pub mod calendar;
pub mod plan;
pub mod runs;
pub mod signup;
pub mod stats;

use std::sync::Arc;

use anyhow::{Context, Result};
use marathon_dashboard::config::Config;
use marathon_dashboard::db::FirestoreDb;
use marathon_dashboard::services::{
    CalendarSync, FirebaseAuth, GoogleCalendarClient, GoogleTokenProvider, PlanCatalog,
};
use marathon_dashboard::Dashboard;

/// Build the dashboard with production collaborators.
pub async fn connect(config: Config) -> Result<Dashboard> {
    let catalog = match &config.training_plan_path {
        Some(path) => PlanCatalog::load_from_file(path)
            .with_context(|| format!("Failed to load training plan {}", path.display()))?,
        None => PlanCatalog::embedded().context("Embedded training plan is invalid")?,
    };

    let store = FirestoreDb::new(&config.firebase_project_id).await?;
    let identity = FirebaseAuth::new(config.firebase_api_key.clone());

    let calendar = config.calendar.as_ref().map(|oauth| {
        tracing::info!(calendar = %config.calendar_name, "Calendar sync enabled");
        CalendarSync::new(
            Arc::new(GoogleCalendarClient::new()),
            Arc::new(GoogleTokenProvider::new(oauth)),
            config.calendar_name.clone(),
        )
    });

    let dashboard = Dashboard::new(config, Arc::new(store), Arc::new(identity), catalog);
    Ok(match calendar {
        Some(calendar) => dashboard.with_calendar(calendar),
        None => dashboard,
    })
}

/// Account credentials from the environment.
pub fn credentials(config: &Config) -> Result<(String, String)> {
    let email = config
        .email
        .clone()
        .context("MARATHON_EMAIL is not set")?;
    let password = config
        .password
        .clone()
        .context("MARATHON_PASSWORD is not set")?;
    Ok((email, password))
}

/// Sign in with the configured account.
pub async fn sign_in(dashboard: &Dashboard) -> Result<()> {
    let (email, password) = credentials(dashboard.config())?;
    let user = dashboard.identity().sign_in(&email, &password).await?;
    tracing::debug!(user_id = %user.uid, "Signed in");
    Ok(())
}
