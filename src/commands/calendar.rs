// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use anyhow::Result;
use chrono::NaiveDate;
use marathon_dashboard::services::{SyncAction, SyncOutcome};
use marathon_dashboard::Dashboard;

pub async fn sync(dashboard: &Dashboard, date: NaiveDate) -> Result<()> {
    let outcome = dashboard.sync_session(date).await?;
    print_outcome(date, &outcome);
    Ok(())
}

pub async fn sync_all(dashboard: &Dashboard) -> Result<()> {
    let outcomes = dashboard.sync_all().await?;

    let mut created = 0;
    let mut updated = 0;
    let mut duplicates = 0;
    for outcome in &outcomes {
        match outcome.action {
            SyncAction::Created => created += 1,
            SyncAction::Updated => updated += 1,
        }
        duplicates += outcome.duplicates_removed;
    }

    println!(
        "📅 {}: {} created, {} updated, {} duplicates removed",
        dashboard.config().calendar_name,
        created,
        updated,
        duplicates
    );
    Ok(())
}

pub async fn delete(dashboard: &Dashboard, date: NaiveDate) -> Result<()> {
    let removed = dashboard.delete_calendar_events(date).await?;
    println!("🗑️  Removed {} event(s) on {}", removed, date);
    Ok(())
}

fn print_outcome(date: NaiveDate, outcome: &SyncOutcome) {
    let verb = match outcome.action {
        SyncAction::Created => "Created",
        SyncAction::Updated => "Updated",
    };
    println!(
        "📅 {} event for {}: {}",
        verb,
        date,
        outcome.event.summary.as_deref().unwrap_or_default()
    );
    if outcome.duplicates_removed > 0 {
        println!("   Removed {} duplicate(s)", outcome.duplicates_removed);
    }
}
