// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use anyhow::Result;
use chrono::NaiveDate;
use marathon_dashboard::models::SessionStatus;
use marathon_dashboard::services::SyncAction;
use marathon_dashboard::{CalendarOutcome, Dashboard, ToggleOutcome};

pub async fn show(dashboard: &Dashboard, today: NaiveDate, all: bool) -> Result<()> {
    let runs = dashboard.runs().await?;
    let report = dashboard.reconcile(&runs, today);
    let progress = report.progress;

    println!(
        "🏁 Race day {} ({} days to go)",
        dashboard.catalog().race_date(),
        report.days_until_race.max(0)
    );
    println!(
        "   Progress {}% ({}/{} sessions), consistency {}%",
        progress.overall_progress, progress.completed, progress.total, progress.consistency
    );
    match report.next_session {
        Some(next) => println!(
            "   Next: {} {} {} km",
            next.date.format("%a %Y-%m-%d"),
            next.session_type,
            next.distance
        ),
        None => println!("   No sessions left"),
    }

    for week in report.visible_weeks(all) {
        let marker = if week.week == report.current_week { " ◀" } else { "" };
        println!("\nWeek {} ({:.1} km){}", week.week, week.total_km, marker);

        for entry in &week.sessions {
            let session = entry.session;
            println!(
                "  {} {}  {:<8} {:>6} km  {}{}",
                entry.status.glyph(),
                session.date.format("%a %Y-%m-%d"),
                session.session_type.as_str(),
                session.distance,
                session.notes,
                if entry.is_today { "  ← today" } else { "" }
            );
        }
    }

    if !all {
        println!("\n(use --all to show every week)");
    }
    Ok(())
}

pub async fn done(
    dashboard: &Dashboard,
    today: NaiveDate,
    date: NaiveDate,
    duration: Option<f64>,
) -> Result<()> {
    let outcome = dashboard.set_session_done(date, true, duration).await?;
    println!("✅ Marked {} done", date);
    print_outcome(dashboard, today, date, &outcome);
    Ok(())
}

pub async fn undo(dashboard: &Dashboard, today: NaiveDate, date: NaiveDate) -> Result<()> {
    let outcome = dashboard.set_session_done(date, false, None).await?;
    println!("↩️  Marked {} not done", date);
    print_outcome(dashboard, today, date, &outcome);
    Ok(())
}

fn print_outcome(
    dashboard: &Dashboard,
    today: NaiveDate,
    date: NaiveDate,
    outcome: &ToggleOutcome,
) {
    let report = dashboard.reconcile(&outcome.runs, today);
    if let Some(status) = report.status_of(date) {
        let label = match status {
            SessionStatus::Completed => "completed",
            SessionStatus::Missed => "missed",
            SessionStatus::Upcoming => "upcoming",
        };
        println!("   Session is now {}", label);
    }

    match &outcome.calendar {
        CalendarOutcome::Disabled => {}
        CalendarOutcome::Synced(sync) => {
            let verb = match sync.action {
                SyncAction::Created => "created",
                SyncAction::Updated => "updated",
            };
            println!("   📅 Calendar event {}", verb);
            if sync.duplicates_removed > 0 {
                println!("   📅 Removed {} duplicate event(s)", sync.duplicates_removed);
            }
        }
        CalendarOutcome::Failed(message) => {
            println!("   ⚠️  Calendar not updated: {}", message);
        }
    }
}
