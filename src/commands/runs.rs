// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use anyhow::Result;
use chrono::NaiveDate;
use marathon_dashboard::models::{NewRun, RunRecord};
use marathon_dashboard::models::stats::format_pace;
use marathon_dashboard::Dashboard;

pub async fn list(dashboard: &Dashboard) -> Result<()> {
    let runs = dashboard.runs().await?;
    print_runs(&runs);
    Ok(())
}

pub async fn add(
    dashboard: &Dashboard,
    date: NaiveDate,
    distance: f64,
    duration: f64,
    notes: Option<String>,
) -> Result<()> {
    let run = NewRun::manual(date, distance, duration, notes.unwrap_or_default());
    let runs = dashboard.add_run(run).await?;
    println!("🏃 Logged {} km on {}\n", distance, date);
    print_runs(&runs);
    Ok(())
}

pub async fn delete(dashboard: &Dashboard, id: &str) -> Result<()> {
    let runs = dashboard.delete_run(id).await?;
    println!("🗑️  Deleted run {}\n", id);
    print_runs(&runs);
    Ok(())
}

fn print_runs(runs: &[RunRecord]) {
    if runs.is_empty() {
        println!("No runs logged yet");
        return;
    }

    for run in runs {
        let kind = if run.is_plan_run { "plan" } else { "    " };
        println!(
            "{}  {} {:>6.1} km {:>6} min  {}/km  {}  [{}]",
            run.date,
            kind,
            run.distance,
            run.duration,
            format_pace(run.distance, run.duration),
            run.notes,
            run.id
        );
    }
}
