// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use anyhow::Result;
use chrono::NaiveDate;
use marathon_dashboard::Dashboard;

/// Width of the longest bar in the mileage chart.
const BAR_WIDTH: f64 = 40.0;

pub async fn run(dashboard: &Dashboard, today: NaiveDate) -> Result<()> {
    let runs = dashboard.runs().await?;
    let stats = dashboard.stats(&runs, today);

    println!("This week    {:.1} km", stats.weekly_distance);
    println!("Longest run  {:.1} km", stats.longest_run);
    println!("Avg pace     {} /km", stats.average_pace);
    println!("Goal time    {}", stats.goal_time);
    println!(
        "Total        {} runs, {:.1} km",
        stats.total_runs, stats.total_distance
    );

    if stats.weekly_mileage.is_empty() {
        return Ok(());
    }

    println!("\nWeekly mileage");
    let max = stats
        .weekly_mileage
        .iter()
        .map(|w| w.km)
        .fold(0.0, f64::max);
    for week in &stats.weekly_mileage {
        let len = if max > 0.0 {
            (week.km / max * BAR_WIDTH).round() as usize
        } else {
            0
        };
        println!(
            "  {}  {:>5.1} km  {}",
            week.week_start.format("%d %b"),
            week.km,
            "█".repeat(len)
        );
    }
    Ok(())
}
