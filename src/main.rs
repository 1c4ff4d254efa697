// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Marathon Dashboard CLI
//!
//! Tracks a marathon training plan: check off sessions, log runs and mirror
//! the plan into a Google Calendar.

mod commands;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use marathon_dashboard::config::Config;
use marathon_dashboard::time_utils::local_today;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "marathon")]
#[command(about = "Track your marathon training plan and sync it to Google Calendar")]
struct Cli {
    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the training plan, or check off a session
    Plan {
        /// Show every week instead of the weeks around today
        #[arg(long)]
        all: bool,

        #[command(subcommand)]
        action: Option<PlanAction>,
    },
    /// List, log or delete runs
    Runs {
        #[command(subcommand)]
        action: RunsAction,
    },
    /// Show dashboard statistics
    Stats,
    /// Manage training calendar events
    Calendar {
        #[command(subcommand)]
        action: CalendarAction,
    },
    /// Create an account for MARATHON_EMAIL / MARATHON_PASSWORD
    Signup,
}

#[derive(Subcommand)]
enum PlanAction {
    /// Mark the session on DATE done
    Done {
        date: NaiveDate,

        /// Actual duration in minutes
        #[arg(short, long)]
        duration: Option<f64>,
    },
    /// Mark the session on DATE not done
    Undo { date: NaiveDate },
}

#[derive(Subcommand)]
enum RunsAction {
    /// List logged runs, most recent first
    List,
    /// Log a run outside the plan
    Add {
        #[arg(long)]
        date: NaiveDate,

        /// Distance in km
        #[arg(long)]
        distance: f64,

        /// Duration in minutes
        #[arg(long)]
        duration: f64,

        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a run by ID
    Delete { id: String },
}

#[derive(Subcommand)]
enum CalendarAction {
    /// Sync the session on DATE
    Sync { date: NaiveDate },
    /// Sync every session of the plan
    SyncAll,
    /// Delete all dashboard events on DATE
    Delete { date: NaiveDate },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let today = cli.today.unwrap_or_else(local_today);

    let config = Config::from_env()?;
    let dashboard = commands::connect(config).await?;

    if let Commands::Signup = cli.command {
        return commands::signup::run(&dashboard).await;
    }
    commands::sign_in(&dashboard).await?;

    match cli.command {
        Commands::Plan { all, action } => match action {
            None => commands::plan::show(&dashboard, today, all).await,
            Some(PlanAction::Done { date, duration }) => {
                commands::plan::done(&dashboard, today, date, duration).await
            }
            Some(PlanAction::Undo { date }) => commands::plan::undo(&dashboard, today, date).await,
        },
        Commands::Runs { action } => match action {
            RunsAction::List => commands::runs::list(&dashboard).await,
            RunsAction::Add {
                date,
                distance,
                duration,
                notes,
            } => commands::runs::add(&dashboard, date, distance, duration, notes).await,
            RunsAction::Delete { id } => commands::runs::delete(&dashboard, &id).await,
        },
        Commands::Stats => commands::stats::run(&dashboard, today).await,
        Commands::Calendar { action } => match action {
            CalendarAction::Sync { date } => commands::calendar::sync(&dashboard, date).await,
            CalendarAction::SyncAll => commands::calendar::sync_all(&dashboard).await,
            CalendarAction::Delete { date } => commands::calendar::delete(&dashboard, date).await,
        },
        Commands::Signup => Ok(()),
    }
}

/// Initialize logging on stderr; `LOG_FORMAT=json` selects structured JSON.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("marathon_dashboard=debug,info"));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
