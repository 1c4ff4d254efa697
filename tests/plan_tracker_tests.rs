// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plan toggles and run logging through the dashboard facade.

use marathon_dashboard::error::AppError;
use marathon_dashboard::models::{NewRun, RunRecord, SessionStatus};
use marathon_dashboard::services::SyncAction;
use marathon_dashboard::CalendarOutcome;

mod common;
use common::{d, test_dashboard};

#[tokio::test]
async fn test_check_off_creates_one_linked_run() {
    let h = test_dashboard(false).await;

    let outcome = h
        .dashboard
        .set_session_done(d("2026-03-02"), true, Some(47.5))
        .await
        .unwrap();

    assert_eq!(outcome.calendar, CalendarOutcome::Disabled);
    assert_eq!(outcome.runs.len(), 1);
    let run = &outcome.runs[0];
    assert!(run.is_plan_run);
    assert_eq!(run.plan_date, Some(d("2026-03-02")));
    assert_eq!(run.date, d("2026-03-02"));
    assert_eq!(run.distance, 8.0);
    assert_eq!(run.duration, 47.5);
    assert_eq!(run.user_id, "user-1");
}

#[tokio::test]
async fn test_duration_defaults_to_zero() {
    let h = test_dashboard(false).await;
    let outcome = h
        .dashboard
        .set_session_done(d("2026-03-05"), true, None)
        .await
        .unwrap();
    assert_eq!(outcome.runs[0].duration, 0.0);
}

#[tokio::test]
async fn test_second_check_off_is_rejected() {
    let h = test_dashboard(false).await;
    h.dashboard
        .set_session_done(d("2026-03-02"), true, None)
        .await
        .unwrap();

    let err = h
        .dashboard
        .set_session_done(d("2026-03-02"), true, None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)), "got {:?}", err);
    assert_eq!(h.store.all().len(), 1);
}

#[tokio::test]
async fn test_toggle_round_trip_leaves_no_records() {
    let h = test_dashboard(false).await;
    let date = d("2026-03-07");

    h.dashboard.set_session_done(date, true, None).await.unwrap();
    let outcome = h.dashboard.set_session_done(date, false, None).await.unwrap();

    assert!(outcome.runs.is_empty());
    assert!(h.store.all().is_empty());
}

#[tokio::test]
async fn test_uncheck_removes_every_linked_run() {
    let h = test_dashboard(false).await;
    let date = d("2026-03-05");
    // Two linked records, as a racing second client could leave behind
    for id in ["a", "b"] {
        h.store.insert_raw(RunRecord {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            date,
            distance: 10.0,
            duration: 0.0,
            notes: String::new(),
            is_plan_run: true,
            plan_date: Some(date),
            created_at: String::new(),
        });
    }
    h.dashboard
        .add_run(NewRun::manual(date, 3.0, 20.0, "cooldown"))
        .await
        .unwrap();

    let outcome = h.dashboard.set_session_done(date, false, None).await.unwrap();

    assert_eq!(outcome.runs.len(), 1);
    assert!(!outcome.runs[0].is_plan_run);
}

#[tokio::test]
async fn test_uncheck_without_runs_is_noop() {
    let h = test_dashboard(false).await;
    let outcome = h
        .dashboard
        .set_session_done(d("2026-03-02"), false, None)
        .await
        .unwrap();
    assert!(outcome.runs.is_empty());
}

#[tokio::test]
async fn test_unknown_session_date_is_not_found() {
    let h = test_dashboard(false).await;
    let err = h
        .dashboard
        .set_session_done(d("2026-03-03"), true, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(h.store.all().is_empty());
}

#[tokio::test]
async fn test_reconciliation_scenario() {
    let h = test_dashboard(false).await;
    let outcome = h
        .dashboard
        .set_session_done(d("2026-03-02"), true, None)
        .await
        .unwrap();

    let report = h.dashboard.reconcile(&outcome.runs, d("2026-03-05"));
    assert_eq!(report.status_of(d("2026-03-02")), Some(SessionStatus::Completed));
    assert_eq!(report.status_of(d("2026-03-07")), Some(SessionStatus::Upcoming));
    assert_eq!(report.status_of(d("2026-02-28")), Some(SessionStatus::Missed));
    assert_eq!(report.status_of(d("2026-03-05")), Some(SessionStatus::Upcoming));
    assert_eq!(report.next_session.map(|s| s.date), Some(d("2026-03-05")));
    assert_eq!(report.progress.completed, 1);
    assert_eq!(report.progress.missed, 2);
    // 1 of 3 past sessions, 1 of 6 overall
    assert_eq!(report.progress.consistency, 33);
    assert_eq!(report.progress.overall_progress, 17);
}

#[tokio::test]
async fn test_manual_run_validation() {
    let h = test_dashboard(false).await;
    let date = d("2026-03-03");

    let err = h
        .dashboard
        .add_run(NewRun::manual(date, 0.0, 30.0, ""))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = h
        .dashboard
        .add_run(NewRun::manual(date, 5.0, 30.0, "x".repeat(600)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let runs = h
        .dashboard
        .add_run(NewRun::manual(date, 5.0, 30.0, "recovery"))
        .await
        .unwrap();
    assert_eq!(runs.len(), 1);
    assert!(!runs[0].is_plan_run);
    assert_eq!(runs[0].plan_date, None);

    let runs = h.dashboard.delete_run(&runs[0].id).await.unwrap();
    assert!(runs.is_empty());
}

#[tokio::test]
async fn test_non_finite_duration_is_rejected() {
    let h = test_dashboard(false).await;
    let date = d("2026-03-02");

    for duration in [f64::INFINITY, f64::NAN] {
        let err = h
            .dashboard
            .set_session_done(date, true, Some(duration))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "got {:?}", err);

        let err = h
            .dashboard
            .add_run(NewRun::manual(date, 5.0, duration, ""))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "got {:?}", err);
    }
    assert!(h.store.all().is_empty());
}

#[tokio::test]
async fn test_delete_unknown_run_is_not_found() {
    let h = test_dashboard(false).await;
    let runs = h
        .dashboard
        .add_run(NewRun::manual(d("2026-03-03"), 5.0, 30.0, ""))
        .await
        .unwrap();

    let err = h.dashboard.delete_run("does-not-exist").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {:?}", err);

    // Another user's record is not visible either
    h.store.insert_raw(RunRecord {
        id: "foreign".to_string(),
        user_id: "user-2".to_string(),
        date: d("2026-03-03"),
        distance: 5.0,
        duration: 30.0,
        notes: String::new(),
        is_plan_run: false,
        plan_date: None,
        created_at: String::new(),
    });
    let err = h.dashboard.delete_run("foreign").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    assert_eq!(h.store.all().len(), 2);
    assert_eq!(h.dashboard.runs().await.unwrap(), runs);
}

#[tokio::test]
async fn test_runs_listed_most_recent_first() {
    let h = test_dashboard(false).await;
    for date in ["2026-03-01", "2026-03-04", "2026-02-27"] {
        h.dashboard
            .add_run(NewRun::manual(d(date), 5.0, 30.0, ""))
            .await
            .unwrap();
    }
    let dates: Vec<_> = h
        .dashboard
        .runs()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.date)
        .collect();
    assert_eq!(dates, vec![d("2026-03-04"), d("2026-03-01"), d("2026-02-27")]);
}

#[tokio::test]
async fn test_signed_out_user_is_rejected() {
    let h = test_dashboard(false).await;
    h.dashboard.identity().sign_out().await.unwrap();

    let err = h.dashboard.runs().await.unwrap_err();
    assert!(err.is_auth_error());
}

// ═══════════════════════════════════════════════════════════════════════════
// CALENDAR MIRRORING
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_toggle_mirrors_to_calendar() {
    let h = test_dashboard(true).await;
    let date = d("2026-03-07");

    let done = h.dashboard.set_session_done(date, true, None).await.unwrap();
    let CalendarOutcome::Synced(created) = done.calendar else {
        panic!("expected calendar sync, got {:?}", done.calendar);
    };
    assert_eq!(created.action, SyncAction::Created);
    assert_eq!(created.event.summary.as_deref(), Some("✅ Long Run: 20 km"));

    let undone = h.dashboard.set_session_done(date, false, None).await.unwrap();
    let CalendarOutcome::Synced(updated) = undone.calendar else {
        panic!("expected calendar sync, got {:?}", undone.calendar);
    };
    assert_eq!(updated.action, SyncAction::Updated);
    assert_eq!(updated.event.id, created.event.id);
    assert_eq!(updated.event.summary.as_deref(), Some("🏃 Long Run: 20 km"));
}

#[tokio::test]
async fn test_calendar_failure_keeps_store_write() {
    let h = test_dashboard(true).await;
    h.calendar.reject_all_tokens();

    let outcome = h
        .dashboard
        .set_session_done(d("2026-03-02"), true, None)
        .await
        .unwrap();

    assert!(matches!(outcome.calendar, CalendarOutcome::Failed(_)));
    assert_eq!(outcome.runs.len(), 1);
    assert_eq!(h.store.all().len(), 1);
}

#[tokio::test]
async fn test_sync_all_reflects_completion() {
    let h = test_dashboard(true).await;
    h.dashboard
        .set_session_done(d("2026-03-02"), true, None)
        .await
        .unwrap();

    let outcomes = h.dashboard.sync_all().await.unwrap();
    assert_eq!(outcomes.len(), h.dashboard.catalog().len());

    let calendars = h.calendar.calendars();
    assert_eq!(calendars.len(), 1);
    let events = h.calendar.events(&calendars[0].id);
    assert_eq!(events.len(), h.dashboard.catalog().len());

    let completed: Vec<_> = events
        .iter()
        .filter(|e| e.summary.as_deref().is_some_and(|s| s.starts_with('✅')))
        .filter_map(|e| e.start_date())
        .collect();
    assert_eq!(completed, vec![d("2026-03-02")]);

    // Running it again changes nothing
    h.dashboard.sync_all().await.unwrap();
    assert_eq!(h.calendar.events(&calendars[0].id), events);
}

#[tokio::test]
async fn test_calendar_commands_require_sync_enabled() {
    let h = test_dashboard(false).await;
    let err = h.dashboard.sync_all().await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}
