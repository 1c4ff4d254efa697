// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Monday of the week containing `date` (Sunday belongs to the previous Monday).
///
/// Saturates at `NaiveDate::MIN` when that Monday is out of range.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as i64;
    date.checked_sub_signed(Duration::days(offset))
        .unwrap_or(NaiveDate::MIN)
}

/// Today's date in the local timezone, time of day discarded.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Midnight UTC at the start of `date`, as RFC3339.
pub fn start_of_day_rfc3339(date: NaiveDate) -> String {
    format_utc_rfc3339(date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
}
