// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar wire types (Google Calendar v3 shapes, trimmed to what we use).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Entry from the user's calendar list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarListEntry {
    pub id: String,
    #[serde(default)]
    pub summary: String,
}

/// Start or end of an event: all-day `date` or timed `dateTime`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// RFC 3339 timestamp, kept as text to preserve the original offset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
}

impl EventTime {
    pub fn all_day(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            date_time: None,
        }
    }

    /// Calendar date of this point: the all-day date, or the date part of
    /// `dateTime` as written (no timezone conversion).
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        if let Some(date) = self.date {
            return Some(date);
        }
        self.date_time
            .as_deref()
            .and_then(|dt| dt.split('T').next())
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }
}

/// Calendar event. `id` is assigned by the calendar service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start: EventTime,
    #[serde(default)]
    pub end: EventTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_id: Option<String>,
}

impl CalendarEvent {
    /// Date the event starts on.
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start.calendar_date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_date_from_all_day() {
        let json = r#"{"id": "e1", "summary": "Run", "start": {"date": "2026-03-02"}, "end": {"date": "2026-03-03"}}"#;
        let event: CalendarEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.start_date(), NaiveDate::from_ymd_opt(2026, 3, 2));
    }

    #[test]
    fn test_start_date_from_date_time() {
        let json = r#"{"id": "e1", "start": {"dateTime": "2026-03-02T07:30:00+01:00"}}"#;
        let event: CalendarEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.start_date(), NaiveDate::from_ymd_opt(2026, 3, 2));
        assert_eq!(event.summary, None);
    }

    #[test]
    fn test_serialization_omits_missing_fields() {
        let event = CalendarEvent {
            summary: Some("Easy Run: 8 km".to_string()),
            start: EventTime::all_day(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()),
            ..Default::default()
        };
        let value = serde_json::to_value(&event).unwrap();
        assert!(value.get("id").is_none());
        assert!(value.get("colorId").is_none());
        assert_eq!(value["start"]["date"], "2026-03-02");
        assert!(value["start"].get("dateTime").is_none());
    }
}
