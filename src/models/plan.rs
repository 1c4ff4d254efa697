// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training plan session model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workout type of a planned session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionType {
    Easy,
    Long,
    Tempo,
    Interval,
    #[serde(alias = "RACE")]
    Race,
}

impl SessionType {
    pub const ALL: [SessionType; 5] = [
        SessionType::Easy,
        SessionType::Long,
        SessionType::Tempo,
        SessionType::Interval,
        SessionType::Race,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Easy => "Easy",
            SessionType::Long => "Long",
            SessionType::Tempo => "Tempo",
            SessionType::Interval => "Interval",
            SessionType::Race => "Race",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the static training catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedSession {
    /// Calendar date, unique within the catalog
    pub date: NaiveDate,
    /// Workout type
    #[serde(rename = "type")]
    pub session_type: SessionType,
    /// Planned distance in kilometers
    pub distance: f64,
    /// Free-text workout description
    #[serde(default)]
    pub notes: String,
}

/// Derived completion state of a planned session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    Completed,
    Missed,
    Upcoming,
}

impl SessionStatus {
    /// Status glyph used in list output.
    pub fn glyph(&self) -> &'static str {
        match self {
            SessionStatus::Completed => "✓",
            SessionStatus::Missed => "✗",
            SessionStatus::Upcoming => "○",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_type_accepts_legacy_race_spelling() {
        let t: SessionType = serde_json::from_str("\"RACE\"").unwrap();
        assert_eq!(t, SessionType::Race);
        let t: SessionType = serde_json::from_str("\"Race\"").unwrap();
        assert_eq!(t, SessionType::Race);
    }

    #[test]
    fn test_planned_session_uses_type_field() {
        let json = r#"{"date": "2026-03-02", "type": "Easy", "distance": 8, "notes": "Rustig"}"#;
        let session: PlannedSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.session_type, SessionType::Easy);
        assert_eq!(session.distance, 8.0);
        assert_eq!(session.date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
    }
}
