// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Static training plan catalog loading.

use crate::models::plan::PlannedSession;
use crate::time_utils::week_start;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Plan shipped with the binary, used when no path is configured.
const EMBEDDED_PLAN: &str = include_str!("../../data/training_plan.json");

/// On-disk catalog format.
#[derive(Deserialize)]
struct CatalogFile {
    version: String,
    race_date: NaiveDate,
    sessions: Vec<PlannedSession>,
}

/// Immutable, date-ordered list of planned sessions plus the race date.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    version: String,
    race_date: NaiveDate,
    epoch: NaiveDate,
    sessions: Vec<PlannedSession>,
}

impl PlanCatalog {
    /// Load the catalog from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| CatalogError::Io(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load the catalog compiled into the binary.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::load_from_json(EMBEDDED_PLAN)
    }

    /// Load the catalog from a JSON string.
    pub fn load_from_json(json_data: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_json::from_str(json_data).map_err(|e| CatalogError::Parse(e.to_string()))?;
        let catalog = Self::new(file.version, file.race_date, file.sessions)?;

        tracing::info!(
            version = %catalog.version,
            sessions = catalog.sessions.len(),
            race_date = %catalog.race_date,
            "Loaded training plan"
        );
        Ok(catalog)
    }

    /// Build a catalog, ordering sessions by date.
    ///
    /// Rejects an empty plan, duplicate dates and negative distances.
    pub fn new(
        version: impl Into<String>,
        race_date: NaiveDate,
        mut sessions: Vec<PlannedSession>,
    ) -> Result<Self, CatalogError> {
        sessions.sort_by_key(|s| s.date);

        let first = sessions
            .first()
            .ok_or_else(|| CatalogError::Invalid("plan has no sessions".to_string()))?;
        let epoch = week_start(first.date);

        let mut seen = HashSet::new();
        for session in &sessions {
            if !seen.insert(session.date) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate session date {}",
                    session.date
                )));
            }
            if session.distance.is_nan() || session.distance < 0.0 {
                return Err(CatalogError::Invalid(format!(
                    "session {} has invalid distance {}",
                    session.date, session.distance
                )));
            }
        }

        Ok(Self {
            version: version.into(),
            race_date,
            epoch,
            sessions,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn race_date(&self) -> NaiveDate {
        self.race_date
    }

    /// First Monday of the plan; week 1 starts here.
    pub fn epoch(&self) -> NaiveDate {
        self.epoch
    }

    /// Sessions in ascending date order.
    pub fn sessions(&self) -> &[PlannedSession] {
        &self.sessions
    }

    /// Look up the session planned for `date`.
    pub fn find(&self, date: NaiveDate) -> Option<&PlannedSession> {
        self.sessions
            .binary_search_by_key(&date, |s| s.date)
            .ok()
            .map(|i| &self.sessions[i])
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Errors from catalog loading.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read plan file: {0}")]
    Io(String),

    #[error("Failed to parse plan: {0}")]
    Parse(String),

    #[error("Invalid plan: {0}")]
    Invalid(String),
}
