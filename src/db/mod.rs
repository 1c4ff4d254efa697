//! Persistence layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

use crate::error::AppError;
use crate::models::run::{NewRun, RunRecord};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Collection names as constants.
pub mod collections {
    pub const RUNS: &str = "runs";
}

/// Store of run records, keyed by owning user.
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Store a new run and return it with its assigned ID.
    async fn create_run(&self, user_id: &str, run: &NewRun) -> Result<RunRecord, AppError>;

    /// All runs of a user, most recent date first.
    async fn list_runs(&self, user_id: &str) -> Result<Vec<RunRecord>, AppError>;

    /// Delete a single run by ID.
    async fn delete_run(&self, run_id: &str) -> Result<(), AppError>;

    /// Delete every run of a user linked to `plan_date`. Returns the count deleted.
    async fn delete_runs_by_plan_date(
        &self,
        user_id: &str,
        plan_date: NaiveDate,
    ) -> Result<usize, AppError>;
}
