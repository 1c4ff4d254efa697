// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper implementing the run store.
//!
//! Run documents live in a flat `runs` collection and carry the owning
//! `userId`, so every query filters on it. Field names are camelCase to stay
//! compatible with documents written by the web dashboard.

use crate::db::{collections, RunStore};
use crate::error::AppError;
use crate::models::run::{NewRun, RunRecord};
use crate::time_utils::format_utc_rfc3339;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

const SERVICE: &str = "Firestore";

/// Stored shape of a run document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunDocument {
    #[serde(
        default,
        alias = "_firestore_id",
        skip_serializing_if = "Option::is_none"
    )]
    id: Option<String>,
    user_id: String,
    date: NaiveDate,
    #[serde(deserialize_with = "number_or_string")]
    distance: f64,
    #[serde(default, deserialize_with = "number_or_string")]
    duration: f64,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    is_plan_run: bool,
    #[serde(default)]
    plan_date: Option<NaiveDate>,
    #[serde(default)]
    created_at: String,
}

impl RunDocument {
    fn into_record(self) -> Result<RunRecord, AppError> {
        let id = self
            .id
            .ok_or_else(|| AppError::transport(SERVICE, "run document without ID"))?;
        Ok(RunRecord {
            id,
            user_id: self.user_id,
            date: self.date,
            distance: self.distance,
            duration: self.duration,
            notes: self.notes,
            is_plan_run: self.is_plan_run,
            plan_date: self.plan_date,
            created_at: self.created_at,
        })
    }
}

/// Older web clients stored form input verbatim, so numbers may be strings.
fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) if s.trim().is_empty() => Ok(0.0),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            AppError::transport(SERVICE, format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::transport(
                SERVICE,
                format!("Failed to connect to Firestore Emulator: {}", e),
            )
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a disconnected client for testing.
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::transport(SERVICE, "Database not connected (offline mode)"))
    }

    /// Query all run documents of a user, optionally restricted to one plan date.
    async fn query_runs(
        &self,
        user_id: &str,
        plan_date: Option<NaiveDate>,
    ) -> Result<Vec<RunDocument>, AppError> {
        let plan_date = plan_date.map(|d| d.to_string());

        self.get_client()?
            .fluent()
            .select()
            .from(collections::RUNS)
            .filter(|q| {
                q.for_all([
                    q.field("userId").eq(user_id),
                    plan_date
                        .as_deref()
                        .and_then(|date| q.field("planDate").eq(date)),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::transport(SERVICE, e.to_string()))
    }

    /// Helper to batch delete documents using transactions.
    async fn batch_delete(&self, ids: &[String], collection: &str) -> Result<(), AppError> {
        let client = self.get_client()?;

        for chunk in ids.chunks(BATCH_SIZE) {
            let mut transaction = client.begin_transaction().await.map_err(|e| {
                AppError::transport(SERVICE, format!("Failed to begin transaction: {}", e))
            })?;

            for doc_id in chunk {
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::transport(
                            SERVICE,
                            format!(
                                "Failed to add deletion to transaction for {}: {}",
                                collection, e
                            ),
                        )
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::transport(SERVICE, format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}

#[async_trait]
impl RunStore for FirestoreDb {
    async fn create_run(&self, user_id: &str, run: &NewRun) -> Result<RunRecord, AppError> {
        let document = RunDocument {
            id: None,
            user_id: user_id.to_string(),
            date: run.date,
            distance: run.distance,
            duration: run.duration,
            notes: run.notes.clone(),
            is_plan_run: run.is_plan_run,
            plan_date: run.plan_date,
            created_at: format_utc_rfc3339(chrono::Utc::now()),
        };

        let stored: RunDocument = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::RUNS)
            .generate_document_id()
            .object(&document)
            .execute()
            .await
            .map_err(|e| AppError::transport(SERVICE, e.to_string()))?;

        let record = stored.into_record()?;
        tracing::info!(
            user_id,
            run_id = %record.id,
            date = %record.date,
            plan_date = ?record.plan_date,
            "Run stored"
        );
        Ok(record)
    }

    async fn list_runs(&self, user_id: &str) -> Result<Vec<RunRecord>, AppError> {
        let mut runs = self
            .query_runs(user_id, None)
            .await?
            .into_iter()
            .map(RunDocument::into_record)
            .collect::<Result<Vec<_>, _>>()?;

        // Sorted in memory to avoid requiring a composite index
        runs.sort_by(|a, b| b.date.cmp(&a.date));

        tracing::debug!(user_id, count = runs.len(), "Listed runs");
        Ok(runs)
    }

    async fn delete_run(&self, run_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::RUNS)
            .document_id(run_id)
            .execute()
            .await
            .map_err(|e| AppError::transport(SERVICE, e.to_string()))?;

        tracing::info!(run_id, "Run deleted");
        Ok(())
    }

    async fn delete_runs_by_plan_date(
        &self,
        user_id: &str,
        plan_date: NaiveDate,
    ) -> Result<usize, AppError> {
        let ids: Vec<String> = self
            .query_runs(user_id, Some(plan_date))
            .await?
            .into_iter()
            .filter_map(|doc| doc.id)
            .collect();

        self.batch_delete(&ids, collections::RUNS).await?;

        tracing::info!(
            user_id,
            plan_date = %plan_date,
            count = ids.len(),
            "Deleted plan runs"
        );
        Ok(ids.len())
    }
}
