//! Transcript archival
//!
//! On shutdown the full conversation history plus call metadata is
//! serialized and persisted as exactly one row per call in the
//! `interviews` table. A call whose upstream steps partially failed still
//! produces a row: missing fields become nulls and an unavailable history
//! becomes a placeholder payload, never a dropped record.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio_postgres::NoTls;
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::error::CallError;
use crate::job::CallJob;
use crate::lifecycle::CallSession;
use crate::session::ConversationTurn;

/// Portable structured form of the conversation written to the store.
///
/// When history retrieval itself failed, the record carries an error
/// placeholder in place of the turns.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TranscriptPayload {
    Turns(Vec<ConversationTurn>),
    Unavailable { error: String },
}

/// One durable row per call, derived from the finished `CallSession`.
/// Written once, never mutated afterward.
#[derive(Debug, Clone)]
pub struct TranscriptRecord {
    pub room_name: String,
    pub participant_identity: Option<String>,
    pub recording_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub transcript_json: String,
    pub metadata_json: String,
}

impl TranscriptRecord {
    pub fn build(job: &CallJob, call: &CallSession, transcript: &TranscriptPayload) -> Self {
        let transcript_json = serde_json::to_string(transcript).unwrap_or_else(|e| {
            serde_json::json!({ "error": format!("transcript serialization failed: {}", e) })
                .to_string()
        });

        let metadata_json = serde_json::json!({
            "callee_number": job.callee_number,
            "conference_pin_supplied": job.conference_pin.is_some(),
        })
        .to_string();

        Self {
            room_name: call.room_identifier.clone(),
            participant_identity: call.participant_identity.clone(),
            recording_id: call.recording_id.clone(),
            started_at: call.call_started_at,
            ended_at: call.call_ended_at,
            transcript_json,
            metadata_json,
        }
    }
}

/// Durable storage seam for interview records.
#[async_trait::async_trait]
pub trait TranscriptStore: Send + Sync {
    async fn insert(&self, record: &TranscriptRecord) -> Result<()>;
}

const ENSURE_TABLE: &str = "CREATE TABLE IF NOT EXISTS interviews (
    room_name TEXT NOT NULL,
    participant_identity TEXT,
    recording_id TEXT,
    started_at TIMESTAMPTZ,
    ended_at TIMESTAMPTZ,
    transcript TEXT NOT NULL,
    metadata TEXT NOT NULL
)";

const INSERT_INTERVIEW: &str = "INSERT INTO interviews
    (room_name, participant_identity, recording_id, started_at, ended_at, transcript, metadata)
    VALUES ($1, $2, $3, $4, $5, $6, $7)";

/// Postgres-backed store. Each insert opens a scoped connection and
/// releases it on every exit path (success, insert failure, or
/// connection failure).
pub struct PostgresTranscriptStore {
    config: DatabaseConfig,
}

impl PostgresTranscriptStore {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    fn connection_params(&self) -> String {
        format!(
            "host={} port={} user={} password={} dbname={}",
            self.config.host,
            self.config.port,
            self.config.user,
            self.config.password,
            self.config.dbname
        )
    }
}

#[async_trait::async_trait]
impl TranscriptStore for PostgresTranscriptStore {
    async fn insert(&self, record: &TranscriptRecord) -> Result<()> {
        let (client, connection) = tokio_postgres::connect(&self.connection_params(), NoTls)
            .await
            .context("Failed to connect to database")?;

        // The connection future must be driven for the client to make
        // progress; it resolves once the client drops.
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!("Database connection error: {}", e);
            }
        });

        let result = async {
            client
                .execute(ENSURE_TABLE, &[])
                .await
                .context("Failed to ensure interviews table")?;

            client
                .execute(
                    INSERT_INTERVIEW,
                    &[
                        &record.room_name,
                        &record.participant_identity,
                        &record.recording_id,
                        &record.started_at,
                        &record.ended_at,
                        &record.transcript_json,
                        &record.metadata_json,
                    ],
                )
                .await
                .context("Failed to insert interview record")?;

            Ok(())
        }
        .await;

        drop(client);
        let _ = driver.await;

        result
    }
}

/// Writes exactly one `TranscriptRecord` per completed call.
pub struct TranscriptArchiver {
    store: Arc<dyn TranscriptStore>,
}

impl TranscriptArchiver {
    pub fn new(store: Arc<dyn TranscriptStore>) -> Self {
        Self { store }
    }

    /// Persist the call's transcript. Failures surface as `Archive` errors
    /// for the caller to log; they are never retried and never block the
    /// rest of teardown.
    pub async fn archive(
        &self,
        job: &CallJob,
        call: &CallSession,
        transcript: TranscriptPayload,
    ) -> Result<(), CallError> {
        let record = TranscriptRecord::build(job, call, &transcript);

        self.store
            .insert(&record)
            .await
            .map_err(|e| CallError::Archive(format!("{:#}", e)))?;

        info!(room = %record.room_name, "Interview transcript archived");
        Ok(())
    }
}
