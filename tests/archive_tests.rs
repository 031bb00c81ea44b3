// Archiver tests: one row per call, placeholder payloads, and failure
// surfacing.

mod common;

use anyhow::Result;
use common::MockTranscriptStore;
use interview_caller::{
    CallError, CallJob, CallSession, ConversationTurn, TranscriptArchiver, TranscriptPayload,
    TurnRole,
};
use std::sync::Arc;

fn job() -> CallJob {
    CallJob::from_metadata(
        r#"{"phone_number": "+15551234567", "meeting_pin": "9876#"}"#,
        "call-test".to_string(),
    )
    .unwrap()
}

fn finished_call() -> CallSession {
    let mut call = CallSession::new("call-test");
    call.mark_joined(
        "+15551234567".to_string(),
        "2026-08-07T10:00:00Z".parse().unwrap(),
    );
    call.recording_id = Some("EG_test".to_string());
    call.finalize("2026-08-07T10:15:00Z".parse().unwrap());
    call
}

#[tokio::test]
async fn test_archive_writes_exactly_one_record() -> Result<()> {
    let store = Arc::new(MockTranscriptStore::new());
    let archiver = TranscriptArchiver::new(store.clone());

    let turns = vec![ConversationTurn {
        role: TurnRole::Agent,
        text: "Can you introduce yourself?".to_string(),
        timestamp: "2026-08-07T10:00:10Z".parse().unwrap(),
    }];
    archiver
        .archive(&job(), &finished_call(), TranscriptPayload::Turns(turns))
        .await?;

    let records = store.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].room_name, "call-test");
    assert_eq!(records[0].recording_id.as_deref(), Some("EG_test"));
    assert!(records[0].transcript_json.contains("introduce yourself"));
    Ok(())
}

#[tokio::test]
async fn test_archive_with_placeholder_payload_still_writes_row() -> Result<()> {
    let store = Arc::new(MockTranscriptStore::new());
    let archiver = TranscriptArchiver::new(store.clone());

    archiver
        .archive(
            &job(),
            &finished_call(),
            TranscriptPayload::Unavailable {
                error: "pipeline gone".to_string(),
            },
        )
        .await?;

    let records = store.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].transcript_json.contains("pipeline gone"));
    assert!(records[0].ended_at.is_some());
    Ok(())
}

#[tokio::test]
async fn test_insert_failure_surfaces_as_archive_error() {
    let store = Arc::new(MockTranscriptStore::failing());
    let archiver = TranscriptArchiver::new(store.clone());

    let err = archiver
        .archive(&job(), &finished_call(), TranscriptPayload::Turns(vec![]))
        .await
        .unwrap_err();

    assert!(matches!(err, CallError::Archive(_)));
    assert!(store.records.lock().unwrap().is_empty());
}
