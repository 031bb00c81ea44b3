use anyhow::Result;
use clap::Parser;
use interview_caller::{
    CallJob, Config, HttpApiClient, HttpVoicePipeline, LifecycleCoordinator,
    PostgresTranscriptStore,
};
use std::sync::Arc;
use tracing::info;

/// Outbound voice-interview call worker: dials one callee into a media
/// room, joins the conference bridge over DTMF, holds the interview, and
/// archives the transcript.
#[derive(Debug, Parser)]
#[command(name = "interview-caller")]
struct Args {
    /// Media room to bridge the call into (generated when omitted)
    #[arg(long)]
    room: Option<String>,

    /// Job metadata JSON, e.g. '{"phone_number": "+15551234567", "meeting_pin": "9876#"}'
    #[arg(long)]
    metadata: String,

    /// Configuration file base name
    #[arg(long, default_value = "config/interview-caller")]
    config: String,
}

// The whole call runs on one cooperative thread; session startup and
// dialing progress as independent tasks on it.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = Config::load(&args.config)?;

    let room = args
        .room
        .unwrap_or_else(|| format!("call-{}", uuid::Uuid::new_v4()));

    // Configuration problems (missing phone_number, bad metadata) abort
    // here, before any backend is touched, with a non-zero exit.
    let job = CallJob::from_metadata(&args.metadata, room)?;

    info!(room = %job.room_identifier, callee = %job.callee_number, "Job accepted");

    let api = Arc::new(HttpApiClient::new(&config.telephony)?);
    let pipeline = Arc::new(HttpVoicePipeline::new(&config.pipeline)?);
    let store = Arc::new(PostgresTranscriptStore::new(config.database.clone()));

    let coordinator =
        LifecycleCoordinator::new(&config, api.clone(), api, pipeline, store);

    // Dial, recording and archive failures are handled inside the
    // lifecycle; the worker still exits cleanly.
    let call = coordinator.run(job).await;

    info!(
        room = %call.room_identifier,
        recording = ?call.recording_id,
        turns = call.conversation_history.len(),
        "Worker finished"
    );

    Ok(())
}
