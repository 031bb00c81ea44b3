use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use super::agent::InterviewAgent;
use super::history::ConversationTurn;
use super::options::{RoomInputOptions, SessionOptions};
use super::pipeline::{SessionEvent, VoicePipeline};

/// Owns the conversational pipeline for one call.
///
/// Startup runs as an independently-progressing task so the coordinator
/// can issue the dial request immediately; the returned handle is awaited
/// at the participant-join checkpoint, the first point the session must
/// actually be interactive.
pub struct VoiceSessionManager {
    pipeline: Arc<dyn VoicePipeline>,
    options: SessionOptions,
}

impl VoiceSessionManager {
    pub fn new(pipeline: Arc<dyn VoicePipeline>, options: SessionOptions) -> Self {
        Self { pipeline, options }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Launch pipeline startup in its own task. Starting before dialing
    /// guarantees the agent misses nothing the callee says after pickup.
    pub fn spawn_start(
        &self,
        agent: Arc<InterviewAgent>,
        room: &str,
        input: RoomInputOptions,
        events: mpsc::Sender<SessionEvent>,
    ) -> JoinHandle<Result<()>> {
        let pipeline = Arc::clone(&self.pipeline);
        let options = self.options.clone();
        let room = room.to_string();

        info!(%room, "Starting voice session");

        tokio::spawn(async move {
            pipeline
                .start(agent, &room, &options, &input, events)
                .await
        })
    }

    /// Inject one scripted spoken line into the live conversation.
    pub async fn say(&self, text: &str) -> Result<()> {
        self.pipeline.say(text).await
    }

    /// Wait for all queued speech to finish playing.
    pub async fn wait_for_playout(&self) -> Result<()> {
        self.pipeline.wait_for_playout().await
    }

    /// Ordered conversation history so far.
    pub async fn history(&self) -> Result<Vec<ConversationTurn>> {
        self.pipeline.history().await
    }

    /// Detach the pipeline from the room.
    pub async fn close(&self) -> Result<()> {
        self.pipeline.close().await
    }
}
