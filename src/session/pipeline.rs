use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::agent::InterviewAgent;
use super::history::ConversationTurn;
use super::options::{RoomInputOptions, SessionOptions};

/// Out-of-band events the live pipeline surfaces to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The agent recognized an explicit, confirmed request to end the call.
    EndCallRequested,

    /// The media room closed underneath the session.
    Closed,
}

/// Conversational pipeline (speech recognition → reasoning → synthesis)
/// bound to the call's media room.
///
/// `start` resolves once the pipeline is attached and listening; it is
/// launched as its own task by the session manager so the coordinator can
/// dial concurrently. Events recognized in conversation (the end-call tool,
/// room closure) are delivered through the `events` sender passed to
/// `start`.
#[async_trait::async_trait]
pub trait VoicePipeline: Send + Sync {
    async fn start(
        &self,
        agent: Arc<InterviewAgent>,
        room: &str,
        options: &SessionOptions,
        input: &RoomInputOptions,
        events: mpsc::Sender<SessionEvent>,
    ) -> Result<()>;

    /// Speak one scripted line into the live conversation.
    async fn say(&self, text: &str) -> Result<()>;

    /// Resolve once all queued speech has finished playing.
    async fn wait_for_playout(&self) -> Result<()>;

    /// Ordered conversation turns so far.
    async fn history(&self) -> Result<Vec<ConversationTurn>>;

    /// Detach from the room and release pipeline resources.
    async fn close(&self) -> Result<()>;
}
