use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::StorageCredentials;
use crate::error::DialFailure;

/// Request to bridge an outbound SIP call into a media room.
#[derive(Debug, Clone, Serialize)]
pub struct SipParticipantRequest {
    pub room_name: String,
    pub sip_trunk_id: String,

    /// Destination number in E.164 form
    pub sip_call_to: String,

    /// Identity the callee joins the room under
    pub participant_identity: String,

    /// Block until the callee answers (or the dial terminally fails)
    pub wait_until_answered: bool,
}

/// A remote participant observed in the media room.
#[derive(Debug, Clone, Deserialize)]
pub struct Participant {
    pub identity: String,
}

/// Request for an audio-only composite capture of a room.
#[derive(Debug, Clone, Serialize)]
pub struct EgressRequest {
    pub room_name: String,
    pub audio_only: bool,

    /// Where the capture file is written
    pub filepath: String,

    /// Remote object storage for the file, when configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageCredentials>,
}

/// Egress stop outcome the recording controller must distinguish: an
/// already-finished capture is not a failure.
#[derive(Debug, Error)]
pub enum EgressError {
    /// The egress had already stopped or failed on the backend side.
    #[error("egress already finished")]
    AlreadyFinished,

    /// Anything else the backend reported.
    #[error("egress backend error: {0}")]
    Backend(String),
}

/// Outbound telephony and media-room operations.
///
/// One production implementation (`HttpApiClient`) talks to the room
/// service; tests drive the coordinator with mocks.
#[async_trait::async_trait]
pub trait TelephonyBackend: Send + Sync {
    /// Dial the callee into the room. Blocks until the call is answered or
    /// the backend reports a terminal failure (no-answer, busy, invalid
    /// number), surfaced as a structured `DialFailure`.
    async fn create_sip_participant(&self, req: &SipParticipantRequest)
        -> Result<(), DialFailure>;

    /// Wait until a participant with the given identity is present in the
    /// room.
    async fn wait_for_participant(&self, room: &str, identity: &str) -> Result<Participant>;

    /// Transmit one DTMF tone on the call's outbound signaling channel.
    async fn publish_tone(&self, room: &str, code: u8, symbol: char) -> Result<()>;

    /// Tear the room down, disconnecting every participant. Used by the
    /// agent's end-call capability to hang up.
    async fn delete_room(&self, room: &str) -> Result<()>;

    /// Release the underlying client. Called exactly once, at the very end
    /// of shutdown.
    async fn close(&self) -> Result<()>;
}

/// Composite capture of a media room.
#[async_trait::async_trait]
pub trait EgressBackend: Send + Sync {
    /// Start a capture and return its egress id.
    async fn start_composite_egress(&self, req: &EgressRequest) -> Result<String>;

    /// Stop a running capture. Implementations map "already stopped or
    /// failed" backend responses to `EgressError::AlreadyFinished`.
    async fn stop_egress(&self, egress_id: &str) -> Result<(), EgressError>;
}
