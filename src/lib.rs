pub mod archive;
pub mod config;
pub mod dtmf;
pub mod error;
pub mod job;
pub mod lifecycle;
pub mod recording;
pub mod session;
pub mod telephony;

pub use archive::{
    PostgresTranscriptStore, TranscriptArchiver, TranscriptPayload, TranscriptRecord,
    TranscriptStore,
};
pub use config::Config;
pub use dtmf::{DtmfSignaler, DtmfTone, DEFAULT_PIN};
pub use error::{CallError, DialFailure};
pub use job::{CallJob, JobMetadata};
pub use lifecycle::{CallSession, CallState, LifecycleCoordinator, TerminationHooks};
pub use recording::RecordingController;
pub use session::{
    ConversationTurn, HttpVoicePipeline, InterviewAgent, NoiseCancellation, RoomInputOptions,
    SessionEvent, SessionOptions, TurnDetection, TurnRole, VoicePipeline, VoiceSessionManager,
};
pub use telephony::{
    EgressBackend, EgressError, EgressRequest, HttpApiClient, Participant, SipParticipantRequest,
    TelephonyBackend,
};
