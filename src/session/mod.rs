//! Voice session management
//!
//! This module owns the conversational side of the call:
//! - `VoicePipeline`: the seam to the external speech pipeline
//!   (recognition → reasoning → synthesis) bound to the call's media room
//! - `VoiceSessionManager`: launches the pipeline as its own task so
//!   dialing is never blocked behind pipeline startup, and exposes the
//!   in-call capabilities (scripted lines, playout waits, history)
//! - `InterviewAgent`: the interview persona, its instructions and its
//!   end-call capability

mod agent;
mod history;
mod http;
mod manager;
mod options;
mod pipeline;

pub use agent::InterviewAgent;
pub use history::{ConversationTurn, TurnRole};
pub use http::HttpVoicePipeline;
pub use manager::VoiceSessionManager;
pub use options::{NoiseCancellation, RoomInputOptions, SessionOptions, TurnDetection};
pub use pipeline::{SessionEvent, VoicePipeline};
