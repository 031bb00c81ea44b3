use thiserror::Error;

/// Failure taxonomy for one call session.
///
/// Only `Configuration` is fatal. Every other variant is caught at the
/// component that produced it, logged with context, and the lifecycle still
/// reaches shutdown.
#[derive(Debug, Error)]
pub enum CallError {
    /// Missing or invalid job metadata or settings. Raised before any
    /// backend call is made; the process exits non-zero.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The telephony backend reported a terminal dial failure.
    #[error(transparent)]
    Dial(#[from] DialFailure),

    /// The recording backend could not start or track the capture. The call
    /// proceeds without a recording.
    #[error("recording failed: {0}")]
    Recording(String),

    /// Transcript serialization or database write failed. The record is
    /// logged and dropped; teardown continues.
    #[error("archive failed: {0}")]
    Archive(String),

    /// A best-effort teardown step failed (egress stop, API client close).
    #[error("teardown failed: {0}")]
    Teardown(String),
}

/// Structured dial failure surfaced by the telephony backend.
///
/// Carries the backend's machine-readable status plus the SIP status when
/// the backend reports one (no-answer, busy, invalid number).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dial failed ({status}): {message}")]
pub struct DialFailure {
    /// Backend status code, e.g. "not_found" or "unavailable".
    pub status: String,
    /// SIP status code, e.g. 486 for busy.
    pub sip_status_code: Option<u16>,
    /// SIP status text accompanying the code.
    pub sip_status: Option<String>,
    /// Human-readable message.
    pub message: String,
}

impl DialFailure {
    pub fn new(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            sip_status_code: None,
            sip_status: None,
            message: message.into(),
        }
    }

    pub fn with_sip_status(mut self, code: u16, text: impl Into<String>) -> Self {
        self.sip_status_code = Some(code);
        self.sip_status = Some(text.into());
        self
    }
}
