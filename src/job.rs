use serde::Deserialize;

use crate::error::CallError;

/// Raw metadata payload dispatched with a call job.
///
/// `phone_number` is required; everything else is optional.
#[derive(Debug, Deserialize)]
pub struct JobMetadata {
    /// Callee phone number in E.164 form
    pub phone_number: Option<String>,

    /// Conference bridge PIN to key in after the callee joins
    pub meeting_pin: Option<String>,
}

/// Immutable dial parameters for one outbound call.
///
/// Created once from the job metadata at startup and never mutated; the
/// dialer and the transcript archiver both read from it.
#[derive(Debug, Clone)]
pub struct CallJob {
    /// Destination number handed to the telephony backend
    pub callee_number: String,

    /// Conference PIN, when the job carries one
    pub conference_pin: Option<String>,

    /// Identity the SIP participant joins the room under
    pub participant_identity: String,

    /// Media room the call is bridged into
    pub room_identifier: String,
}

impl CallJob {
    /// Parse job metadata JSON into dial parameters.
    ///
    /// A missing or empty `phone_number` is a configuration error: the
    /// worker must refuse the job before touching any backend. The SIP
    /// participant identity defaults to the callee number.
    pub fn from_metadata(metadata: &str, room_identifier: String) -> Result<Self, CallError> {
        let parsed: JobMetadata = serde_json::from_str(metadata)
            .map_err(|e| CallError::Configuration(format!("invalid job metadata JSON: {}", e)))?;

        let callee_number = parsed
            .phone_number
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                CallError::Configuration("job metadata is missing phone_number".to_string())
            })?;

        Ok(Self {
            participant_identity: callee_number.clone(),
            callee_number,
            conference_pin: parsed.meeting_pin.filter(|p| !p.is_empty()),
            room_identifier,
        })
    }
}
