use chrono::{DateTime, Utc};

use crate::session::ConversationTurn;

/// Mutable state for one call, owned exclusively by the lifecycle
/// coordinator and threaded through the termination hooks at shutdown.
#[derive(Debug, Clone)]
pub struct CallSession {
    /// Media room the call lives in
    pub room_identifier: String,

    /// Identity of the joined callee. Written exactly once, by the
    /// join-wait step; read-only afterward.
    pub participant_identity: Option<String>,

    /// Egress id when a recording was successfully requested
    pub recording_id: Option<String>,

    /// True start of the call, observed at participant join
    pub call_started_at: Option<DateTime<Utc>>,

    /// Stamped exactly once, at shutdown
    pub call_ended_at: Option<DateTime<Utc>>,

    /// Conversation turns collected from the pipeline at shutdown
    pub conversation_history: Vec<ConversationTurn>,
}

impl CallSession {
    pub fn new(room_identifier: &str) -> Self {
        Self {
            room_identifier: room_identifier.to_string(),
            participant_identity: None,
            recording_id: None,
            call_started_at: None,
            call_ended_at: None,
            conversation_history: Vec::new(),
        }
    }

    /// Record the joined callee and the true call start. The join-wait
    /// step is the only writer; repeated calls keep the first observation.
    pub fn mark_joined(&mut self, identity: String, at: DateTime<Utc>) {
        if self.participant_identity.is_none() {
            self.participant_identity = Some(identity);
            self.call_started_at = Some(at);
        }
    }

    /// Stamp the call end, once. Later calls keep the first stamp.
    pub fn finalize(&mut self, at: DateTime<Utc>) {
        if self.call_ended_at.is_none() {
            self.call_ended_at = Some(at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_joined_keeps_first_observation() {
        let mut call = CallSession::new("call-test");
        let first: DateTime<Utc> = "2026-08-07T10:00:00Z".parse().unwrap();
        let second: DateTime<Utc> = "2026-08-07T10:05:00Z".parse().unwrap();

        call.mark_joined("+15551234567".to_string(), first);
        call.mark_joined("someone-else".to_string(), second);

        assert_eq!(call.participant_identity.as_deref(), Some("+15551234567"));
        assert_eq!(call.call_started_at, Some(first));
    }

    #[test]
    fn test_finalize_stamps_once() {
        let mut call = CallSession::new("call-test");
        let first: DateTime<Utc> = "2026-08-07T10:15:00Z".parse().unwrap();
        let second: DateTime<Utc> = "2026-08-07T10:20:00Z".parse().unwrap();

        call.finalize(first);
        call.finalize(second);

        assert_eq!(call.call_ended_at, Some(first));
    }
}
