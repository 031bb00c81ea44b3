use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::RecordingConfig;
use crate::error::CallError;
use crate::telephony::{EgressBackend, EgressError, EgressRequest};

/// Requests an audio-only composite capture of the call's room as soon as
/// the room exists and stops it on teardown.
///
/// Recording is strictly best-effort: a backend failure is logged and the
/// call proceeds without a capture.
pub struct RecordingController {
    egress: Arc<dyn EgressBackend>,
    config: RecordingConfig,
}

impl RecordingController {
    pub fn new(egress: Arc<dyn EgressBackend>, config: RecordingConfig) -> Self {
        Self { egress, config }
    }

    /// Start capturing the room. Returns the egress id, or `None` when the
    /// backend refused or was unreachable. Never an error, so recording
    /// problems cannot keep the call from being placed.
    pub async fn start(&self, room: &str) -> Option<String> {
        let request = EgressRequest {
            room_name: room.to_string(),
            audio_only: true,
            filepath: self.config.output_template.replace("{room}", room),
            storage: self.config.storage.clone(),
        };

        match self.egress.start_composite_egress(&request).await {
            Ok(egress_id) => {
                info!(%egress_id, %room, "Recording started");
                Some(egress_id)
            }
            Err(e) => {
                let err = CallError::Recording(format!("{:#}", e));
                warn!(%room, "{}; continuing without a capture", err);
                None
            }
        }
    }

    /// Stop the capture. A capture that already finished on the backend
    /// side counts as success; only genuinely unexpected errors surface.
    pub async fn stop(&self, egress_id: &str) -> Result<(), CallError> {
        match self.egress.stop_egress(egress_id).await {
            Ok(()) => {
                info!(%egress_id, "Recording stopped");
                Ok(())
            }
            Err(EgressError::AlreadyFinished) => {
                debug!(%egress_id, "Recording had already finished");
                Ok(())
            }
            Err(EgressError::Backend(msg)) => Err(CallError::Teardown(format!(
                "stopping egress {}: {}",
                egress_id, msg
            ))),
        }
    }
}
