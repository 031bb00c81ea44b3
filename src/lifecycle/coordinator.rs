use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::session::CallSession;
use super::shutdown::TerminationHooks;
use crate::archive::{TranscriptArchiver, TranscriptPayload, TranscriptStore};
use crate::config::{Config, TimingConfig};
use crate::dtmf::{DtmfSignaler, DEFAULT_PIN};
use crate::job::CallJob;
use crate::recording::RecordingController;
use crate::session::{
    InterviewAgent, RoomInputOptions, SessionEvent, SessionOptions, VoicePipeline,
    VoiceSessionManager,
};
use crate::telephony::{EgressBackend, SipParticipantRequest, TelephonyBackend};

/// Lifecycle states for one outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Configuring,
    RecordingRequested,
    SessionStarting,
    Dialing,
    AwaitingParticipant,
    SignalingPin,
    Conversing,
    ShuttingDown,
    Archived,
}

/// Sequences one call from "not yet connected" to "fully torn down and
/// archived".
///
/// The ordering invariants live here: recording is requested before the
/// dial is issued, the voice session is launched before the dial is issued
/// but only awaited at the participant-join checkpoint, DTMF is sent only
/// after the callee is confirmed present, and the termination hooks run
/// exactly once on every exit path.
pub struct LifecycleCoordinator {
    telephony: Arc<dyn TelephonyBackend>,
    recording: Arc<RecordingController>,
    session: Arc<VoiceSessionManager>,
    agent: Arc<InterviewAgent>,
    archiver: Arc<TranscriptArchiver>,
    trunk_id: String,
    timing: TimingConfig,
    state: CallState,
    hooks: TerminationHooks,
}

impl LifecycleCoordinator {
    pub fn new(
        config: &Config,
        telephony: Arc<dyn TelephonyBackend>,
        egress: Arc<dyn EgressBackend>,
        pipeline: Arc<dyn VoicePipeline>,
        store: Arc<dyn TranscriptStore>,
    ) -> Self {
        Self {
            recording: Arc::new(RecordingController::new(egress, config.recording.clone())),
            session: Arc::new(VoiceSessionManager::new(pipeline, SessionOptions::default())),
            agent: Arc::new(InterviewAgent::new(&config.agent.name)),
            archiver: Arc::new(TranscriptArchiver::new(store)),
            trunk_id: config.telephony.outbound_trunk_id.clone(),
            timing: config.timing.clone(),
            telephony,
            state: CallState::Configuring,
            hooks: TerminationHooks::new(),
        }
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    fn advance(&mut self, next: CallState) {
        debug!(from = ?self.state, to = ?next, "Call state transition");
        self.state = next;
    }

    /// Run the call to completion. Only configuration problems abort
    /// before the call; every later failure is logged and still routes
    /// through the termination hooks, which fire exactly once.
    pub async fn run(mut self, job: CallJob) -> CallSession {
        info!(
            room = %job.room_identifier,
            callee = %job.callee_number,
            "Starting outbound interview call"
        );

        let mut call = CallSession::new(&job.room_identifier);
        self.register_termination_hooks(&job);

        // Recording is requested first so early audio is captured; a
        // failure here downgrades the call, never aborts it.
        self.advance(CallState::RecordingRequested);
        call.recording_id = self.recording.start(&job.room_identifier).await;

        // Launch the session before dialing so the agent hears everything
        // the callee says from the moment they pick up.
        self.advance(CallState::SessionStarting);
        let (events_tx, events_rx) = mpsc::channel(8);
        let input = RoomInputOptions::for_participant(&job.participant_identity);
        let session_started = self.session.spawn_start(
            Arc::clone(&self.agent),
            &job.room_identifier,
            input,
            events_tx,
        );

        self.advance(CallState::Dialing);
        let dial_request = SipParticipantRequest {
            room_name: job.room_identifier.clone(),
            sip_trunk_id: self.trunk_id.clone(),
            sip_call_to: job.callee_number.clone(),
            participant_identity: job.participant_identity.clone(),
            wait_until_answered: true,
        };

        match self.telephony.create_sip_participant(&dial_request).await {
            Ok(()) => {
                info!(callee = %job.callee_number, "Call answered");

                if let Err(e) = self
                    .converse(&job, &mut call, session_started, events_rx)
                    .await
                {
                    error!(room = %job.room_identifier, "Call flow aborted: {:#}", e);
                }
            }
            Err(failure) => {
                // The session (and any recording) already started are torn
                // down by the termination hooks below.
                error!(
                    status = %failure.status,
                    sip_status_code = ?failure.sip_status_code,
                    sip_status = ?failure.sip_status,
                    "Error creating SIP participant: {}",
                    failure.message
                );
            }
        }

        self.advance(CallState::ShuttingDown);
        let call = self.hooks.fire(call).await;
        self.advance(CallState::Archived);

        info!(room = %call.room_identifier, "Call session archived");
        call
    }

    /// Happy path from answered call to conversation end. Any error here
    /// bubbles to `run`, which logs it and proceeds to shutdown.
    async fn converse(
        &mut self,
        job: &CallJob,
        call: &mut CallSession,
        session_started: JoinHandle<Result<()>>,
        mut events_rx: mpsc::Receiver<SessionEvent>,
    ) -> Result<()> {
        self.advance(CallState::AwaitingParticipant);

        // The session must have finished starting before the call is
        // treated as interactive.
        session_started
            .await
            .context("Session start task panicked")??;

        info!("Waiting for SIP participant to join...");
        let participant = self
            .telephony
            .wait_for_participant(&job.room_identifier, &job.participant_identity)
            .await?;
        info!(identity = %participant.identity, "Participant joined");
        call.mark_joined(participant.identity, Utc::now());

        self.advance(CallState::SignalingPin);
        let pin = job
            .conference_pin
            .clone()
            .unwrap_or_else(|| DEFAULT_PIN.to_string());
        let signaler = DtmfSignaler::new(
            Arc::clone(&self.telephony),
            &job.room_identifier,
            &self.timing,
        );
        signaler.send_pin(&pin).await?;

        self.advance(CallState::Conversing);

        // Short pause so the call audio pipeline is ready before the
        // opening line.
        tokio::time::sleep(Duration::from_millis(self.timing.post_pin_pause_ms)).await;
        self.session.say(&self.agent.opening_line()).await?;

        loop {
            tokio::select! {
                event = events_rx.recv() => match event {
                    Some(SessionEvent::EndCallRequested) => {
                        self.agent
                            .end_call(&self.session, self.telephony.as_ref(), &job.room_identifier)
                            .await?;
                        break;
                    }
                    Some(SessionEvent::Closed) | None => {
                        info!("Voice session ended");
                        break;
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Register the teardown sequence. Each hook tolerates upstream
    /// resources that were never created, and each logs its own failures
    /// so one failing step cannot keep the next from running.
    fn register_termination_hooks(&mut self, job: &CallJob) {
        // 1. Stamp the call end.
        self.hooks.register(|mut call| async move {
            call.finalize(Utc::now());
            call
        });

        // 2. Archive the transcript. An unavailable history becomes a
        //    placeholder payload; the row is always written.
        let archiver = Arc::clone(&self.archiver);
        let session = Arc::clone(&self.session);
        let job_for_archive = job.clone();
        self.hooks.register(move |mut call| async move {
            let transcript = match session.history().await {
                Ok(turns) => {
                    call.conversation_history = turns.clone();
                    TranscriptPayload::Turns(turns)
                }
                Err(e) => {
                    error!("Conversation history unavailable: {:#}", e);
                    TranscriptPayload::Unavailable {
                        error: format!("{:#}", e),
                    }
                }
            };

            if let Err(e) = archiver.archive(&job_for_archive, &call, transcript).await {
                error!("{}", e);
            }
            call
        });

        // 3. Detach the voice session from the room.
        let session = Arc::clone(&self.session);
        self.hooks.register(move |call| async move {
            if let Err(e) = session.close().await {
                error!("Voice session close failed: {:#}", e);
            }
            call
        });

        // 4. Stop the recording, independent of archive outcome.
        let recording = Arc::clone(&self.recording);
        self.hooks.register(move |call| async move {
            if let Some(egress_id) = call.recording_id.clone() {
                if let Err(e) = recording.stop(&egress_id).await {
                    error!("{}", e);
                }
            }
            call
        });

        // 5. Close the shared API client, last.
        let telephony = Arc::clone(&self.telephony);
        self.hooks.register(move |call| async move {
            if let Err(e) = telephony.close().await {
                error!("API client close failed: {:#}", e);
            }
            call
        });
    }
}
