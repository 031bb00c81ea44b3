// Mock backends for lifecycle and signaling tests.
//
// Every mock appends to a shared chronological log so tests can assert
// cross-component ordering (recording before dial, tones before the
// opening line) and not just call counts. Each test crate uses a subset
// of these.
#![allow(dead_code)]

use anyhow::{bail, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use interview_caller::config::{
    AgentSettings, Config, DatabaseConfig, PipelineServiceConfig, RecordingConfig,
    TelephonyConfig, TimingConfig,
};
use interview_caller::{
    ConversationTurn, DialFailure, EgressBackend, EgressError, EgressRequest, InterviewAgent,
    Participant, RoomInputOptions, SessionEvent, SessionOptions, SipParticipantRequest,
    TelephonyBackend, TranscriptRecord, TranscriptStore, TurnRole, VoicePipeline,
};

#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Index of the first entry with the given prefix, if any.
    pub fn first_index(&self, prefix: &str) -> Option<usize> {
        self.entries().iter().position(|e| e.starts_with(prefix))
    }

    /// Index of the last entry with the given prefix, if any.
    pub fn last_index(&self, prefix: &str) -> Option<usize> {
        self.entries().iter().rposition(|e| e.starts_with(prefix))
    }
}

pub struct MockTelephony {
    pub log: EventLog,
    pub dial_failure: Mutex<Option<DialFailure>>,
    pub dials: Mutex<Vec<SipParticipantRequest>>,
    pub close_count: AtomicUsize,
}

impl MockTelephony {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            dial_failure: Mutex::new(None),
            dials: Mutex::new(Vec::new()),
            close_count: AtomicUsize::new(0),
        }
    }

    pub fn failing_dial(log: EventLog, failure: DialFailure) -> Self {
        let mock = Self::new(log);
        *mock.dial_failure.lock().unwrap() = Some(failure);
        mock
    }
}

#[async_trait::async_trait]
impl TelephonyBackend for MockTelephony {
    async fn create_sip_participant(
        &self,
        req: &SipParticipantRequest,
    ) -> Result<(), DialFailure> {
        // Yield once so concurrently-launched tasks (session startup) get
        // polled before the dial lands, as a real network dial would allow.
        tokio::task::yield_now().await;

        self.log.push(format!("dial:{}", req.sip_call_to));
        self.dials.lock().unwrap().push(req.clone());

        match self.dial_failure.lock().unwrap().clone() {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    async fn wait_for_participant(&self, _room: &str, identity: &str) -> Result<Participant> {
        self.log.push(format!("join:{}", identity));
        Ok(Participant {
            identity: identity.to_string(),
        })
    }

    async fn publish_tone(&self, _room: &str, code: u8, symbol: char) -> Result<()> {
        self.log.push(format!("tone:{}:{}", code, symbol));
        Ok(())
    }

    async fn delete_room(&self, room: &str) -> Result<()> {
        self.log.push(format!("delete-room:{}", room));
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.close_count.fetch_add(1, Ordering::SeqCst);
        self.log.push("api-close");
        Ok(())
    }
}

pub struct MockEgress {
    pub log: EventLog,
    pub fail_start: bool,
    pub stop_result: Mutex<Option<EgressError>>,
    pub stop_count: AtomicUsize,
}

impl MockEgress {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            fail_start: false,
            stop_result: Mutex::new(None),
            stop_count: AtomicUsize::new(0),
        }
    }

    pub fn failing(log: EventLog) -> Self {
        Self {
            fail_start: true,
            ..Self::new(log)
        }
    }
}

#[async_trait::async_trait]
impl EgressBackend for MockEgress {
    async fn start_composite_egress(&self, req: &EgressRequest) -> Result<String> {
        if self.fail_start {
            self.log.push("egress-start-failed");
            bail!("egress backend unreachable");
        }
        self.log.push(format!("egress-start:{}", req.room_name));
        Ok("EG_test".to_string())
    }

    async fn stop_egress(&self, egress_id: &str) -> Result<(), EgressError> {
        self.stop_count.fetch_add(1, Ordering::SeqCst);
        self.log.push(format!("egress-stop:{}", egress_id));
        match self.stop_result.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

pub struct MockPipeline {
    pub log: EventLog,
    /// Request end-of-call right after the first scripted line, simulating
    /// the agent's end_call tool firing at the end of the interview.
    pub end_after_first_say: bool,
    pub fail_history: bool,
    pub turns: Mutex<Vec<ConversationTurn>>,
    events: Mutex<Option<mpsc::Sender<SessionEvent>>>,
    end_sent: AtomicBool,
}

impl MockPipeline {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            end_after_first_say: true,
            fail_history: false,
            turns: Mutex::new(vec![ConversationTurn {
                role: TurnRole::Callee,
                text: "I have five years of Epic go-live support experience.".to_string(),
                timestamp: "2026-08-07T10:01:00Z".parse().unwrap(),
            }]),
            events: Mutex::new(None),
            end_sent: AtomicBool::new(false),
        }
    }
}

#[async_trait::async_trait]
impl VoicePipeline for MockPipeline {
    async fn start(
        &self,
        _agent: Arc<InterviewAgent>,
        room: &str,
        _options: &SessionOptions,
        _input: &RoomInputOptions,
        events: mpsc::Sender<SessionEvent>,
    ) -> Result<()> {
        self.log.push(format!("session-start:{}", room));
        *self.events.lock().unwrap() = Some(events);
        Ok(())
    }

    async fn say(&self, text: &str) -> Result<()> {
        self.log.push(format!("say:{}", text));

        if self.end_after_first_say && !self.end_sent.swap(true, Ordering::SeqCst) {
            let sender = self.events.lock().unwrap().clone();
            if let Some(sender) = sender {
                sender.send(SessionEvent::EndCallRequested).await.ok();
            }
        }
        Ok(())
    }

    async fn wait_for_playout(&self) -> Result<()> {
        self.log.push("playout");
        Ok(())
    }

    async fn history(&self) -> Result<Vec<ConversationTurn>> {
        if self.fail_history {
            bail!("history request rejected");
        }
        Ok(self.turns.lock().unwrap().clone())
    }

    async fn close(&self) -> Result<()> {
        self.log.push("session-close");
        Ok(())
    }
}

pub struct MockTranscriptStore {
    pub records: Mutex<Vec<TranscriptRecord>>,
    pub fail: bool,
}

impl MockTranscriptStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

#[async_trait::async_trait]
impl TranscriptStore for MockTranscriptStore {
    async fn insert(&self, record: &TranscriptRecord) -> Result<()> {
        if self.fail {
            bail!("database unreachable");
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Worker configuration with all waits zeroed so lifecycle tests run
/// instantly.
pub fn test_config() -> Config {
    Config {
        agent: AgentSettings {
            name: "Alice".to_string(),
        },
        telephony: TelephonyConfig {
            api_url: "http://localhost:0".to_string(),
            api_key: "test-key".to_string(),
            api_secret: "test-secret".to_string(),
            outbound_trunk_id: "ST_outbound".to_string(),
            participant_poll_ms: 10,
        },
        pipeline: PipelineServiceConfig::default(),
        recording: RecordingConfig::default(),
        database: DatabaseConfig {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            dbname: "interviews_test".to_string(),
        },
        timing: TimingConfig {
            pin_settle_secs: 0,
            inter_tone_gap_ms: 0,
            post_pin_pause_ms: 0,
        },
    }
}
