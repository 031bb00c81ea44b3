use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Worker configuration, built once at process start and passed by
/// reference into the lifecycle coordinator. There is no ambient global
/// state: the trunk identity, API endpoints and database coordinates all
/// live here.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentSettings,
    pub telephony: TelephonyConfig,
    #[serde(default)]
    pub pipeline: PipelineServiceConfig,
    #[serde(default)]
    pub recording: RecordingConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentSettings {
    /// Display name the agent introduces itself with
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelephonyConfig {
    /// Base URL of the telephony / media-room API
    pub api_url: String,
    pub api_key: String,
    pub api_secret: String,

    /// Outbound trunk the call is placed through
    pub outbound_trunk_id: String,

    /// Poll interval while waiting for the SIP participant to join
    #[serde(default = "default_participant_poll_ms")]
    pub participant_poll_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineServiceConfig {
    /// Base URL of the conversational pipeline service
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordingConfig {
    /// Output path template; `{room}` is replaced with the room identifier
    pub output_template: String,

    /// Remote object storage for the capture, when configured
    #[serde(default)]
    pub storage: Option<StorageCredentials>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageCredentials {
    pub access_key: String,
    pub secret: String,
    pub region: String,
    pub bucket: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
}

/// Empirical timing constants for the call flow. These are configuration,
/// not protocol requirements.
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// Settle delay between participant join and the first DTMF tone,
    /// giving the remote bridge's IVR time to become ready
    #[serde(default = "default_pin_settle_secs")]
    pub pin_settle_secs: u64,

    /// Gap between consecutive DTMF tones
    #[serde(default = "default_inter_tone_gap_ms")]
    pub inter_tone_gap_ms: u64,

    /// Pause after the last tone before the opening line, letting the call
    /// audio pipeline come up
    #[serde(default = "default_post_pin_pause_ms")]
    pub post_pin_pause_ms: u64,
}

fn default_participant_poll_ms() -> u64 {
    250
}

fn default_pin_settle_secs() -> u64 {
    12
}

fn default_inter_tone_gap_ms() -> u64 {
    500
}

fn default_post_pin_pause_ms() -> u64 {
    1000
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            name: "Alice".to_string(),
        }
    }
}

impl Default for PipelineServiceConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8282".to_string(),
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            output_template: "recordings/{room}.ogg".to_string(),
            storage: None,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            pin_settle_secs: default_pin_settle_secs(),
            inter_tone_gap_ms: default_inter_tone_gap_ms(),
            post_pin_pause_ms: default_post_pin_pause_ms(),
        }
    }
}

impl Config {
    /// Load configuration from an optional file, overridden by environment
    /// variables with the `INTERVIEW_CALLER_` prefix (nested fields joined
    /// with `__`, e.g. `INTERVIEW_CALLER_DATABASE__HOST`).
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("INTERVIEW_CALLER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
