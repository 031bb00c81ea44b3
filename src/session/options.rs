use serde::{Deserialize, Serialize};

/// Turn-detection strategy for the conversational pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnDetection {
    /// End-of-turn signals driven by the speech recognizer's confidence.
    Stt,
    /// Fixed trailing-silence timers from voice-activity detection.
    Vad,
}

/// Tuning for the speech pipeline bound to the call.
///
/// The defaults are the values the interview flow was tuned with: a low
/// end-of-turn confidence threshold with short confident silence keeps the
/// agent responsive over telephone audio, and recognizer-driven turn
/// detection avoids cutting off slow answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOptions {
    pub end_of_turn_confidence_threshold: f32,

    /// Trailing silence required to close a turn when the recognizer is
    /// already confident the speaker finished
    pub min_end_of_turn_silence_when_confident_ms: u32,

    /// Silence after which a turn is closed regardless of confidence
    pub max_turn_silence_ms: u32,

    pub turn_detection: TurnDetection,

    /// Voice-activity detection for interruption handling
    pub vad_enabled: bool,

    pub llm_model: String,
    pub llm_temperature: f32,
    pub tts_model: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            end_of_turn_confidence_threshold: 0.4,
            min_end_of_turn_silence_when_confident_ms: 400,
            max_turn_silence_ms: 1280,
            turn_detection: TurnDetection::Stt,
            vad_enabled: true,
            llm_model: "gpt-4".to_string(),
            llm_temperature: 0.5,
            tts_model: "sonic-2".to_string(),
        }
    }
}

/// Noise cancellation applied to the room's inbound audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseCancellation {
    None,
    /// Background voice and noise removal tuned for telephony audio
    BvcTelephony,
}

/// How the pipeline consumes the room's audio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomInputOptions {
    /// Only audio from this participant feeds the recognizer
    pub participant_identity: String,
    pub noise_cancellation: NoiseCancellation,
}

impl RoomInputOptions {
    pub fn for_participant(identity: &str) -> Self {
        Self {
            participant_identity: identity.to_string(),
            noise_cancellation: NoiseCancellation::BvcTelephony,
        }
    }
}
