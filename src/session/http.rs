use anyhow::{Context, Result};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::agent::InterviewAgent;
use super::history::ConversationTurn;
use super::options::{RoomInputOptions, SessionOptions};
use super::pipeline::{SessionEvent, VoicePipeline};
use crate::config::PipelineServiceConfig;

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    turns: Vec<ConversationTurn>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum PipelineEvent {
    EndCallRequested,
    Closed,
}

/// HTTP client for the conversational pipeline service.
///
/// The service hosts the actual recognition/reasoning/synthesis stack;
/// this client creates a session bound to the call's room, relays scripted
/// lines and playout waits, and forwards the service's out-of-band events
/// (end-call tool invocations, room closure) to the coordinator.
pub struct HttpVoicePipeline {
    http: reqwest::Client,
    base_url: String,
    room: Mutex<Option<String>>,
}

impl HttpVoicePipeline {
    pub fn new(config: &PipelineServiceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build pipeline HTTP client")?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            room: Mutex::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn session_room(&self) -> Result<String> {
        self.room
            .lock()
            .await
            .clone()
            .context("Voice session has not been started")
    }

    /// Long-poll the session's event feed, forwarding to the coordinator.
    /// Ends when the feed reports closure or the coordinator goes away.
    async fn poll_events(
        http: reqwest::Client,
        url: String,
        events: mpsc::Sender<SessionEvent>,
    ) {
        loop {
            let batch = match http.get(&url).send().await {
                Ok(resp) => match resp.error_for_status() {
                    Ok(resp) => resp.json::<Vec<PipelineEvent>>().await,
                    Err(e) => {
                        warn!("Pipeline event feed ended: {}", e);
                        return;
                    }
                },
                Err(e) => {
                    warn!("Pipeline event feed unreachable: {}", e);
                    return;
                }
            };

            let batch = match batch {
                Ok(batch) => batch,
                Err(e) => {
                    warn!("Unparseable pipeline event: {}", e);
                    continue;
                }
            };

            for event in batch {
                let (event, last) = match event {
                    PipelineEvent::EndCallRequested => (SessionEvent::EndCallRequested, false),
                    PipelineEvent::Closed => (SessionEvent::Closed, true),
                };

                if events.send(event).await.is_err() {
                    return;
                }
                if last {
                    return;
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl VoicePipeline for HttpVoicePipeline {
    async fn start(
        &self,
        agent: Arc<InterviewAgent>,
        room: &str,
        options: &SessionOptions,
        input: &RoomInputOptions,
        events: mpsc::Sender<SessionEvent>,
    ) -> Result<()> {
        self.http
            .post(self.url("/v1/sessions"))
            .json(&serde_json::json!({
                "room": room,
                "instructions": agent.instructions(),
                "options": options,
                "input": input,
            }))
            .send()
            .await
            .context("Failed to create pipeline session")?
            .error_for_status()
            .context("Pipeline session rejected")?;

        *self.room.lock().await = Some(room.to_string());
        info!(%room, "Voice session attached to room");

        tokio::spawn(Self::poll_events(
            self.http.clone(),
            self.url(&format!("/v1/sessions/{}/events", room)),
            events,
        ));

        Ok(())
    }

    async fn say(&self, text: &str) -> Result<()> {
        let room = self.session_room().await?;
        self.http
            .post(self.url(&format!("/v1/sessions/{}/say", room)))
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .context("Failed to send scripted line")?
            .error_for_status()
            .context("Scripted line rejected")?;
        Ok(())
    }

    async fn wait_for_playout(&self) -> Result<()> {
        let room = self.session_room().await?;
        self.http
            .post(self.url(&format!("/v1/sessions/{}/wait-playout", room)))
            .send()
            .await
            .context("Failed to wait for playout")?
            .error_for_status()
            .context("Playout wait rejected")?;
        Ok(())
    }

    async fn history(&self) -> Result<Vec<ConversationTurn>> {
        let room = self.session_room().await?;
        let resp: HistoryResponse = self
            .http
            .get(self.url(&format!("/v1/sessions/{}/history", room)))
            .send()
            .await
            .context("Failed to fetch conversation history")?
            .error_for_status()
            .context("History request rejected")?
            .json()
            .await
            .context("Invalid history response")?;

        Ok(resp.turns)
    }

    async fn close(&self) -> Result<()> {
        let Some(room) = self.room.lock().await.take() else {
            return Ok(());
        };

        self.http
            .delete(self.url(&format!("/v1/sessions/{}", room)))
            .send()
            .await
            .context("Failed to close pipeline session")?
            .error_for_status()
            .context("Pipeline session close rejected")?;

        info!(%room, "Voice session closed");
        Ok(())
    }
}
