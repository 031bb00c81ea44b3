use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use super::backend::{
    EgressBackend, EgressError, EgressRequest, Participant, SipParticipantRequest,
    TelephonyBackend,
};
use crate::config::TelephonyConfig;
use crate::error::DialFailure;

/// Error body returned by the room service API.
#[derive(Debug, Deserialize)]
struct ApiError {
    status: String,
    message: String,
    #[serde(default)]
    sip_status_code: Option<u16>,
    #[serde(default)]
    sip_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ParticipantList {
    participants: Vec<Participant>,
}

#[derive(Debug, Deserialize)]
struct EgressInfo {
    egress_id: String,
}

/// HTTP client for the telephony / media-room / egress API.
///
/// One instance is shared for the whole call and closed exactly once at the
/// end of the shutdown sequence.
pub struct HttpApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
    participant_poll: Duration,
}

impl HttpApiClient {
    pub fn new(config: &TelephonyConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        info!("Using room service API at {}", config.api_url);

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            participant_poll: Duration::from_millis(config.participant_poll_ms),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_api_error(resp: reqwest::Response) -> ApiError {
        let status = resp.status();
        resp.json::<ApiError>().await.unwrap_or_else(|_| ApiError {
            status: status.as_str().to_string(),
            message: "unparseable error response".to_string(),
            sip_status_code: None,
            sip_status: None,
        })
    }
}

#[async_trait::async_trait]
impl TelephonyBackend for HttpApiClient {
    async fn create_sip_participant(
        &self,
        req: &SipParticipantRequest,
    ) -> Result<(), DialFailure> {
        let resp = self
            .http
            .post(self.url("/v1/sip/participants"))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .json(req)
            .send()
            .await
            .map_err(|e| DialFailure::new("transport", e.to_string()))?;

        if resp.status().is_success() {
            return Ok(());
        }

        let err = Self::read_api_error(resp).await;
        Err(DialFailure {
            status: err.status,
            sip_status_code: err.sip_status_code,
            sip_status: err.sip_status,
            message: err.message,
        })
    }

    async fn wait_for_participant(&self, room: &str, identity: &str) -> Result<Participant> {
        loop {
            let resp = self
                .http
                .get(self.url(&format!("/v1/rooms/{}/participants", room)))
                .basic_auth(&self.api_key, Some(&self.api_secret))
                .send()
                .await
                .context("Failed to list room participants")?
                .error_for_status()
                .context("Participant listing rejected")?;

            let list: ParticipantList = resp
                .json()
                .await
                .context("Invalid participant list response")?;

            if let Some(p) = list.participants.into_iter().find(|p| p.identity == identity) {
                return Ok(p);
            }

            tokio::time::sleep(self.participant_poll).await;
        }
    }

    async fn publish_tone(&self, room: &str, code: u8, symbol: char) -> Result<()> {
        self.http
            .post(self.url(&format!("/v1/rooms/{}/dtmf", room)))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .json(&serde_json::json!({ "code": code, "digit": symbol.to_string() }))
            .send()
            .await
            .context("Failed to publish DTMF tone")?
            .error_for_status()
            .context("DTMF tone rejected")?;

        debug!(%symbol, code, "Published DTMF tone");
        Ok(())
    }

    async fn delete_room(&self, room: &str) -> Result<()> {
        self.http
            .delete(self.url(&format!("/v1/rooms/{}", room)))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .send()
            .await
            .context("Failed to delete room")?
            .error_for_status()
            .context("Room deletion rejected")?;

        info!(%room, "Room deleted");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        // reqwest tears its pool down on drop; nothing else to release.
        info!("Closing room service API client");
        Ok(())
    }
}

#[async_trait::async_trait]
impl EgressBackend for HttpApiClient {
    async fn start_composite_egress(&self, req: &EgressRequest) -> Result<String> {
        let resp = self
            .http
            .post(self.url("/v1/egress/room_composite"))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .json(req)
            .send()
            .await
            .context("Failed to request composite egress")?
            .error_for_status()
            .context("Composite egress rejected")?;

        let info: EgressInfo = resp.json().await.context("Invalid egress response")?;
        info!(egress_id = %info.egress_id, room = %req.room_name, "Composite egress started");
        Ok(info.egress_id)
    }

    async fn stop_egress(&self, egress_id: &str) -> Result<(), EgressError> {
        let resp = self
            .http
            .post(self.url(&format!("/v1/egress/{}/stop", egress_id)))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .send()
            .await
            .map_err(|e| EgressError::Backend(e.to_string()))?;

        match resp.status() {
            s if s.is_success() => Ok(()),
            // The backend reports captures that already completed or failed
            // on their own with 409/410.
            StatusCode::CONFLICT | StatusCode::GONE => Err(EgressError::AlreadyFinished),
            _ => {
                let err = Self::read_api_error(resp).await;
                Err(EgressError::Backend(format!(
                    "{}: {}",
                    err.status, err.message
                )))
            }
        }
    }
}
