use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::TimingConfig;
use crate::telephony::TelephonyBackend;

/// PIN used when the job metadata carries none, keeping the signaling step
/// deterministic.
pub const DEFAULT_PIN: &str = "0000#";

/// One DTMF symbol with its tone code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DtmfTone {
    pub symbol: char,
    pub code: u8,
}

impl DtmfTone {
    /// Map a PIN symbol to its tone code: digits map to themselves, `*` to
    /// 10 and `#` to 11. Any other symbol has no tone.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        let code = match symbol {
            '0'..='9' => symbol as u8 - b'0',
            '*' => 10,
            '#' => 11,
            _ => return None,
        };
        Some(Self { symbol, code })
    }
}

/// Transmits a conference PIN digit-by-digit on the call's outbound
/// signaling channel.
///
/// Transmission is sequential by construction: interleaved tones would
/// corrupt DTMF recognition on the remote end.
pub struct DtmfSignaler {
    telephony: Arc<dyn TelephonyBackend>,
    room: String,
    settle: Duration,
    gap: Duration,
}

impl DtmfSignaler {
    pub fn new(telephony: Arc<dyn TelephonyBackend>, room: &str, timing: &TimingConfig) -> Self {
        Self {
            telephony,
            room: room.to_string(),
            settle: Duration::from_secs(timing.pin_settle_secs),
            gap: Duration::from_millis(timing.inter_tone_gap_ms),
        }
    }

    /// Send the PIN, one tone per recognized symbol in input order, with a
    /// fixed gap after each tone. Unrecognized symbols are skipped without
    /// charging a gap. Waits the settle delay first so the remote bridge's
    /// IVR is ready to hear the tones.
    ///
    /// Returns the number of tones transmitted.
    pub async fn send_pin(&self, pin: &str) -> Result<usize> {
        tokio::time::sleep(self.settle).await;

        info!(room = %self.room, "Sending conference PIN over DTMF");

        let mut sent = 0;
        for symbol in pin.chars() {
            let Some(tone) = DtmfTone::from_symbol(symbol) else {
                warn!(%symbol, "Skipping unrecognized PIN symbol");
                continue;
            };

            self.telephony
                .publish_tone(&self.room, tone.code, tone.symbol)
                .await?;
            sent += 1;

            tokio::time::sleep(self.gap).await;
        }

        info!(tones = sent, "Conference PIN sent");
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_mapping() {
        for (i, symbol) in ('0'..='9').enumerate() {
            let tone = DtmfTone::from_symbol(symbol).unwrap();
            assert_eq!(tone.code, i as u8);
            assert_eq!(tone.symbol, symbol);
        }
    }

    #[test]
    fn test_star_and_hash_mapping() {
        assert_eq!(DtmfTone::from_symbol('*').unwrap().code, 10);
        assert_eq!(DtmfTone::from_symbol('#').unwrap().code, 11);
    }

    #[test]
    fn test_unrecognized_symbols_have_no_tone() {
        assert!(DtmfTone::from_symbol('a').is_none());
        assert!(DtmfTone::from_symbol(' ').is_none());
        assert!(DtmfTone::from_symbol('-').is_none());
    }

    #[test]
    fn test_default_pin_maps_to_five_tones() {
        let codes: Vec<u8> = DEFAULT_PIN
            .chars()
            .filter_map(|c| DtmfTone::from_symbol(c).map(|t| t.code))
            .collect();
        assert_eq!(codes, vec![0, 0, 0, 0, 11]);
    }
}
