//! Speech synthesis client gated by the credit ledger

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::core::config::StudioConfig;
use crate::core::errors::{Result, StudioError};
use crate::core::models::{QuotaState, SynthesisResult, VoiceProfile};
use crate::core::quota::QuotaLedger;

/// Fixed similarity boost for every synthesis call
const SIMILARITY_BOOST: f32 = 0.8;

/// Marker the provider embeds in quota-exhaustion error bodies
const QUOTA_EXCEEDED_MARKER: &str = "quota_exceeded";

/// Voice synthesis client
///
/// Every call is pre-checked against the ledger; no request reaches the
/// provider when the local reservation fails.
#[derive(Debug, Clone)]
pub struct SpeechSynthesizer {
    client: reqwest::Client,
    config: Arc<StudioConfig>,
    ledger: QuotaLedger,
}

impl SpeechSynthesizer {
    /// Create a synthesizer spending from the given ledger
    pub fn new(config: Arc<StudioConfig>, ledger: QuotaLedger) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            config,
            ledger,
        })
    }

    /// The ledger this synthesizer spends from
    pub fn ledger(&self) -> &QuotaLedger {
        &self.ledger
    }

    /// Overwrite the ledger from the provider's subscription endpoint
    pub async fn refresh_quota(&self) -> Result<QuotaState> {
        self.ledger
            .refresh_from_remote(
                &self.client,
                &self.config.speech_endpoint,
                &self.config.speech_api_key,
            )
            .await
    }

    /// Convert text to audio bytes
    ///
    /// Charges the estimated cost on success; on a remote quota rejection the
    /// ledger is reconciled from the error text before the error is surfaced.
    pub async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceProfile,
    ) -> Result<SynthesisResult> {
        let cost = QuotaLedger::estimate_cost(text);

        if !self.ledger.reserve(cost).await {
            return Err(StudioError::InsufficientCredits {
                required: cost,
                remaining: self.ledger.remaining().await,
            });
        }

        let url = format!(
            "{}/v1/text-to-speech/{}",
            self.config.speech_endpoint, voice.voice_id
        );
        let body = serde_json::json!({
            "text": text,
            "model_id": self.config.speech_model,
            "voice_settings": {
                "stability": voice.stability,
                "similarity_boost": SIMILARITY_BOOST
            }
        });

        debug!(voice_id = %voice.voice_id, cost, "Sending synthesis request");

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.config.speech_api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| StudioError::SynthesisError {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();

            if message.contains(QUOTA_EXCEEDED_MARKER) {
                warn!("Provider rejected synthesis for quota reasons");
                self.ledger.reconcile_from_error(&message).await;
                return Err(StudioError::QuotaExceeded { message });
            }

            return Err(StudioError::SynthesisError {
                message: format!("{} - {}", status.as_u16(), message),
            });
        }

        // The provider streams the audio; concatenate into one buffer
        let mut audio = Vec::new();
        let mut response = response;
        while let Some(chunk) =
            response
                .chunk()
                .await
                .map_err(|e| StudioError::SynthesisError {
                    message: e.to_string(),
                })?
        {
            audio.extend_from_slice(&chunk);
        }

        self.ledger.commit(cost).await;

        Ok(SynthesisResult {
            audio,
            credits_charged: cost,
            source_text: text.to_string(),
        })
    }
}
