//! Text generation client for the hosted chat-completion provider

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::core::config::StudioConfig;
use crate::core::errors::{Result, StudioError};

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Single request/response text generator: no streaming, no retries.
/// A failure aborts only the current request; the session continues.
#[derive(Debug, Clone)]
pub struct TextGenerator {
    client: reqwest::Client,
    config: Arc<StudioConfig>,
}

impl TextGenerator {
    /// Create a generator sharing the studio configuration
    pub fn new(config: Arc<StudioConfig>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    /// Generate prose for a prompt with the default temperature
    pub async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        self.generate_with_temperature(prompt, max_tokens, DEFAULT_TEMPERATURE)
            .await
    }

    /// Generate prose with an explicit temperature
    pub async fn generate_with_temperature(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let body = serde_json::json!({
            "model": self.config.text_model,
            "messages": [{
                "role": "user",
                "content": prompt
            }],
            "temperature": temperature,
            "max_tokens": max_tokens
        });

        debug!(model = %self.config.text_model, max_tokens, "Sending generation request");

        let response = self
            .client
            .post(&self.config.text_endpoint)
            .header("Authorization", format!("Bearer {}", self.config.text_api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| StudioError::GenerationError {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StudioError::GenerationError {
                message: format!("{} - {}", status.as_u16(), message),
            });
        }

        let json: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| StudioError::GenerationError {
                    message: e.to_string(),
                })?;

        let content = json["choices"]
            .get(0)
            .and_then(|c| c["message"]["content"].as_str())
            .ok_or_else(|| StudioError::GenerationError {
                message: "No content in response".to_string(),
            })?
            .trim()
            .to_string();

        if content.is_empty() {
            return Err(StudioError::GenerationError {
                message: "Provider returned empty content".to_string(),
            });
        }

        Ok(content)
    }
}
