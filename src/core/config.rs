//! Configuration management

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, StudioError};

/// Default per-session credit ceiling when the provider balance is unreachable
pub const DEFAULT_MAX_CREDITS: u64 = 10_000;

/// Configuration for the studio
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioConfig {
    /// Credential for the text-completion provider
    pub text_api_key: String,
    /// Credential for the speech-synthesis provider
    pub speech_api_key: String,
    pub text_endpoint: String,
    pub speech_endpoint: String,
    pub text_model: String,
    pub speech_model: String,
    pub max_credits: u64,
    pub timeout_ms: u64,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            text_api_key: std::env::var("GROQ_API_KEY").unwrap_or_default(),
            speech_api_key: std::env::var("ELEVENLABS_API_KEY").unwrap_or_default(),
            text_endpoint: default_text_endpoint(),
            speech_endpoint: default_speech_endpoint(),
            text_model: "llama-3.3-70b-versatile".to_string(),
            speech_model: "eleven_multilingual_v2".to_string(),
            max_credits: DEFAULT_MAX_CREDITS,
            timeout_ms: 30_000,
        }
    }
}

fn default_text_endpoint() -> String {
    std::env::var("TEXT_API_ENDPOINT")
        .unwrap_or_else(|_| "https://api.groq.com/openai/v1/chat/completions".to_string())
}

fn default_speech_endpoint() -> String {
    std::env::var("SPEECH_API_ENDPOINT").unwrap_or_else(|_| "https://api.elevenlabs.io".to_string())
}

impl StudioConfig {
    /// Load configuration from environment variables
    ///
    /// Both credentials are required; nothing proceeds without them.
    pub fn from_env() -> Result<Self> {
        let text_api_key =
            std::env::var("GROQ_API_KEY").map_err(|_| StudioError::ConfigurationMissing {
                key: "GROQ_API_KEY".to_string(),
            })?;

        let speech_api_key =
            std::env::var("ELEVENLABS_API_KEY").map_err(|_| StudioError::ConfigurationMissing {
                key: "ELEVENLABS_API_KEY".to_string(),
            })?;

        let max_credits = std::env::var("MAX_CREDITS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_MAX_CREDITS);

        let timeout_ms = std::env::var("REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30_000);

        let config = Self {
            text_api_key,
            speech_api_key,
            text_endpoint: default_text_endpoint(),
            speech_endpoint: default_speech_endpoint(),
            max_credits,
            timeout_ms,
            ..Default::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.text_api_key.is_empty() {
            return Err(StudioError::ConfigurationMissing {
                key: "GROQ_API_KEY".to_string(),
            });
        }

        if self.speech_api_key.is_empty() {
            return Err(StudioError::ConfigurationMissing {
                key: "ELEVENLABS_API_KEY".to_string(),
            });
        }

        if self.text_endpoint.is_empty() || self.speech_endpoint.is_empty() {
            return Err(StudioError::ConfigurationMissing {
                key: "API endpoint".to_string(),
            });
        }

        if self.max_credits == 0 {
            return Err(StudioError::InvalidRequest {
                message: "max_credits must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}
