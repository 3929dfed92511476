//! Custom error types for generation and synthesis operations

use thiserror::Error;

/// Studio-wide errors
#[derive(Error, Debug)]
pub enum StudioError {
    /// A required credential or setting is absent
    #[error("Configuration missing: {key} is required")]
    ConfigurationMissing {
        key: String,
    },

    /// The speech provider's quota endpoint could not be queried
    #[error("Failed to fetch quota: {message}")]
    RemoteUnavailable {
        message: String,
    },

    /// Text generation failed
    #[error("Generation error: {message}")]
    GenerationError {
        message: String,
    },

    /// Local credit reservation refused before any remote call
    #[error("Insufficient credits! Required: {required}, Remaining: {remaining}")]
    InsufficientCredits {
        required: u64,
        remaining: u64,
    },

    /// The speech provider rejected the call because the account balance is exhausted
    #[error("Quota exceeded: {message}")]
    QuotaExceeded {
        message: String,
    },

    /// Any other speech synthesis failure
    #[error("Audio error: {message}")]
    SynthesisError {
        message: String,
    },

    /// The request could not be built from the given inputs
    #[error("Invalid request: {message}")]
    InvalidRequest {
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl StudioError {
    /// True when the current request may simply be re-triggered by the user
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, StudioError::ConfigurationMissing { .. })
    }
}

/// Result type for studio operations
pub type Result<T> = std::result::Result<T, StudioError>;
