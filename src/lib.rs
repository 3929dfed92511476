//! Banter Studio - AI joke & story generation with voice-over
//!
//! This library generates short jokes and stories in English or Hindi
//! through a hosted chat-completion API, optionally voices them through a
//! hosted speech-synthesis API, and guards the paid speech quota with a
//! per-session credit ledger.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

pub mod cli;
pub mod core;
pub mod server;

// Re-export key types for convenience
pub use crate::core::{
    config::StudioConfig,
    errors::{Result, StudioError},
    generator::TextGenerator,
    models::{
        ContentOutcome, ContentRequest, ContentType, JokeStyle, Language, LengthHint,
        QuotaState, SynthesisResult, VoiceProfile,
    },
    orchestrator::ContentOrchestrator,
    quota::QuotaLedger,
    speech::SpeechSynthesizer,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
