//! Core data models for content generation and synthesis

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported content languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// English speakers: Rachel, Domi
    English,
    /// Hindi speakers: Shweta, Prabhat
    Hindi,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "English"),
            Language::Hindi => write!(f, "Hindi"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "hindi" | "hi" => Ok(Language::Hindi),
            other => Err(format!("unknown language: {}", other)),
        }
    }
}

/// Kind of content a request produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    Joke,
    Story,
}

impl ContentType {
    /// Completion token budget; stories need more room than jokes
    pub fn max_tokens(&self) -> u32 {
        match self {
            ContentType::Joke => 150,
            ContentType::Story => 300,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Joke => write!(f, "joke"),
            ContentType::Story => write!(f, "story"),
        }
    }
}

/// Humor style for joke prompts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JokeStyle {
    #[default]
    Pun,
    Situational,
    Observational,
}

impl fmt::Display for JokeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JokeStyle::Pun => write!(f, "Pun"),
            JokeStyle::Situational => write!(f, "Situational"),
            JokeStyle::Observational => write!(f, "Observational"),
        }
    }
}

impl FromStr for JokeStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pun" => Ok(JokeStyle::Pun),
            "situational" => Ok(JokeStyle::Situational),
            "observational" => Ok(JokeStyle::Observational),
            other => Err(format!("unknown joke style: {}", other)),
        }
    }
}

/// Requested output length for jokes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthHint {
    #[default]
    Short,
    Medium,
}

impl LengthHint {
    /// Line-count guidance embedded in the prompt
    pub fn guidance(&self) -> &'static str {
        match self {
            LengthHint::Short => "1-2 lines",
            LengthHint::Medium => "3-4 lines",
        }
    }
}

impl fmt::Display for LengthHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthHint::Short => write!(f, "Short"),
            LengthHint::Medium => write!(f, "Medium"),
        }
    }
}

impl FromStr for LengthHint {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "short" => Ok(LengthHint::Short),
            "medium" => Ok(LengthHint::Medium),
            other => Err(format!("unknown length: {}", other)),
        }
    }
}

/// A single user action: one joke or story to generate and voice
///
/// Immutable once constructed; built fresh per action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRequest {
    pub content_type: ContentType,
    pub language: Language,
    /// Speaker name resolved against the voice catalog
    pub voice: String,
    /// Joke topic or story idea
    pub subject: String,
    pub style: Option<JokeStyle>,
    pub length: Option<LengthHint>,
}

impl ContentRequest {
    /// Build a joke request
    pub fn joke(
        language: Language,
        style: JokeStyle,
        topic: impl Into<String>,
        length: LengthHint,
    ) -> Self {
        Self {
            content_type: ContentType::Joke,
            language,
            voice: crate::core::voices::default_speaker(language).to_string(),
            subject: topic.into(),
            style: Some(style),
            length: Some(length),
        }
    }

    /// Build a story request
    pub fn story(language: Language, idea: impl Into<String>) -> Self {
        Self {
            content_type: ContentType::Story,
            language,
            voice: crate::core::voices::default_speaker(language).to_string(),
            subject: idea.into(),
            style: None,
            length: None,
        }
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }
}

/// Speaker selection: voice identifier plus pronunciation consistency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub voice_id: String,
    pub stability: f32,
}

/// Session credit accounting state
///
/// Unsigned fields keep the counters non-negative by construction; `reserve`
/// refuses any debit that would otherwise underflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaState {
    pub max_credits: u64,
    pub credits_used: u64,
    pub credits_remaining: u64,
}

impl QuotaState {
    pub fn new(max_credits: u64) -> Self {
        Self {
            max_credits,
            credits_used: 0,
            credits_remaining: max_credits,
        }
    }

    /// True when `cost` fits in the remaining balance
    pub fn can_reserve(&self, cost: u64) -> bool {
        self.credits_remaining >= cost
    }

    /// Record a confirmed spend; callers must have reserved first
    pub fn debit(&mut self, cost: u64) {
        self.credits_used += cost;
        self.credits_remaining = self.credits_remaining.saturating_sub(cost);
    }
}

/// One successful synthesis call
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    /// Concatenated audio chunks (MP3)
    pub audio: Vec<u8>,
    pub credits_charged: u64,
    /// The text that was voiced, kept for display alongside playback
    pub source_text: String,
}

/// Result of one orchestrated request
///
/// The generated text survives a synthesis failure; only audio is withheld.
#[derive(Debug)]
pub struct ContentOutcome {
    pub text: String,
    pub audio: Option<SynthesisResult>,
    pub audio_error: Option<crate::core::errors::StudioError>,
}

/// Phases of a single orchestrated request, terminal on first failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Idle,
    PromptBuilt,
    TextGenerated,
    AudioRequested,
    Done,
    Failed,
}

impl fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestPhase::Idle => write!(f, "idle"),
            RequestPhase::PromptBuilt => write!(f, "prompt_built"),
            RequestPhase::TextGenerated => write!(f, "text_generated"),
            RequestPhase::AudioRequested => write!(f, "audio_requested"),
            RequestPhase::Done => write!(f, "done"),
            RequestPhase::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_budget_by_content_type() {
        assert_eq!(ContentType::Joke.max_tokens(), 150);
        assert_eq!(ContentType::Story.max_tokens(), 300);
    }

    #[test]
    fn test_language_round_trip() {
        assert_eq!("hindi".parse::<Language>().unwrap(), Language::Hindi);
        assert_eq!("English".parse::<Language>().unwrap(), Language::English);
        assert!("french".parse::<Language>().is_err());
        assert_eq!(Language::Hindi.to_string(), "Hindi");
    }

    #[test]
    fn test_joke_request_defaults() {
        let request = ContentRequest::joke(
            Language::English,
            JokeStyle::Pun,
            "cats",
            LengthHint::Short,
        );
        assert_eq!(request.content_type, ContentType::Joke);
        assert_eq!(request.voice, "Rachel");
        assert_eq!(request.length, Some(LengthHint::Short));
    }

    #[test]
    fn test_story_request_has_no_joke_fields() {
        let request = ContentRequest::story(Language::Hindi, "a mysterious door in the forest")
            .with_voice("Prabhat");
        assert_eq!(request.style, None);
        assert_eq!(request.length, None);
        assert_eq!(request.voice, "Prabhat");
    }

    #[test]
    fn test_quota_state_debit() {
        let mut state = QuotaState::new(100);
        assert!(state.can_reserve(100));
        state.debit(30);
        assert_eq!(state.credits_used, 30);
        assert_eq!(state.credits_remaining, 70);
        assert!(!state.can_reserve(71));
    }
}
