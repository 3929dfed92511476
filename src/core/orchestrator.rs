//! Request orchestration: prompt templating, generation, voice-over

use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::config::StudioConfig;
use crate::core::errors::{Result, StudioError};
use crate::core::generator::TextGenerator;
use crate::core::models::{
    ContentOutcome, ContentRequest, ContentType, QuotaState, RequestPhase,
};
use crate::core::quota::QuotaLedger;
use crate::core::speech::SpeechSynthesizer;
use crate::core::voices;

/// Composes the text generator and the speech synthesizer for one request
/// at a time, terminal on first failure
#[derive(Debug, Clone)]
pub struct ContentOrchestrator {
    generator: TextGenerator,
    synthesizer: SpeechSynthesizer,
}

impl ContentOrchestrator {
    /// Create an orchestrator with a fresh ledger sized from the config
    pub fn new(config: StudioConfig) -> Result<Self> {
        config.validate()?;

        let config = Arc::new(config);
        let ledger = QuotaLedger::new(config.max_credits);
        let generator = TextGenerator::new(Arc::clone(&config))?;
        let synthesizer = SpeechSynthesizer::new(config, ledger)?;

        Ok(Self {
            generator,
            synthesizer,
        })
    }

    /// Create from environment configuration
    pub fn from_env() -> Result<Self> {
        Self::new(StudioConfig::from_env()?)
    }

    /// The session ledger
    pub fn ledger(&self) -> &QuotaLedger {
        self.synthesizer.ledger()
    }

    /// Refresh the ledger from the provider; callers fall back to the local
    /// budget when this fails
    pub async fn refresh_quota(&self) -> Result<QuotaState> {
        self.synthesizer.refresh_quota().await
    }

    /// Build the prompt for a request
    pub fn build_prompt(request: &ContentRequest) -> String {
        match request.content_type {
            ContentType::Joke => {
                let style = request.style.unwrap_or_default();
                let length = request.length.unwrap_or_default();
                format!(
                    "Create a {length} {language} {style} joke about {topic}.\n\n\
                     Requirements:\n\
                     - Style: {style} humor\n\
                     - Length: {length} ({guidance})\n\
                     - Must be funny and appropriate\n\
                     - Include emoji if suitable",
                    length = length,
                    language = request.language,
                    style = style,
                    topic = request.subject,
                    guidance = length.guidance(),
                )
            }
            ContentType::Story => format!(
                "Write a concise {language} story about {idea}.\n\n\
                 Guidelines:\n\
                 - 3 short paragraphs max\n\
                 - Include character and setting\n\
                 - Have a clear beginning, middle, and end\n\
                 - Use simple language",
                language = request.language,
                idea = request.subject,
            ),
        }
    }

    /// Generate text only, without touching the speech quota
    pub async fn create_text_only(&self, request: &ContentRequest) -> Result<String> {
        let prompt = Self::build_prompt(request);
        debug!(phase = %RequestPhase::PromptBuilt, content_type = %request.content_type, "Prompt built");

        self.generator
            .generate(&prompt, request.content_type.max_tokens())
            .await
    }

    /// Run one request end to end
    ///
    /// Text generation failure fails the whole request. A synthesis failure
    /// does not discard the generated text; it is returned alongside the
    /// error so the caller can still display it.
    pub async fn create(&self, request: &ContentRequest) -> Result<ContentOutcome> {
        let prompt = Self::build_prompt(request);
        debug!(phase = %RequestPhase::PromptBuilt, content_type = %request.content_type, "Prompt built");

        let text = match self
            .generator
            .generate(&prompt, request.content_type.max_tokens())
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(phase = %RequestPhase::Failed, "Text generation failed: {}", e);
                return Err(e);
            }
        };
        debug!(phase = %RequestPhase::TextGenerated, chars = text.chars().count(), "Text generated");

        let voice = match voices::resolve(request.language, &request.voice) {
            Some(voice) => voice,
            None => {
                let e = StudioError::InvalidRequest {
                    message: format!(
                        "no {} voice named '{}'",
                        request.language, request.voice
                    ),
                };
                warn!(phase = %RequestPhase::Failed, "{}", e);
                return Ok(ContentOutcome {
                    text,
                    audio: None,
                    audio_error: Some(e),
                });
            }
        };

        debug!(phase = %RequestPhase::AudioRequested, voice_id = %voice.voice_id, "Requesting audio");
        match self.synthesizer.synthesize(&text, &voice).await {
            Ok(audio) => {
                debug!(phase = %RequestPhase::Done, charged = audio.credits_charged, "Request complete");
                Ok(ContentOutcome {
                    text,
                    audio: Some(audio),
                    audio_error: None,
                })
            }
            Err(e) => {
                warn!(phase = %RequestPhase::Failed, "Synthesis failed: {}", e);
                Ok(ContentOutcome {
                    text,
                    audio: None,
                    audio_error: Some(e),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{JokeStyle, Language, LengthHint};

    #[test]
    fn test_joke_prompt_carries_all_constraints() {
        let request = ContentRequest::joke(
            Language::English,
            JokeStyle::Pun,
            "cats",
            LengthHint::Short,
        );
        let prompt = ContentOrchestrator::build_prompt(&request);

        assert!(prompt.starts_with("Create a Short English Pun joke about cats."));
        assert!(prompt.contains("Style: Pun humor"));
        assert!(prompt.contains("Length: Short (1-2 lines)"));
        assert!(prompt.contains("Include emoji if suitable"));
    }

    #[test]
    fn test_medium_joke_prompt_guidance() {
        let request = ContentRequest::joke(
            Language::Hindi,
            JokeStyle::Observational,
            "traffic",
            LengthHint::Medium,
        );
        let prompt = ContentOrchestrator::build_prompt(&request);

        assert!(prompt.contains("Medium Hindi Observational joke about traffic"));
        assert!(prompt.contains("(3-4 lines)"));
    }

    #[test]
    fn test_story_prompt_structure() {
        let request = ContentRequest::story(Language::English, "a mysterious door in the forest");
        let prompt = ContentOrchestrator::build_prompt(&request);

        assert!(
            prompt.starts_with("Write a concise English story about a mysterious door in the forest.")
        );
        assert!(prompt.contains("3 short paragraphs max"));
        assert!(prompt.contains("beginning, middle, and end"));
        assert!(prompt.contains("Use simple language"));
        assert!(!prompt.contains("emoji"));
    }

    #[test]
    fn test_orchestrator_rejects_unconfigured_session() {
        let config = StudioConfig {
            text_api_key: String::new(),
            speech_api_key: "k".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            ContentOrchestrator::new(config),
            Err(StudioError::ConfigurationMissing { .. })
        ));
    }

    mod end_to_end {
        use super::*;
        use axum::extract::Path;
        use axum::http::StatusCode;
        use axum::routing::{get, post};
        use axum::Router;
        use std::sync::Mutex;

        use crate::core::quota::QuotaLedger;

        const JOKE: &str =
            "Why did the cat sit on the computer? To keep an eye on the mouse! 😹";
        const STORY: &str = "Asha found a door deep in the forest. Behind it lay her own garden, \
                             seen from the other side. She stepped through and walked home smiling.";

        /// In-process stand-in for both providers
        struct MockProvider {
            base_url: String,
            voice_calls: Arc<Mutex<Vec<String>>>,
        }

        async fn spawn_provider(
            text: &'static str,
            tts_status: StatusCode,
            tts_body: &'static [u8],
        ) -> MockProvider {
            let voice_calls = Arc::new(Mutex::new(Vec::new()));
            let calls = Arc::clone(&voice_calls);

            let app = Router::new()
                .route(
                    "/v1/chat/completions",
                    post(move || async move {
                        axum::Json(serde_json::json!({
                            "choices": [{"message": {"content": text}}]
                        }))
                    }),
                )
                .route(
                    "/v1/user/subscription",
                    get(|| async {
                        axum::Json(serde_json::json!({
                            "character_limit": 10_000,
                            "character_count": 1_500
                        }))
                    }),
                )
                .route(
                    "/v1/text-to-speech/:voice_id",
                    post(move |Path(voice_id): Path<String>| {
                        let calls = Arc::clone(&calls);
                        async move {
                            calls.lock().unwrap().push(voice_id);
                            (tts_status, tts_body)
                        }
                    }),
                );

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            MockProvider {
                base_url: format!("http://{}", addr),
                voice_calls,
            }
        }

        fn studio_for(provider: &MockProvider) -> ContentOrchestrator {
            let config = StudioConfig {
                text_api_key: "test_text_key".to_string(),
                speech_api_key: "test_speech_key".to_string(),
                text_endpoint: format!("{}/v1/chat/completions", provider.base_url),
                speech_endpoint: provider.base_url.clone(),
                ..Default::default()
            };
            ContentOrchestrator::new(config).unwrap()
        }

        #[tokio::test]
        async fn test_joke_request_end_to_end() {
            let provider = spawn_provider(JOKE, StatusCode::OK, b"mp3-bytes").await;
            let studio = studio_for(&provider);

            let request = ContentRequest::joke(
                Language::English,
                JokeStyle::Pun,
                "cats",
                LengthHint::Short,
            );
            let outcome = studio.create(&request).await.unwrap();

            assert_eq!(outcome.text, JOKE);
            let audio = outcome.audio.expect("audio should be produced");
            assert_eq!(audio.audio, b"mp3-bytes");
            assert_eq!(audio.credits_charged, QuotaLedger::estimate_cost(JOKE));
            assert_eq!(audio.source_text, JOKE);

            // The default English speaker is Rachel
            assert_eq!(
                *provider.voice_calls.lock().unwrap(),
                vec!["EXAVITQu4vr4xnSDxMaL".to_string()]
            );

            let state = studio.ledger().snapshot().await;
            assert_eq!(state.credits_used, audio.credits_charged);
            assert_eq!(state.credits_remaining, 10_000 - audio.credits_charged);
        }

        #[tokio::test]
        async fn test_story_text_survives_quota_exhaustion() {
            let provider = spawn_provider(
                STORY,
                StatusCode::UNAUTHORIZED,
                br#"{"detail":{"status":"quota_exceeded","message":"This request exceeds your quota. You have 0 credits remaining."}}"#,
            )
            .await;
            let studio = studio_for(&provider);

            let request = ContentRequest::story(Language::Hindi, "a mysterious door in the forest");
            let outcome = studio.create(&request).await.unwrap();

            // The generated story is still delivered; only audio is withheld
            assert_eq!(outcome.text, STORY);
            assert!(outcome.audio.is_none());
            assert!(matches!(
                outcome.audio_error,
                Some(StudioError::QuotaExceeded { .. })
            ));

            // The provider's authoritative balance replaced the local estimate
            assert_eq!(studio.ledger().remaining().await, 0);

            // The default Hindi speaker is Shweta
            assert_eq!(
                *provider.voice_calls.lock().unwrap(),
                vec!["XB0fDUnXU5powFXDhCwa".to_string()]
            );
        }

        #[tokio::test]
        async fn test_refresh_quota_overwrites_local_budget() {
            let provider = spawn_provider(JOKE, StatusCode::OK, b"mp3-bytes").await;
            let studio = studio_for(&provider);

            let state = studio.refresh_quota().await.unwrap();
            assert_eq!(state.credits_used, 1_500);
            assert_eq!(state.credits_remaining, 8_500);

            let snapshot = studio.ledger().snapshot().await;
            assert_eq!(snapshot.credits_remaining, 8_500);
        }

        #[tokio::test]
        async fn test_unknown_voice_fails_before_synthesis() {
            let provider = spawn_provider(JOKE, StatusCode::OK, b"mp3-bytes").await;
            let studio = studio_for(&provider);

            let request = ContentRequest::joke(
                Language::English,
                JokeStyle::Pun,
                "cats",
                LengthHint::Short,
            )
            .with_voice("Shweta");
            let outcome = studio.create(&request).await.unwrap();

            assert_eq!(outcome.text, JOKE);
            assert!(matches!(
                outcome.audio_error,
                Some(StudioError::InvalidRequest { .. })
            ));
            // No synthesis call was issued for the unknown speaker
            assert!(provider.voice_calls.lock().unwrap().is_empty());
        }
    }
}
