//! HTTP API server implementation
//!
//! JSON surface for browser clients: generated text always comes back, with
//! base64 audio attached when synthesis succeeded and the audio error
//! attached when it did not.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::errors::StudioError;
use crate::core::models::{
    ContentOutcome, ContentRequest, JokeStyle, Language, LengthHint, QuotaState,
};
use crate::core::orchestrator::ContentOrchestrator;
use crate::core::voices;

/// Application state
#[derive(Clone)]
pub struct AppState {
    studio: ContentOrchestrator,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

/// Joke creation request
#[derive(Deserialize)]
pub struct JokeRequest {
    #[serde(default = "default_language")]
    pub language: Language,
    pub voice: Option<String>,
    #[serde(default)]
    pub style: JokeStyle,
    pub topic: String,
    #[serde(default)]
    pub length: LengthHint,
    /// Set false to skip voice-over
    #[serde(default = "default_audio")]
    pub audio: bool,
}

/// Story creation request
#[derive(Deserialize)]
pub struct StoryRequest {
    #[serde(default = "default_language")]
    pub language: Language,
    pub voice: Option<String>,
    pub idea: String,
    #[serde(default = "default_audio")]
    pub audio: bool,
}

fn default_language() -> Language {
    Language::English
}

fn default_audio() -> bool {
    true
}

/// Generated content response; text is present even when audio failed
#[derive(Serialize)]
pub struct ContentResponse {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits_charged: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_error: Option<String>,
}

/// Voice catalog entry
#[derive(Serialize)]
pub struct VoiceInfo {
    pub language: Language,
    pub name: String,
    pub voice_id: String,
    pub stability: f32,
}

/// Voice catalog response
#[derive(Serialize)]
pub struct VoicesResponse {
    pub voices: Vec<VoiceInfo>,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error payload
#[derive(Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
}

/// Map a studio error to an HTTP status and a stable type tag
fn error_parts(e: &StudioError) -> (StatusCode, &'static str) {
    match e {
        StudioError::ConfigurationMissing { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
        }
        StudioError::InsufficientCredits { .. } => {
            (StatusCode::PAYMENT_REQUIRED, "insufficient_credits")
        }
        StudioError::QuotaExceeded { .. } => (StatusCode::PAYMENT_REQUIRED, "quota_exceeded"),
        StudioError::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
        StudioError::GenerationError { .. } => (StatusCode::BAD_GATEWAY, "generation_error"),
        StudioError::SynthesisError { .. } => (StatusCode::BAD_GATEWAY, "synthesis_error"),
        StudioError::RemoteUnavailable { .. } => (StatusCode::BAD_GATEWAY, "quota_unavailable"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "api_error"),
    }
}

fn error_response(e: &StudioError) -> (StatusCode, axum::Json<ErrorResponse>) {
    let (status, r#type) = error_parts(e);
    (
        status,
        axum::Json(ErrorResponse {
            error: ErrorDetail {
                message: e.to_string(),
                r#type: r#type.to_string(),
            },
        }),
    )
}

/// Build the JSON body for an orchestrated outcome
fn content_response(outcome: ContentOutcome) -> ContentResponse {
    let (audio_base64, credits_charged) = match &outcome.audio {
        Some(result) => (
            Some(BASE64.encode(&result.audio)),
            Some(result.credits_charged),
        ),
        None => (None, None),
    };

    ContentResponse {
        text: outcome.text,
        audio_base64,
        credits_charged,
        audio_error: outcome.audio_error.map(|e| e.to_string()),
    }
}

/// Health check handler
async fn health_check() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "ok".to_string(),
        service: "banter-studio".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Current credit balance; falls back to the local ledger when the provider
/// is unreachable
async fn get_quota(State(state): State<Arc<AppState>>) -> axum::Json<QuotaState> {
    let quota = match state.studio.refresh_quota().await {
        Ok(quota) => quota,
        Err(e) => {
            warn!("{}; serving local budget", e);
            state.studio.ledger().snapshot().await
        }
    };

    axum::Json(quota)
}

/// Voice catalog handler
async fn get_voices() -> axum::Json<VoicesResponse> {
    let voices = voices::catalog()
        .into_iter()
        .map(|(language, name, profile)| VoiceInfo {
            language,
            name: name.to_string(),
            voice_id: profile.voice_id,
            stability: profile.stability,
        })
        .collect();

    axum::Json(VoicesResponse { voices })
}

/// Joke creation handler
async fn create_joke(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<JokeRequest>,
) -> Result<axum::Json<ContentResponse>, (StatusCode, axum::Json<ErrorResponse>)> {
    if payload.topic.trim().is_empty() {
        let e = StudioError::InvalidRequest {
            message: "topic cannot be empty".to_string(),
        };
        return Err(error_response(&e));
    }

    let mut request = ContentRequest::joke(
        payload.language,
        payload.style,
        payload.topic,
        payload.length,
    );
    if let Some(voice) = payload.voice {
        request = request.with_voice(voice);
    }

    run_content(&state.studio, request, payload.audio).await
}

/// Story creation handler
async fn create_story(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<StoryRequest>,
) -> Result<axum::Json<ContentResponse>, (StatusCode, axum::Json<ErrorResponse>)> {
    if payload.idea.trim().is_empty() {
        let e = StudioError::InvalidRequest {
            message: "idea cannot be empty".to_string(),
        };
        return Err(error_response(&e));
    }

    let mut request = ContentRequest::story(payload.language, payload.idea);
    if let Some(voice) = payload.voice {
        request = request.with_voice(voice);
    }

    run_content(&state.studio, request, payload.audio).await
}

/// Shared create path for both content types
async fn run_content(
    studio: &ContentOrchestrator,
    request: ContentRequest,
    audio: bool,
) -> Result<axum::Json<ContentResponse>, (StatusCode, axum::Json<ErrorResponse>)> {
    if !audio {
        let text = studio
            .create_text_only(&request)
            .await
            .map_err(|e| error_response(&e))?;
        return Ok(axum::Json(ContentResponse {
            text,
            audio_base64: None,
            credits_charged: None,
            audio_error: None,
        }));
    }

    match studio.create(&request).await {
        Ok(outcome) => Ok(axum::Json(content_response(outcome))),
        Err(e) => {
            warn!("Request failed: {}", e);
            Err(error_response(&e))
        }
    }
}

/// Run the HTTP server
pub async fn run_server(host: String, port: u16) -> anyhow::Result<()> {
    // Create the studio
    let studio = ContentOrchestrator::from_env()?;

    // One quota refresh at startup; the local budget stands if it fails
    if let Err(e) = studio.refresh_quota().await {
        warn!("{}; using local budget", e);
    }

    let state = Arc::new(AppState { studio });

    // Create router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/v1/quota", get(get_quota))
        .route("/v1/voices", get(get_voices))
        .route("/v1/jokes", post(create_joke))
        .route("/v1/stories", post(create_story))
        .with_state(state);

    // Bind address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
