//! CLI command definitions and handlers

use clap::Subcommand;
use std::path::PathBuf;

use crate::core::models::{ContentRequest, ContentType, JokeStyle, Language, LengthHint};

/// Commands for Banter Studio
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a joke and voice it
    Joke {
        /// Content language
        #[arg(short, long, default_value = "english")]
        language: Language,

        /// Speaker name from the voice catalog (default: first for the language)
        #[arg(short, long)]
        voice: Option<String>,

        /// Humor style: pun, situational or observational
        #[arg(short, long, default_value = "pun")]
        style: JokeStyle,

        /// Joke topic
        #[arg(short, long, default_value = "everyday life")]
        topic: String,

        /// Output length: short (1-2 lines) or medium (3-4 lines)
        #[arg(long, default_value = "short")]
        length: LengthHint,

        /// Where to write the MP3 (default: joke.mp3)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip voice-over, print the text only
        #[arg(long)]
        no_audio: bool,
    },

    /// Generate a story and voice it
    Story {
        /// Content language
        #[arg(short, long, default_value = "english")]
        language: Language,

        /// Speaker name from the voice catalog (default: first for the language)
        #[arg(short, long)]
        voice: Option<String>,

        /// Story idea
        #[arg(short, long, default_value = "a mysterious door in the forest")]
        idea: String,

        /// Where to write the MP3 (default: story.mp3)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip voice-over, print the text only
        #[arg(long)]
        no_audio: bool,
    },

    /// Show the speech provider's credit balance
    Quota,

    /// List catalog voices
    Voices,

    /// Start HTTP API server
    Server {
        /// Bind address (default: 0.0.0.0)
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Listen port (default: 8000)
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
}

/// Handle the joke command
pub async fn handle_joke(
    language: Language,
    voice: Option<String>,
    style: JokeStyle,
    topic: String,
    length: LengthHint,
    output: Option<PathBuf>,
    no_audio: bool,
) -> anyhow::Result<()> {
    let mut request = ContentRequest::joke(language, style, topic, length);
    if let Some(voice) = voice {
        request = request.with_voice(voice);
    }

    run_request(request, output, no_audio, "Crafting your joke...").await
}

/// Handle the story command
pub async fn handle_story(
    language: Language,
    voice: Option<String>,
    idea: String,
    output: Option<PathBuf>,
    no_audio: bool,
) -> anyhow::Result<()> {
    let mut request = ContentRequest::story(language, idea);
    if let Some(voice) = voice {
        request = request.with_voice(voice);
    }

    run_request(request, output, no_audio, "Writing your story...").await
}

/// Run one request end to end and deliver its results to the terminal
async fn run_request(
    request: ContentRequest,
    output: Option<PathBuf>,
    no_audio: bool,
    spinner_message: &str,
) -> anyhow::Result<()> {
    use crate::core::orchestrator::ContentOrchestrator;
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Duration;
    use tracing::warn;

    let studio = ContentOrchestrator::from_env()?;

    // One refresh at session start; unreachable balance falls back to the
    // default local budget
    if let Err(e) = studio.refresh_quota().await {
        warn!("{}; using local budget", e);
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(spinner_message.to_string());

    if no_audio {
        let text = studio.create_text_only(&request).await?;
        spinner.finish_and_clear();
        println!("{}", text);
        return Ok(());
    }

    let outcome = studio.create(&request).await?;
    spinner.finish_and_clear();

    // The text is always delivered, with or without audio
    println!("{}\n", outcome.text);

    if let Some(result) = outcome.audio {
        let path = output.unwrap_or_else(|| default_output(request.content_type));
        write_audio(&path, &result.audio)?;

        let state = studio.ledger().snapshot().await;
        println!(
            "Audio written to {} - used {} credits ({} remaining)",
            path.display(),
            result.credits_charged,
            state.credits_remaining
        );
    }

    if let Some(e) = outcome.audio_error {
        return Err(e.into());
    }

    Ok(())
}

/// Default audio path per content type
fn default_output(content_type: ContentType) -> PathBuf {
    PathBuf::from(format!("{}.mp3", content_type))
}

/// Write the audio buffer to disk
fn write_audio(path: &std::path::Path, audio: &[u8]) -> anyhow::Result<()> {
    std::fs::write(path, audio)?;
    Ok(())
}

/// Handle the quota command
pub async fn handle_quota() -> anyhow::Result<()> {
    use crate::core::orchestrator::ContentOrchestrator;

    let studio = ContentOrchestrator::from_env()?;

    let state = match studio.refresh_quota().await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("{}; showing local budget", e);
            studio.ledger().snapshot().await
        }
    };

    println!("Credits used:      {}", state.credits_used);
    println!("Credits remaining: {}", state.credits_remaining);
    println!("Session ceiling:   {}", state.max_credits);

    Ok(())
}

/// Handle the voices command
pub async fn handle_voices() -> anyhow::Result<()> {
    use crate::core::voices;

    for (language, name, profile) in voices::catalog() {
        println!(
            "{:<8} {:<8} {} (stability {})",
            language.to_string(),
            name,
            profile.voice_id,
            profile.stability
        );
    }

    Ok(())
}

/// Handle the server command
pub async fn handle_server(host: String, port: u16) -> anyhow::Result<()> {
    crate::server::api::run_server(host, port).await
}
