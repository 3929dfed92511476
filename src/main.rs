//! Main entry point for the Banter Studio CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod core;
mod server;

use cli::commands::Commands;

/// Banter Studio - AI jokes & stories with voice-over
#[derive(Parser, Debug)]
#[command(name = "banter", version, about, long_about = None)]
struct Args {
    /// Text-generation API key (optional, defaults to GROQ_API_KEY env var)
    #[arg(long)]
    text_api_key: Option<String>,

    /// Speech-synthesis API key (optional, defaults to ELEVENLABS_API_KEY env var)
    #[arg(long)]
    speech_api_key: Option<String>,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    format!("banter={},banter_studio={}", log_level, log_level).into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Session-entered keys override the environment
    if let Some(key) = args.text_api_key {
        std::env::set_var("GROQ_API_KEY", key);
    }

    if let Some(key) = args.speech_api_key {
        std::env::set_var("ELEVENLABS_API_KEY", key);
    }

    // Execute command
    match args.command {
        Some(Commands::Joke {
            language,
            voice,
            style,
            topic,
            length,
            output,
            no_audio,
        }) => {
            cli::commands::handle_joke(language, voice, style, topic, length, output, no_audio)
                .await?;
        }
        Some(Commands::Story {
            language,
            voice,
            idea,
            output,
            no_audio,
        }) => {
            cli::commands::handle_story(language, voice, idea, output, no_audio).await?;
        }
        Some(Commands::Quota) => {
            cli::commands::handle_quota().await?;
        }
        Some(Commands::Voices) => {
            cli::commands::handle_voices().await?;
        }
        Some(Commands::Server { host, port }) => {
            cli::commands::handle_server(host, port).await?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
