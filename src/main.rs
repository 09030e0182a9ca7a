use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use cinder::config::Config;
use cinder::inference::{InferenceBackend, WorkersAiBackend};
use cinder::moderation::{resolve_features, Feature, ModerationOptions, Moderator};
use cinder::web::{run_server, AppState};

/// Cinder: AI-assisted text moderation API.
///
/// Fans one piece of text out across sentiment analysis, classification
/// and summarization models and merges the results into one response.
#[derive(Parser)]
#[command(name = "cinder", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the moderation API server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8787")]
        port: u16,

        /// Address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },

    /// Moderate a single text from the command line and print the result
    Moderate {
        /// The text to moderate
        text: String,

        /// Features to run (sentiment, classification, summarization, all)
        #[arg(long, value_delimiter = ',')]
        features: Vec<String>,

        /// Summary length cap
        #[arg(long)]
        max_length: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cinder=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            config.require_backend()?;

            let backend = backend_from(&config);
            let state = AppState {
                moderator: Arc::new(Moderator::new(backend, &config)),
                config: Arc::new(config),
            };

            run_server(state, port, &bind).await?;
        }

        Commands::Moderate {
            text,
            features,
            max_length,
        } => {
            let config = Config::load()?;
            config.require_backend()?;

            let requested = features
                .iter()
                .map(|name| Feature::from_str(name))
                .collect::<Result<Vec<_>>>()?;
            let selected = resolve_features(if requested.is_empty() {
                None
            } else {
                Some(requested.as_slice())
            });

            info!(features = ?selected, "Running one-shot moderation");

            let moderator = Moderator::new(backend_from(&config), &config);
            let options = ModerationOptions { max_length };
            let outcome = moderator.run(&text, &selected, &options).await?;

            println!("{}", serde_json::to_string_pretty(&outcome.results)?);
            info!(elapsed_ms = outcome.processing_time_ms, "Done");
        }
    }

    Ok(())
}

fn backend_from(config: &Config) -> Arc<dyn InferenceBackend> {
    Arc::new(WorkersAiBackend::new(
        config.api_base_url.clone(),
        config.account_id.clone(),
        config.api_token.clone(),
    ))
}
