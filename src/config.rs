use std::env;

use anyhow::Result;

/// Model identifiers for the three moderation features.
///
/// Defaults are the Workers AI catalog entries the service was built
/// against; each can be overridden via environment variable if the
/// catalog moves on.
#[derive(Debug, Clone)]
pub struct ModelIds {
    pub sentiment: String,
    pub classification: String,
    pub summarization: String,
}

impl Default for ModelIds {
    fn default() -> Self {
        Self {
            sentiment: "@cf/huggingface/distilbert-sst-2-int8".to_string(),
            classification: "@cf/meta/llama-2-7b-chat-int8".to_string(),
            summarization: "@cf/facebook/bart-large-cnn".to_string(),
        }
    }
}

/// Length thresholds for validation and the summarization gate.
/// All of these count Unicode characters, not bytes.
#[derive(Debug, Clone)]
pub struct Limits {
    /// Minimum accepted `text` length
    pub min_text_length: usize,
    /// Maximum accepted `text` length
    pub max_text_length: usize,
    /// Default summary length when the request doesn't specify one
    pub max_summary_length: usize,
    /// Texts at or below this length skip summarization entirely
    pub summarize_threshold: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_text_length: 10,
            max_text_length: 5000,
            max_summary_length: 150,
            summarize_threshold: 500,
        }
    }
}

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy. The loaded struct
/// is immutable and injected into the orchestrator — no module-level
/// state anywhere.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Cloudflare account the Workers AI REST calls run against
    pub account_id: String,
    /// API token with Workers AI permission
    pub api_token: String,
    /// Base URL for the Cloudflare API (override for local testing)
    pub api_base_url: String,
    pub models: ModelIds,
    pub limits: Limits,
}

pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default except the Cloudflare credentials, which
    /// are only checked when a command actually needs the backend
    /// (see `require_backend`).
    pub fn load() -> Result<Self> {
        let models = ModelIds {
            sentiment: env::var("CINDER_SENTIMENT_MODEL")
                .unwrap_or_else(|_| ModelIds::default().sentiment),
            classification: env::var("CINDER_CLASSIFICATION_MODEL")
                .unwrap_or_else(|_| ModelIds::default().classification),
            summarization: env::var("CINDER_SUMMARIZATION_MODEL")
                .unwrap_or_else(|_| ModelIds::default().summarization),
        };

        Ok(Self {
            account_id: env::var("CLOUDFLARE_ACCOUNT_ID").unwrap_or_default(),
            api_token: env::var("CLOUDFLARE_API_TOKEN").unwrap_or_default(),
            api_base_url: env::var("CINDER_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            models,
            limits: Limits::default(),
        })
    }

    /// Check that the Workers AI credentials are configured.
    /// Call this before any operation that invokes a model.
    pub fn require_backend(&self) -> Result<()> {
        if self.account_id.is_empty() {
            anyhow::bail!(
                "CLOUDFLARE_ACCOUNT_ID not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        if self.api_token.is_empty() {
            anyhow::bail!(
                "CLOUDFLARE_API_TOKEN not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        Ok(())
    }
}
