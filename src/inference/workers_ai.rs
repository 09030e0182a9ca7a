// Cloudflare Workers AI implementation.
//
// Calls the REST equivalent of the Workers AI binding:
//   POST {base}/accounts/{account_id}/ai/run/{model}
// with a bearer token. Responses arrive wrapped in the standard
// Cloudflare API envelope ({result, success, errors}); only the
// inner result is handed back to callers.
//
// API docs: https://developers.cloudflare.com/api/resources/ai/

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::traits::InferenceBackend;

/// Workers AI REST backend.
pub struct WorkersAiBackend {
    client: Client,
    base_url: String,
    account_id: String,
    api_token: String,
}

impl WorkersAiBackend {
    /// Create a new Workers AI backend for the given account.
    pub fn new(base_url: String, account_id: String, api_token: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            account_id,
            api_token,
        }
    }
}

#[async_trait]
impl InferenceBackend for WorkersAiBackend {
    async fn invoke(&self, model: &str, payload: Value) -> Result<Value> {
        let url = format!(
            "{}/accounts/{}/ai/run/{}",
            self.base_url, self.account_id, model
        );

        debug!(model = model, "Invoking Workers AI model");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .context("Failed to call Workers AI")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Workers AI returned {}: {}", status, body);
        }

        let envelope: ApiEnvelope = response
            .json()
            .await
            .context("Failed to parse Workers AI response")?;

        if !envelope.success {
            let messages: Vec<&str> = envelope.errors.iter().map(|e| e.message.as_str()).collect();
            anyhow::bail!("Workers AI model run failed: {}", messages.join("; "));
        }

        Ok(envelope.result)
    }
}

// --- Cloudflare API envelope types ---

#[derive(Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}
