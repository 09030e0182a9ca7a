// Summarization — invocation, extraction precedence, and the length gate.
//
// Summarization is the only feature with a cost gate: short texts are not
// worth a model call, so callers consult should_summarize before invoking
// (the orchestrator enforces this).

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::inference::InferenceBackend;

/// The fixed-shape summarization record.
///
/// `summary` is trimmed and `summary_length` always equals its char count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizationResult {
    pub summary: String,
    pub original_length: usize,
    pub summary_length: usize,
}

/// Summarization feature path.
pub struct Summarizer {
    backend: Arc<dyn InferenceBackend>,
    model: String,
    default_max_length: usize,
    summarize_threshold: usize,
}

impl Summarizer {
    pub fn new(
        backend: Arc<dyn InferenceBackend>,
        model: String,
        default_max_length: usize,
        summarize_threshold: usize,
    ) -> Self {
        Self {
            backend,
            model,
            default_max_length,
            summarize_threshold,
        }
    }

    pub async fn summarize(
        &self,
        text: &str,
        max_length: Option<usize>,
    ) -> Result<SummarizationResult> {
        let limit = max_length.unwrap_or(self.default_max_length);

        let raw = self
            .backend
            .invoke(
                &self.model,
                json!({ "input_text": text, "max_length": limit }),
            )
            .await?;

        normalize_summary(&raw, text, limit)
    }

    /// Whether `text` is long enough to be worth summarizing.
    pub fn should_summarize(&self, text: &str) -> bool {
        text.chars().count() > self.summarize_threshold
    }
}

/// Extract the summary string from a raw summarization response.
///
/// Precedence: the object's `summary` field, then its `text` field (a
/// present field of the wrong type is a shape error), then the raw value
/// itself when it is a plain string. An object with neither field falls
/// back to truncating the input text to the limit. Anything else is a
/// shape error.
pub fn normalize_summary(raw: &Value, text: &str, limit: usize) -> Result<SummarizationResult> {
    let summary: String = match raw {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            if let Some(field) = map.get("summary").or_else(|| map.get("text")) {
                field
                    .as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| anyhow::anyhow!("Invalid summarization response"))?
            } else {
                truncate_chars(text, limit)
            }
        }
        _ => anyhow::bail!("Invalid summarization response"),
    };

    let summary = summary.trim().to_string();
    let summary_length = summary.chars().count();

    Ok(SummarizationResult {
        summary,
        original_length: text.chars().count(),
        summary_length,
    })
}

/// Truncate to at most `limit` characters without splitting a code point.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
