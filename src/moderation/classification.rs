// Text classification — prompt an instruction model for a JSON verdict.
//
// The model is asked to answer with a strict JSON object, but chat models
// routinely wrap their answer in prose. The parser grabs the first
// brace-delimited substring and falls back to a keyword heuristic when
// even that fails — classification never fails outward. The substring
// extraction is deliberately private to this module so a stricter
// structured-output contract can replace it without touching the
// orchestrator.

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::inference::InferenceBackend;

/// The fixed-shape classification record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: String,
    pub confidence: f64,
    #[serde(rename = "isSpam")]
    pub is_spam: bool,
}

/// Classification feature path: prompt build, model invocation, parse.
pub struct Classifier {
    backend: Arc<dyn InferenceBackend>,
    model: String,
}

impl Classifier {
    pub fn new(backend: Arc<dyn InferenceBackend>, model: String) -> Self {
        Self { backend, model }
    }

    pub async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let prompt = build_classification_prompt(text);

        let raw = self
            .backend
            .invoke(&self.model, json!({ "prompt": prompt, "max_tokens": 100 }))
            .await?;

        // Text-generation models answer under a `response` key; tolerate
        // a bare string too.
        let completion = match &raw {
            Value::String(s) => s.as_str(),
            _ => raw.get("response").and_then(Value::as_str).unwrap_or(""),
        };

        Ok(parse_classification_response(completion))
    }
}

fn build_classification_prompt(text: &str) -> String {
    format!(
        "Analyze the following text and classify it. Respond ONLY with a JSON object in this exact format:\n\
         {{\"category\": \"one of: spam, legitimate, promotional, informational, social\", \"confidence\": 0.0-1.0, \"isSpam\": true/false}}\n\
         \n\
         Text to analyze: \"{text}\"\n\
         \n\
         JSON Response:"
    )
}

/// Parse a model completion into a `ClassificationResult`. Best effort:
/// JSON substring first, keyword heuristic second, never an error.
pub fn parse_classification_response(response: &str) -> ClassificationResult {
    if let Some(candidate) = extract_json_object(response) {
        if let Ok(parsed) = serde_json::from_str::<Value>(candidate) {
            return ClassificationResult {
                category: parsed
                    .get("category")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
                confidence: parsed.get("confidence").and_then(Value::as_f64).unwrap_or(0.5),
                is_spam: parsed.get("isSpam").and_then(Value::as_bool).unwrap_or(false),
            };
        }
    }

    // Heuristic fallback: the model answered in prose.
    let lower = response.to_lowercase();
    let is_spam = lower.contains("spam") || lower.contains("promotional");

    ClassificationResult {
        category: if is_spam { "spam" } else { "legitimate" }.to_string(),
        confidence: 0.6,
        is_spam,
    }
}

/// First `{` through last `}` — the greedy brace span a chat model's
/// prose-wrapped JSON answer lives in.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}
