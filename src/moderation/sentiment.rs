// Sentiment analysis — invocation plus shape-tolerant normalization.
//
// The sentiment model family is the worst offender for response-shape
// drift: depending on model and host version the same call can return a
// bare record, an array of records, or an object wrapping an array under
// a `results` key. normalize_sentiment accepts all three and collapses
// them into one fixed-shape result.

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::inference::InferenceBackend;

/// Normalized sentiment verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

/// The fixed-shape sentiment record.
///
/// `score` is rounded to 4 decimal places and `confidence` is
/// `round(score * 100)` of the rounded score, so the two always agree
/// on the serialized record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub score: f64,
    pub confidence: u32,
}

/// Sentiment feature path: one model invocation, then normalization.
pub struct SentimentAnalyzer {
    backend: Arc<dyn InferenceBackend>,
    model: String,
}

impl SentimentAnalyzer {
    pub fn new(backend: Arc<dyn InferenceBackend>, model: String) -> Self {
        Self { backend, model }
    }

    pub async fn analyze(&self, text: &str) -> Result<SentimentResult> {
        let raw = self
            .backend
            .invoke(&self.model, json!({ "text": text }))
            .await?;

        normalize_sentiment(&raw)
    }
}

/// Normalize a raw sentiment response into a `SentimentResult`.
///
/// Candidate extraction: an array is taken as-is; an object with a
/// `results` array contributes that array; any other object is a single
/// candidate. Among candidates carrying a numeric `score`, the highest
/// wins (first wins ties); with no scored candidate the first one is
/// used. Missing label defaults to NEUTRAL, missing score to 0.5.
///
/// Idempotent: feeding an already-normalized record back through yields
/// the same label, score and confidence.
pub fn normalize_sentiment(raw: &Value) -> Result<SentimentResult> {
    let candidates: Vec<&Value> = match raw {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => match map.get("results") {
            Some(Value::Array(items)) => items.iter().collect(),
            _ => vec![raw],
        },
        _ => anyhow::bail!("Invalid sentiment analysis response format"),
    };

    if candidates.is_empty() {
        anyhow::bail!("Empty sentiment analysis response");
    }

    // Pick the scored candidate with the strictly highest score so the
    // first occurrence wins ties, matching original response order.
    let mut top: Option<(&Value, f64)> = None;
    for &candidate in &candidates {
        if !candidate.is_object() {
            continue;
        }
        if let Some(score) = candidate.get("score").and_then(Value::as_f64) {
            match top {
                Some((_, best)) if score <= best => {}
                _ => top = Some((candidate, score)),
            }
        }
    }

    let selected = top.map(|(c, _)| c).unwrap_or(candidates[0]);

    if !selected.is_object() {
        anyhow::bail!("Invalid sentiment analysis response");
    }

    let label = normalize_label(selected.get("label").and_then(Value::as_str).unwrap_or("NEUTRAL"));
    let score = round4(selected.get("score").and_then(Value::as_f64).unwrap_or(0.5));
    let confidence = (score * 100.0).round() as u32;

    Ok(SentimentResult {
        label,
        score,
        confidence,
    })
}

/// Map a raw model label onto the three-way verdict.
/// Matches by substring after uppercasing, so "positive", "LABEL_POSITIVE"
/// and "Very Positive" all land on POSITIVE.
fn normalize_label(label: &str) -> SentimentLabel {
    let upper = label.to_uppercase();
    if upper.contains("POSITIVE") {
        SentimentLabel::Positive
    } else if upper.contains("NEGATIVE") {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
