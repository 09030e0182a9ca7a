// Moderation orchestrator — concurrent fan-out across the selected
// features with an all-succeed-or-fail join.
//
// Each feature path is an independent async call sharing only the
// immutable input text; there is no cross-branch state. If any branch
// fails, the whole run fails and no partial result escapes. No retries
// and no timeout here — upstream call behavior governs.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::inference::InferenceBackend;
use crate::moderation::classification::{ClassificationResult, Classifier};
use crate::moderation::sentiment::{SentimentAnalyzer, SentimentResult};
use crate::moderation::summarization::{SummarizationResult, Summarizer};
use crate::moderation::{Feature, ModerationOptions};

/// Per-feature results for one request. Only features that actually
/// executed carry a value, and only those keys are serialized.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModerationResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<ClassificationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summarization: Option<SummarizationResult>,
}

/// What one orchestration run produced, plus how long it took.
#[derive(Debug, Clone)]
pub struct ModerationOutcome {
    pub results: ModerationResults,
    pub processing_time_ms: u64,
}

/// Fans one request out across the per-feature services.
pub struct Moderator {
    sentiment: SentimentAnalyzer,
    classifier: Classifier,
    summarizer: Summarizer,
}

impl Moderator {
    /// Build a moderator over the given backend, wiring each feature
    /// service to its configured model.
    pub fn new(backend: Arc<dyn InferenceBackend>, config: &Config) -> Self {
        Self {
            sentiment: SentimentAnalyzer::new(backend.clone(), config.models.sentiment.clone()),
            classifier: Classifier::new(backend.clone(), config.models.classification.clone()),
            summarizer: Summarizer::new(
                backend,
                config.models.summarization.clone(),
                config.limits.max_summary_length,
                config.limits.summarize_threshold,
            ),
        }
    }

    /// Run the selected features against `text` concurrently.
    ///
    /// Summarization is skipped even when selected unless the text clears
    /// the length gate. Wall-clock elapsed time is measured across the
    /// whole join for the response metadata.
    pub async fn run(
        &self,
        text: &str,
        features: &[Feature],
        options: &ModerationOptions,
    ) -> Result<ModerationOutcome> {
        let started = Instant::now();

        let sentiment_fut = async {
            if features.contains(&Feature::Sentiment) {
                self.sentiment.analyze(text).await.map(Some)
            } else {
                Ok(None)
            }
        };

        let classification_fut = async {
            if features.contains(&Feature::Classification) {
                self.classifier.classify(text).await.map(Some)
            } else {
                Ok(None)
            }
        };

        let summarization_fut = async {
            if features.contains(&Feature::Summarization) && self.summarizer.should_summarize(text)
            {
                self.summarizer
                    .summarize(text, options.max_length)
                    .await
                    .map(Some)
            } else {
                Ok(None)
            }
        };

        let (sentiment, classification, summarization) =
            futures::future::try_join3(sentiment_fut, classification_fut, summarization_fut)
                .await?;

        let processing_time_ms = started.elapsed().as_millis() as u64;

        debug!(
            elapsed_ms = processing_time_ms,
            features = ?features,
            "Moderation run complete"
        );

        Ok(ModerationOutcome {
            results: ModerationResults {
                sentiment,
                classification,
                summarization,
            },
            processing_time_ms,
        })
    }
}
