// Moderation subsystem — feature selection, per-feature normalizers,
// and the orchestrator that fans a request out across them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod classification;
pub mod orchestrator;
pub mod sentiment;
pub mod summarization;

pub use orchestrator::{ModerationOutcome, ModerationResults, Moderator};

/// One moderation dimension a request can ask for.
///
/// `All` is a request-side sentinel that expands to the three concrete
/// features at selection time; it never appears in a resolved set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Sentiment,
    Classification,
    Summarization,
    All,
}

/// The three concrete features in canonical execution order.
pub const ALL_FEATURES: [Feature; 3] = [
    Feature::Sentiment,
    Feature::Classification,
    Feature::Summarization,
];

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Sentiment => "sentiment",
            Feature::Classification => "classification",
            Feature::Summarization => "summarization",
            Feature::All => "all",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sentiment" => Ok(Feature::Sentiment),
            "classification" => Ok(Feature::Classification),
            "summarization" => Ok(Feature::Summarization),
            "all" => Ok(Feature::All),
            other => anyhow::bail!(
                "Unknown feature '{other}' (expected sentiment, classification, summarization or all)"
            ),
        }
    }
}

/// Resolve a request's feature list to the concrete set to run.
///
/// Absent, empty, or containing the `all` sentinel means everything.
/// Otherwise the requested subset, deduplicated, in canonical order.
/// Never fails.
pub fn resolve_features(requested: Option<&[Feature]>) -> Vec<Feature> {
    match requested {
        None => ALL_FEATURES.to_vec(),
        Some(list) if list.is_empty() || list.contains(&Feature::All) => ALL_FEATURES.to_vec(),
        Some(list) => ALL_FEATURES
            .iter()
            .copied()
            .filter(|f| list.contains(f))
            .collect(),
    }
}

/// A validated moderation request. Immutable once the validation gate
/// has produced it.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationRequest {
    pub text: String,
    #[serde(default)]
    pub features: Option<Vec<Feature>>,
    #[serde(default)]
    pub options: Option<ModerationOptions>,
}

/// Per-request knobs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationOptions {
    /// Summary length cap; falls back to the configured default (150)
    pub max_length: Option<usize>,
}
