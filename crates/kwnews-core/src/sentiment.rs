use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sentiment label '{0}'; expected positive, negative, or neutral")]
pub struct ParseSentimentLabelError(pub String);

impl FromStr for SentimentLabel {
    type Err = ParseSentimentLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            _ => Err(ParseSentimentLabelError(s.to_string())),
        }
    }
}

/// Sentiment verdict for one piece of text.
///
/// Scores lie in `[0, 1]` and sum to 1 (within rounding) or are all zero.
/// `label` is the strict argmax of the scores, `neutral` on ties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub confidence: f64,
    pub positive_score: f64,
    pub negative_score: f64,
    pub neutral_score: f64,
}

impl SentimentResult {
    /// The verdict for text with no lexical evidence at all.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            confidence: 0.0,
            positive_score: 0.0,
            negative_score: 0.0,
            neutral_score: 0.0,
        }
    }
}
