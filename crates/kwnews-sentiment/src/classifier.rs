//! Keyword-count sentiment classification.

use kwnews_core::{normalize_text, SentimentLabel, SentimentResult};

use crate::error::SentimentError;
use crate::lexicon::Lexicon;

/// Confidence below which [`display_label`] reports a verdict as neutral.
const DISPLAY_CONFIDENCE_FLOOR: f64 = 0.3;

/// A sentiment strategy. Implementations must be deterministic and safe to
/// share across tasks.
pub trait SentimentClassifier: Send + Sync {
    /// Short identifier reported by status endpoints.
    fn name(&self) -> &str;

    fn classify(&self, text: &str) -> SentimentResult;

    fn classify_batch(&self, texts: &[String]) -> Vec<SentimentResult> {
        texts.iter().map(|t| self.classify(t)).collect()
    }
}

/// Rule-based classifier counting keyword occurrences per sentiment set.
///
/// Every non-overlapping occurrence of each term counts once; distinct terms
/// that overlap one another (e.g. `실패` inside a longer term) are counted
/// independently, and a term listed twice in a set counts twice. Scores are
/// the per-set share of all matches.
#[derive(Debug, Clone, Default)]
pub struct KeywordClassifier {
    lexicon: Lexicon,
}

impl KeywordClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a classifier from custom term lists.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError`] if the lexicon contains blank terms or no
    /// terms at all.
    pub fn with_lexicon(
        positive: Vec<String>,
        negative: Vec<String>,
        neutral: Vec<String>,
    ) -> Result<Self, SentimentError> {
        Ok(Self {
            lexicon: Lexicon::new(positive, negative, neutral)?,
        })
    }

    #[must_use]
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }
}

impl SentimentClassifier for KeywordClassifier {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn classify(&self, text: &str) -> SentimentResult {
        let text = normalize_text(text).to_lowercase();
        if text.is_empty() {
            return SentimentResult::zero();
        }

        let positive = count_matches(&text, &self.lexicon.positive);
        let negative = count_matches(&text, &self.lexicon.negative);
        let neutral = count_matches(&text, &self.lexicon.neutral);
        let total = positive + negative + neutral;
        if total == 0 {
            return SentimentResult::zero();
        }

        let share = |count: usize| -> f64 {
            #[allow(clippy::cast_precision_loss)]
            let ratio = count as f64 / total as f64;
            ratio
        };
        let positive_score = share(positive);
        let negative_score = share(negative);
        let neutral_score = share(neutral);

        let (label, confidence) = if positive > negative && positive > neutral {
            (SentimentLabel::Positive, positive_score)
        } else if negative > positive && negative > neutral {
            (SentimentLabel::Negative, negative_score)
        } else {
            (SentimentLabel::Neutral, neutral_score)
        };

        SentimentResult {
            label,
            confidence: round3(confidence),
            positive_score: round3(positive_score),
            negative_score: round3(negative_score),
            neutral_score: round3(neutral_score),
        }
    }
}

/// Korean display label for reports: `긍정`, `부정`, or `중립`.
///
/// Verdicts with confidence under 0.3 are shown as `중립` regardless of label.
#[must_use]
pub fn display_label(result: &SentimentResult) -> &'static str {
    if result.confidence < DISPLAY_CONFIDENCE_FLOOR {
        return "중립";
    }
    match result.label {
        SentimentLabel::Positive => "긍정",
        SentimentLabel::Negative => "부정",
        SentimentLabel::Neutral => "중립",
    }
}

fn count_matches(text: &str, terms: &[String]) -> usize {
    terms.iter().map(|term| text.matches(term.as_str()).count()).sum()
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
#[path = "classifier_test.rs"]
mod tests;
