//! Lexical sentiment classification for Korean news text.
//!
//! Text is scored against three curated keyword sets (positive, negative,
//! neutral). The [`SentimentClassifier`] trait is the seam where alternative
//! strategies plug in; [`KeywordClassifier`] is the default.

pub mod classifier;
pub mod error;
pub mod lexicon;

pub use classifier::{display_label, KeywordClassifier, SentimentClassifier};
pub use error::SentimentError;
pub use lexicon::Lexicon;
