use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::SentimentResult;

/// A harvested news article. `url` is the natural key across queries and runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    /// Normalized summary text (the search API's `description`).
    pub content: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
}

impl Article {
    /// Text handed to sentiment classifiers: title and content joined by a space.
    #[must_use]
    pub fn classification_text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }
}

/// An article paired with an optional sentiment verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedArticle {
    #[serde(flatten)]
    pub article: Article,
    pub sentiment: Option<SentimentResult>,
}
