//! The `ArticleStore` contract and its value types.

use std::collections::BTreeMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use kwnews_core::{Article, SentimentLabel, SentimentResult};
use serde::Serialize;
use uuid::Uuid;

use crate::DbError;

/// Bucket name used for articles stored without a sentiment verdict.
pub const UNKNOWN_SENTIMENT: &str = "unknown";

/// Outcome of an upsert keyed on `url`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Inserted,
    /// A row with the same URL already existed and was updated in place.
    Duplicate,
}

/// An article as persisted, with storage-assigned identity and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredArticle {
    #[serde(skip)]
    pub id: i64,
    pub public_id: Uuid,
    #[serde(flatten)]
    pub article: Article,
    pub sentiment: Option<SentimentResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Conjunctive filter over stored articles. `None` fields do not constrain.
///
/// Keyword fields match case-insensitively as substrings; `keyword` matches
/// either title or content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    pub keyword: Option<String>,
    pub title_keyword: Option<String>,
    pub content_keyword: Option<String>,
    pub sentiment: Option<SentimentLabel>,
    pub published_after: Option<DateTime<Utc>>,
    pub published_before: Option<DateTime<Utc>>,
}

impl ArticleFilter {
    /// Whether `stored` satisfies every set field of the filter.
    #[must_use]
    pub fn matches(&self, stored: &StoredArticle) -> bool {
        let title = stored.article.title.to_lowercase();
        let content = stored.article.content.to_lowercase();
        let contains = |haystack: &str, needle: Option<&str>| {
            needle.is_none_or(|n| haystack.contains(&n.to_lowercase()))
        };

        let keyword_ok = self.keyword.as_deref().is_none_or(|k| {
            let k = k.to_lowercase();
            title.contains(&k) || content.contains(&k)
        });

        keyword_ok
            && contains(&title, self.title_keyword.as_deref())
            && contains(&content, self.content_keyword.as_deref())
            && self
                .sentiment
                .is_none_or(|label| stored.sentiment.as_ref().is_some_and(|s| s.label == label))
            && self
                .published_after
                .is_none_or(|after| stored.article.published_at >= after)
            && self
                .published_before
                .is_none_or(|before| stored.article.published_at <= before)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

/// One page of query results plus the unpaged match count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticlePage {
    pub total_count: i64,
    pub articles: Vec<StoredArticle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleStats {
    pub total: i64,
    /// Articles published within the last seven days.
    pub recent_7_days: i64,
    pub sentiment_distribution: BTreeMap<String, i64>,
    pub oldest_published_at: Option<DateTime<Utc>>,
    pub newest_published_at: Option<DateTime<Utc>>,
}

/// Durable article storage keyed on URL.
///
/// Implementations apply `created_at` / `updated_at` themselves; upserting an
/// existing URL updates the row and never creates a second one.
pub trait ArticleStore: Send + Sync {
    fn upsert_by_url(
        &self,
        article: &Article,
        sentiment: Option<&SentimentResult>,
    ) -> impl Future<Output = Result<UpsertOutcome, DbError>> + Send;

    /// Matching articles ordered by `published_at DESC, id DESC`.
    fn query(
        &self,
        filter: &ArticleFilter,
        page: PageRequest,
    ) -> impl Future<Output = Result<ArticlePage, DbError>> + Send;

    /// Row counts per sentiment label; unclassified rows count under `unknown`.
    fn aggregate_by_sentiment(
        &self,
    ) -> impl Future<Output = Result<BTreeMap<String, i64>, DbError>> + Send;

    fn stats(&self) -> impl Future<Output = Result<ArticleStats, DbError>> + Send;
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn stored(title: &str, content: &str, label: Option<SentimentLabel>) -> StoredArticle {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        StoredArticle {
            id: 1,
            public_id: Uuid::new_v4(),
            article: Article {
                title: title.to_string(),
                content: content.to_string(),
                url: "https://x/1".to_string(),
                published_at: now,
            },
            sentiment: label.map(|label| SentimentResult {
                label,
                confidence: 1.0,
                positive_score: 0.0,
                negative_score: 0.0,
                neutral_score: 1.0,
            }),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(ArticleFilter::default().matches(&stored("a", "b", None)));
    }

    #[test]
    fn keyword_matches_title_or_content_case_insensitively() {
        let filter = ArticleFilter {
            keyword: Some("K-WATER".to_string()),
            ..ArticleFilter::default()
        };
        assert!(filter.matches(&stored("k-water 발표", "", None)));
        assert!(filter.matches(&stored("", "K-water 사업", None)));
        assert!(!filter.matches(&stored("댐", "수도", None)));
    }

    #[test]
    fn sentiment_filter_excludes_unclassified_rows() {
        let filter = ArticleFilter {
            sentiment: Some(SentimentLabel::Neutral),
            ..ArticleFilter::default()
        };
        assert!(filter.matches(&stored("a", "b", Some(SentimentLabel::Neutral))));
        assert!(!filter.matches(&stored("a", "b", Some(SentimentLabel::Positive))));
        assert!(!filter.matches(&stored("a", "b", None)));
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let article = stored("a", "b", None);
        let at = article.article.published_at;
        let filter = ArticleFilter {
            published_after: Some(at),
            published_before: Some(at),
            ..ArticleFilter::default()
        };
        assert!(filter.matches(&article));
    }

    #[test]
    fn stored_article_serializes_without_internal_id() {
        let value = serde_json::to_value(stored("a", "b", None)).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["url"], "https://x/1");
        assert!(value["public_id"].is_string());
    }
}
