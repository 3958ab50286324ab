//! In-process [`ArticleStore`] for tests and dry runs.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use kwnews_core::{Article, SentimentResult};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{
    ArticleFilter, ArticlePage, ArticleStats, ArticleStore, PageRequest, StoredArticle,
    UpsertOutcome, UNKNOWN_SENTIMENT,
};
use crate::DbError;

#[derive(Debug, Default)]
pub struct MemoryArticleStore {
    rows: RwLock<Vec<StoredArticle>>,
}

impl MemoryArticleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

impl ArticleStore for MemoryArticleStore {
    async fn upsert_by_url(
        &self,
        article: &Article,
        sentiment: Option<&SentimentResult>,
    ) -> Result<UpsertOutcome, DbError> {
        let now = Utc::now();
        let mut rows = self.rows.write().await;

        if let Some(existing) = rows.iter_mut().find(|r| r.article.url == article.url) {
            existing.article = article.clone();
            if let Some(sentiment) = sentiment {
                existing.sentiment = Some(sentiment.clone());
            }
            existing.updated_at = now;
            return Ok(UpsertOutcome::Duplicate);
        }

        let id = rows.last().map_or(1, |r| r.id + 1);
        rows.push(StoredArticle {
            id,
            public_id: Uuid::new_v4(),
            article: article.clone(),
            sentiment: sentiment.cloned(),
            created_at: now,
            updated_at: now,
        });
        Ok(UpsertOutcome::Inserted)
    }

    async fn query(
        &self,
        filter: &ArticleFilter,
        page: PageRequest,
    ) -> Result<ArticlePage, DbError> {
        let rows = self.rows.read().await;
        let mut matched: Vec<&StoredArticle> = rows.iter().filter(|r| filter.matches(r)).collect();
        matched.sort_by(|a, b| {
            b.article
                .published_at
                .cmp(&a.article.published_at)
                .then(b.id.cmp(&a.id))
        });

        let total_count = i64::try_from(matched.len()).unwrap_or(i64::MAX);
        let offset = usize::try_from(page.offset).unwrap_or(0);
        let limit = usize::try_from(page.limit).unwrap_or(0);
        let articles = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(ArticlePage {
            total_count,
            articles,
        })
    }

    async fn aggregate_by_sentiment(&self) -> Result<BTreeMap<String, i64>, DbError> {
        let rows = self.rows.read().await;
        let mut counts = BTreeMap::new();
        for row in rows.iter() {
            let key = row
                .sentiment
                .as_ref()
                .map_or(UNKNOWN_SENTIMENT, |s| s.label.as_str());
            *counts.entry(key.to_string()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn stats(&self) -> Result<ArticleStats, DbError> {
        let cutoff = Utc::now() - Duration::days(7);
        let sentiment_distribution = self.aggregate_by_sentiment().await?;
        let rows = self.rows.read().await;

        let count = |n: usize| i64::try_from(n).unwrap_or(i64::MAX);
        Ok(ArticleStats {
            total: count(rows.len()),
            recent_7_days: count(
                rows.iter()
                    .filter(|r| r.article.published_at >= cutoff)
                    .count(),
            ),
            sentiment_distribution,
            oldest_published_at: rows.iter().map(|r| r.article.published_at).min(),
            newest_published_at: rows.iter().map(|r| r.article.published_at).max(),
        })
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
