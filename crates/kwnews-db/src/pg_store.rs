//! Postgres-backed [`ArticleStore`].

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use kwnews_core::{Article, SentimentLabel, SentimentResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::{
    ArticleFilter, ArticlePage, ArticleStats, ArticleStore, PageRequest, StoredArticle,
    UpsertOutcome, UNKNOWN_SENTIMENT,
};
use crate::DbError;

const ARTICLE_COLUMNS: &str = "id, public_id, title, content, url, published_at, \
     sentiment_label, sentiment_confidence, positive_score, negative_score, neutral_score, \
     created_at, updated_at";

// Shared WHERE clause for `query`; $1..$6 bind the filter fields.
const FILTER_CLAUSE: &str = "($1::TEXT IS NULL OR title ILIKE $1 OR content ILIKE $1) \
     AND ($2::TEXT IS NULL OR title ILIKE $2) \
     AND ($3::TEXT IS NULL OR content ILIKE $3) \
     AND ($4::TEXT IS NULL OR sentiment_label = $4) \
     AND ($5::TIMESTAMPTZ IS NULL OR published_at >= $5) \
     AND ($6::TIMESTAMPTZ IS NULL OR published_at <= $6)";

/// A row from the `articles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ArticleRow {
    id: i64,
    public_id: Uuid,
    title: String,
    content: String,
    url: String,
    published_at: DateTime<Utc>,
    sentiment_label: Option<String>,
    sentiment_confidence: Option<Decimal>,
    positive_score: Option<Decimal>,
    negative_score: Option<Decimal>,
    neutral_score: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ArticleRow> for StoredArticle {
    type Error = DbError;

    fn try_from(row: ArticleRow) -> Result<Self, Self::Error> {
        let sentiment = match row.sentiment_label {
            Some(raw) => {
                let label = raw
                    .parse::<SentimentLabel>()
                    .map_err(|_| DbError::InvalidSentimentLabel(raw.clone()))?;
                Some(SentimentResult {
                    label,
                    confidence: decimal_to_score(row.sentiment_confidence),
                    positive_score: decimal_to_score(row.positive_score),
                    negative_score: decimal_to_score(row.negative_score),
                    neutral_score: decimal_to_score(row.neutral_score),
                })
            }
            None => None,
        };

        Ok(StoredArticle {
            id: row.id,
            public_id: row.public_id,
            article: Article {
                title: row.title,
                content: row.content,
                url: row.url,
                published_at: row.published_at,
            },
            sentiment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PgArticleStore {
    pool: PgPool,
}

impl PgArticleStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl ArticleStore for PgArticleStore {
    /// Insert the article or update the row that shares its URL.
    ///
    /// An update never clears a stored sentiment verdict: a `None` verdict
    /// keeps the existing one.
    async fn upsert_by_url(
        &self,
        article: &Article,
        sentiment: Option<&SentimentResult>,
    ) -> Result<UpsertOutcome, DbError> {
        let is_new: bool = sqlx::query_scalar(
            "INSERT INTO articles \
                 (public_id, title, content, url, published_at, sentiment_label, \
                  sentiment_confidence, positive_score, negative_score, neutral_score) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (url) DO UPDATE SET \
                 title                = EXCLUDED.title, \
                 content              = EXCLUDED.content, \
                 published_at         = EXCLUDED.published_at, \
                 sentiment_label      = COALESCE(EXCLUDED.sentiment_label, articles.sentiment_label), \
                 sentiment_confidence = COALESCE(EXCLUDED.sentiment_confidence, articles.sentiment_confidence), \
                 positive_score       = COALESCE(EXCLUDED.positive_score, articles.positive_score), \
                 negative_score       = COALESCE(EXCLUDED.negative_score, articles.negative_score), \
                 neutral_score        = COALESCE(EXCLUDED.neutral_score, articles.neutral_score), \
                 updated_at           = NOW() \
             RETURNING (xmax = 0) AS is_new",
        )
        .bind(Uuid::new_v4())
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.url)
        .bind(article.published_at)
        .bind(sentiment.map(|s| s.label.as_str()))
        .bind(sentiment.map(|s| score_to_decimal(s.confidence)))
        .bind(sentiment.map(|s| score_to_decimal(s.positive_score)))
        .bind(sentiment.map(|s| score_to_decimal(s.negative_score)))
        .bind(sentiment.map(|s| score_to_decimal(s.neutral_score)))
        .fetch_one(&self.pool)
        .await?;

        Ok(if is_new {
            UpsertOutcome::Inserted
        } else {
            UpsertOutcome::Duplicate
        })
    }

    async fn query(
        &self,
        filter: &ArticleFilter,
        page: PageRequest,
    ) -> Result<ArticlePage, DbError> {
        let keyword = filter.keyword.as_deref().map(like_pattern);
        let title_keyword = filter.title_keyword.as_deref().map(like_pattern);
        let content_keyword = filter.content_keyword.as_deref().map(like_pattern);
        let sentiment = filter.sentiment.map(SentimentLabel::as_str);

        let count_sql = format!("SELECT COUNT(*) FROM articles WHERE {FILTER_CLAUSE}");
        let total_count: i64 = sqlx::query_scalar(&count_sql)
            .bind(keyword.as_deref())
            .bind(title_keyword.as_deref())
            .bind(content_keyword.as_deref())
            .bind(sentiment)
            .bind(filter.published_after)
            .bind(filter.published_before)
            .fetch_one(&self.pool)
            .await?;

        let page_sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE {FILTER_CLAUSE} \
             ORDER BY published_at DESC, id DESC \
             LIMIT $7 OFFSET $8"
        );
        let rows = sqlx::query_as::<_, ArticleRow>(&page_sql)
            .bind(keyword.as_deref())
            .bind(title_keyword.as_deref())
            .bind(content_keyword.as_deref())
            .bind(sentiment)
            .bind(filter.published_after)
            .bind(filter.published_before)
            .bind(page.limit)
            .bind(page.offset.max(0))
            .fetch_all(&self.pool)
            .await?;

        let articles = rows
            .into_iter()
            .map(StoredArticle::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ArticlePage {
            total_count,
            articles,
        })
    }

    async fn aggregate_by_sentiment(&self) -> Result<BTreeMap<String, i64>, DbError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT COALESCE(sentiment_label, $1) AS label, COUNT(*) AS count \
             FROM articles \
             GROUP BY 1",
        )
        .bind(UNKNOWN_SENTIMENT)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn stats(&self) -> Result<ArticleStats, DbError> {
        let cutoff = Utc::now() - Duration::days(7);
        let (total, recent_7_days, oldest_published_at, newest_published_at): (
            i64,
            i64,
            Option<DateTime<Utc>>,
            Option<DateTime<Utc>>,
        ) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COUNT(*) FILTER (WHERE published_at >= $1), \
                    MIN(published_at), \
                    MAX(published_at) \
             FROM articles",
        )
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await?;

        let sentiment_distribution = self.aggregate_by_sentiment().await?;

        Ok(ArticleStats {
            total,
            recent_7_days,
            sentiment_distribution,
            oldest_published_at,
            newest_published_at,
        })
    }
}

/// Build an `ILIKE` substring pattern, escaping the wildcard characters in
/// user input.
fn like_pattern(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len() + 2);
    escaped.push('%');
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn score_to_decimal(score: f64) -> Decimal {
    Decimal::from_f64_retain(score)
        .unwrap_or_default()
        .round_dp(3)
}

fn decimal_to_score(value: Option<Decimal>) -> f64 {
    value.and_then(|d| d.to_f64()).unwrap_or(0.0)
}
