use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use kwnews_collector::tag_articles;
use kwnews_core::{Article, TaggedArticle};
use serde::{Deserialize, Serialize};

use crate::harvest::{run_tracked_collection, TrackedRun, Trigger};
use crate::middleware::RequestId;

use super::{
    map_db_error, normalize_max_results, require_collector, ApiError, ApiResponse, AppState,
};

const DEFAULT_QUERY: &str = "kwater OR 한국수자원공사";

#[derive(Debug, Deserialize)]
pub(super) struct NewsQuery {
    pub query: Option<String>,
    pub max_results: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ExtensiveQuery {
    pub max_results: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CollectRequest {
    pub max_results: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(super) struct NewsData {
    /// `None` for extensive (multi-query) collections.
    pub query: Option<String>,
    pub count: usize,
    pub articles: Vec<Article>,
}

#[derive(Debug, Serialize)]
pub(super) struct TaggedNewsData {
    pub query: Option<String>,
    pub count: usize,
    pub sentiment_distribution: BTreeMap<String, usize>,
    pub articles: Vec<TaggedArticle>,
}

fn resolve_query(query: Option<String>, request_id: &str) -> Result<String, ApiError> {
    let query = query.unwrap_or_else(|| DEFAULT_QUERY.to_string());
    if query.trim().is_empty() {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            "query must not be blank",
        ));
    }
    Ok(query)
}

fn sentiment_distribution(articles: &[TaggedArticle]) -> BTreeMap<String, usize> {
    let mut distribution = BTreeMap::new();
    for tagged in articles {
        if let Some(sentiment) = &tagged.sentiment {
            *distribution
                .entry(sentiment.label.as_str().to_string())
                .or_insert(0) += 1;
        }
    }
    distribution
}

fn tagged_data(
    query: Option<String>,
    articles: Vec<Article>,
    state: &AppState,
) -> TaggedNewsData {
    let articles = tag_articles(articles, state.classifier.as_ref());
    TaggedNewsData {
        query,
        count: articles.len(),
        sentiment_distribution: sentiment_distribution(&articles),
        articles,
    }
}

pub(super) async fn get_news(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<NewsQuery>,
) -> Result<Json<ApiResponse<NewsData>>, ApiError> {
    let collector = require_collector(&state, &req_id.0)?;
    let query = resolve_query(params.query, &req_id.0)?;
    let max_results = normalize_max_results(params.max_results, 100);

    let articles = collector.collect(&query, max_results).await;

    Ok(Json(ApiResponse::new(
        NewsData {
            query: Some(query),
            count: articles.len(),
            articles,
        },
        req_id.0,
    )))
}

/// Single-query harvest pinned to the default K-water query.
pub(super) async fn get_kwater_news(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ExtensiveQuery>,
) -> Result<Json<ApiResponse<NewsData>>, ApiError> {
    let collector = require_collector(&state, &req_id.0)?;
    let max_results = normalize_max_results(params.max_results, 50);

    let articles = collector.collect(DEFAULT_QUERY, max_results).await;

    Ok(Json(ApiResponse::new(
        NewsData {
            query: Some(DEFAULT_QUERY.to_string()),
            count: articles.len(),
            articles,
        },
        req_id.0,
    )))
}

/// [`get_kwater_news`] with every article sentiment-tagged.
pub(super) async fn get_kwater_news_with_sentiment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ExtensiveQuery>,
) -> Result<Json<ApiResponse<TaggedNewsData>>, ApiError> {
    let collector = require_collector(&state, &req_id.0)?;
    let max_results = normalize_max_results(params.max_results, 30);

    let articles = collector.collect(DEFAULT_QUERY, max_results).await;
    let data = tagged_data(Some(DEFAULT_QUERY.to_string()), articles, &state);

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn get_news_with_sentiment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<NewsQuery>,
) -> Result<Json<ApiResponse<TaggedNewsData>>, ApiError> {
    let collector = require_collector(&state, &req_id.0)?;
    let query = resolve_query(params.query, &req_id.0)?;
    let max_results = normalize_max_results(params.max_results, 50);

    let articles = collector.collect(&query, max_results).await;
    let data = tagged_data(Some(query), articles, &state);

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn get_news_extensive(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ExtensiveQuery>,
) -> Result<Json<ApiResponse<NewsData>>, ApiError> {
    let collector = require_collector(&state, &req_id.0)?;
    let max_results = normalize_max_results(params.max_results, 500);

    let articles = collector.collect_extensive(max_results).await;

    Ok(Json(ApiResponse::new(
        NewsData {
            query: None,
            count: articles.len(),
            articles,
        },
        req_id.0,
    )))
}

pub(super) async fn get_news_extensive_with_sentiment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ExtensiveQuery>,
) -> Result<Json<ApiResponse<TaggedNewsData>>, ApiError> {
    let collector = require_collector(&state, &req_id.0)?;
    let max_results = normalize_max_results(params.max_results, 200);

    let articles = collector.collect_extensive(max_results).await;
    let data = tagged_data(None, articles, &state);

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn collect_and_save_news(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CollectRequest>,
) -> Result<Json<ApiResponse<TrackedRun>>, ApiError> {
    let collector = require_collector(&state, &req_id.0)?;
    let max_results = normalize_max_results(body.max_results, 100);

    let run = run_tracked_collection(
        &state.store,
        &collector,
        state.classifier.as_ref(),
        max_results,
        Trigger::Api,
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(run, req_id.0)))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use kwnews_core::{SentimentLabel, SentimentResult};

    use super::*;

    fn tagged(label: Option<SentimentLabel>) -> TaggedArticle {
        TaggedArticle {
            article: Article {
                title: "댐".to_string(),
                content: String::new(),
                url: "https://x/1".to_string(),
                published_at: Utc::now(),
            },
            sentiment: label.map(|label| SentimentResult {
                label,
                ..SentimentResult::zero()
            }),
        }
    }

    #[test]
    fn resolve_query_defaults_and_rejects_blank() {
        assert_eq!(resolve_query(None, "r").unwrap(), DEFAULT_QUERY);
        assert_eq!(resolve_query(Some("댐".to_string()), "r").unwrap(), "댐");
        assert!(resolve_query(Some("  ".to_string()), "r").is_err());
    }

    #[test]
    fn distribution_counts_labels() {
        let articles = vec![
            tagged(Some(SentimentLabel::Positive)),
            tagged(Some(SentimentLabel::Positive)),
            tagged(Some(SentimentLabel::Negative)),
            tagged(None),
        ];
        let distribution = sentiment_distribution(&articles);
        assert_eq!(distribution.get("positive"), Some(&2));
        assert_eq!(distribution.get("negative"), Some(&1));
        assert_eq!(distribution.get("neutral"), None);
    }
}
