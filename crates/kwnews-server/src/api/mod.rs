mod articles;
mod news;
mod sentiment;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use kwnews_collector::MultiQueryCollector;
use kwnews_db::PgArticleStore;
use kwnews_sentiment::SentimentClassifier;
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId};

const MAX_RESULTS_CEILING: usize = 1_000;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub store: PgArticleStore,
    /// `None` when Naver credentials are not configured; harvest routes then
    /// answer `service_unavailable`.
    pub collector: Option<Arc<MultiQueryCollector>>,
    pub classifier: Arc<dyn SentimentClassifier>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        collector: Option<MultiQueryCollector>,
        classifier: Arc<dyn SentimentClassifier>,
    ) -> Self {
        Self {
            store: PgArticleStore::new(pool.clone()),
            pool,
            collector: collector.map(Arc::new),
            classifier,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
    harvester: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "service_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn normalize_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Clamp a caller-supplied harvest size into `1..=1000`.
pub(super) fn normalize_max_results(max_results: Option<usize>, default: usize) -> usize {
    max_results.unwrap_or(default).clamp(1, MAX_RESULTS_CEILING)
}

pub(super) fn map_db_error(request_id: String, error: &kwnews_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

/// The configured collector, or a `service_unavailable` error.
pub(super) fn require_collector(
    state: &AppState,
    request_id: &str,
) -> Result<Arc<MultiQueryCollector>, ApiError> {
    state.collector.clone().ok_or_else(|| {
        ApiError::new(
            request_id,
            "service_unavailable",
            "news harvesting is disabled: NAVER_CLIENT_ID / NAVER_CLIENT_SECRET are not set",
        )
    })
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

fn news_router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/news", get(news::get_news))
        .route("/api/v1/news/kwater", get(news::get_kwater_news))
        .route(
            "/api/v1/news/kwater/with-sentiment",
            get(news::get_kwater_news_with_sentiment),
        )
        .route(
            "/api/v1/news/with-sentiment",
            get(news::get_news_with_sentiment),
        )
        .route("/api/v1/news/extensive", get(news::get_news_extensive))
        .route(
            "/api/v1/news/extensive/with-sentiment",
            get(news::get_news_extensive_with_sentiment),
        )
        .route(
            "/api/v1/news/collect-and-save",
            post(news::collect_and_save_news),
        )
        .route("/api/v1/news/db", get(articles::list_stored_news))
        .route("/api/v1/news/search", get(articles::search_stored_news))
        .route("/api/v1/news/db/stats", get(articles::news_stats))
        .route("/api/v1/news/stats", get(articles::news_stats))
        .route("/api/v1/harvest-runs", get(articles::list_harvest_runs))
}

fn sentiment_router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/sentiment/analyze", post(sentiment::analyze))
        .route(
            "/api/v1/sentiment/analyze-batch",
            post(sentiment::analyze_batch),
        )
        .route("/api/v1/sentiment/status", get(sentiment::status))
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .merge(news_router())
        .merge(sentiment_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let harvester = if state.collector.is_some() {
        "ok"
    } else {
        "disabled"
    };

    match kwnews_db::ping(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                    harvester,
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                        harvester,
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
