use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use kwnews_core::SentimentLabel;
use kwnews_db::{ArticleFilter, ArticleStats, ArticleStore, PageRequest, StoredArticle};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{
    map_db_error, normalize_limit, normalize_offset, ApiError, ApiResponse, AppState,
};

#[derive(Debug, Deserialize)]
pub(super) struct StoredNewsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub sentiment: Option<String>,
    pub days: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct SearchNewsQuery {
    pub keyword: Option<String>,
    pub title_keyword: Option<String>,
    pub content_keyword: Option<String>,
    pub sentiment: Option<String>,
    pub days: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct HarvestRunsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct ArticleListData {
    pub total_count: i64,
    pub limit: i64,
    pub offset: i64,
    pub articles: Vec<StoredArticle>,
}

#[derive(Debug, Serialize)]
pub(super) struct HarvestRunItem {
    pub run_id: Uuid,
    pub run_type: String,
    pub trigger_source: String,
    pub status: String,
    pub collected: i32,
    pub inserted: i32,
    pub duplicates: i32,
    pub errors: i32,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

fn validation_error(request_id: &str, message: impl Into<String>) -> ApiError {
    ApiError::new(request_id, "validation_error", message)
}

/// Blank query-string values are treated as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_sentiment(
    value: Option<String>,
    request_id: &str,
) -> Result<Option<SentimentLabel>, ApiError> {
    non_blank(value)
        .map(|raw| raw.parse::<SentimentLabel>())
        .transpose()
        .map_err(|e| validation_error(request_id, e.to_string()))
}

/// `days=0` means no date filter.
fn days_cutoff(days: Option<i64>, request_id: &str) -> Result<Option<DateTime<Utc>>, ApiError> {
    match days {
        None | Some(0) => Ok(None),
        Some(d) if (1..=3_650).contains(&d) => Ok(Some(Utc::now() - Duration::days(d))),
        Some(d) => Err(validation_error(
            request_id,
            format!("days must be between 0 and 3650, got {d}"),
        )),
    }
}

/// Accepts RFC 3339 timestamps or `YYYY-MM-DD` dates.
///
/// A bare date resolves to the start of that day for lower bounds and to its
/// last second for upper bounds.
fn parse_bound(
    value: &str,
    end_of_day: bool,
    field: &str,
    request_id: &str,
) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        validation_error(
            request_id,
            format!("{field} must be YYYY-MM-DD or RFC 3339, got '{value}'"),
        )
    })?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(|t| t.and_utc())
        .ok_or_else(|| validation_error(request_id, format!("{field} is out of range")))
}

fn search_filter(params: SearchNewsQuery, request_id: &str) -> Result<ArticleFilter, ApiError> {
    let days_after = days_cutoff(params.days, request_id)?;
    let start = non_blank(params.start_date)
        .map(|v| parse_bound(&v, false, "start_date", request_id))
        .transpose()?;
    let end = non_blank(params.end_date)
        .map(|v| parse_bound(&v, true, "end_date", request_id))
        .transpose()?;

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(validation_error(
                request_id,
                "start_date must not be after end_date",
            ));
        }
    }

    Ok(ArticleFilter {
        keyword: non_blank(params.keyword),
        title_keyword: non_blank(params.title_keyword),
        content_keyword: non_blank(params.content_keyword),
        sentiment: parse_sentiment(params.sentiment, request_id)?,
        published_after: days_after.max(start),
        published_before: end,
    })
}

async fn run_query(
    state: &AppState,
    filter: &ArticleFilter,
    limit: Option<i64>,
    offset: Option<i64>,
    request_id: String,
) -> Result<Json<ApiResponse<ArticleListData>>, ApiError> {
    let page = PageRequest {
        limit: normalize_limit(limit),
        offset: normalize_offset(offset),
    };
    let result = state
        .store
        .query(filter, page)
        .await
        .map_err(|e| map_db_error(request_id.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        ArticleListData {
            total_count: result.total_count,
            limit: page.limit,
            offset: page.offset,
            articles: result.articles,
        },
        request_id,
    )))
}

pub(super) async fn list_stored_news(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<StoredNewsQuery>,
) -> Result<Json<ApiResponse<ArticleListData>>, ApiError> {
    let filter = ArticleFilter {
        sentiment: parse_sentiment(params.sentiment, &req_id.0)?,
        published_after: days_cutoff(params.days, &req_id.0)?,
        ..ArticleFilter::default()
    };
    run_query(&state, &filter, params.limit, params.offset, req_id.0).await
}

pub(super) async fn search_stored_news(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<SearchNewsQuery>,
) -> Result<Json<ApiResponse<ArticleListData>>, ApiError> {
    let (limit, offset) = (params.limit, params.offset);
    let filter = search_filter(params, &req_id.0)?;
    run_query(&state, &filter, limit, offset, req_id.0).await
}

pub(super) async fn news_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ArticleStats>>, ApiError> {
    let stats = state
        .store
        .stats()
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(stats, req_id.0)))
}

pub(super) async fn list_harvest_runs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<HarvestRunsQuery>,
) -> Result<Json<ApiResponse<Vec<HarvestRunItem>>>, ApiError> {
    let rows = kwnews_db::list_harvest_runs(&state.pool, normalize_limit(params.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| HarvestRunItem {
            run_id: row.public_id,
            run_type: row.run_type,
            trigger_source: row.trigger_source,
            status: row.status,
            collected: row.collected,
            inserted: row.inserted,
            duplicates: row.duplicates,
            errors: row.errors,
            started_at: row.started_at,
            completed_at: row.completed_at,
            error_message: row.error_message,
        })
        .collect();

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn parse_sentiment_accepts_known_labels_and_ignores_blank() {
        assert_eq!(
            parse_sentiment(Some("Positive".to_string()), "r").unwrap(),
            Some(SentimentLabel::Positive)
        );
        assert_eq!(parse_sentiment(Some(String::new()), "r").unwrap(), None);
        assert!(parse_sentiment(Some("happy".to_string()), "r").is_err());
    }

    #[test]
    fn days_cutoff_treats_zero_as_unfiltered() {
        assert!(days_cutoff(None, "r").unwrap().is_none());
        assert!(days_cutoff(Some(0), "r").unwrap().is_none());
        assert!(days_cutoff(Some(7), "r").unwrap().is_some());
        assert!(days_cutoff(Some(-3), "r").is_err());
        assert!(days_cutoff(Some(3_651), "r").is_err());
    }

    #[test]
    fn bare_dates_expand_to_day_bounds() {
        let start = parse_bound("2024-05-06", false, "start_date", "r").unwrap();
        let end = parse_bound("2024-05-06", true, "end_date", "r").unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 5, 6, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 5, 6, 23, 59, 59).unwrap());
    }

    #[test]
    fn rfc3339_bounds_are_converted_to_utc() {
        let ts = parse_bound("2024-05-06T09:00:00+09:00", false, "start_date", "r").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 6, 0, 0, 0).unwrap());
        assert!(parse_bound("May 6th", false, "start_date", "r").is_err());
    }

    #[test]
    fn search_filter_maps_every_field() {
        let filter = search_filter(
            SearchNewsQuery {
                keyword: Some("댐".to_string()),
                title_keyword: Some("  ".to_string()),
                content_keyword: Some("수도".to_string()),
                sentiment: Some("negative".to_string()),
                start_date: Some("2024-01-01".to_string()),
                end_date: Some("2024-01-31".to_string()),
                ..SearchNewsQuery::default()
            },
            "r",
        )
        .unwrap();

        assert_eq!(filter.keyword.as_deref(), Some("댐"));
        assert!(filter.title_keyword.is_none());
        assert_eq!(filter.content_keyword.as_deref(), Some("수도"));
        assert_eq!(filter.sentiment, Some(SentimentLabel::Negative));
        assert_eq!(
            filter.published_after,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            filter.published_before,
            Some(Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap())
        );
    }

    #[test]
    fn search_filter_rejects_inverted_range() {
        let result = search_filter(
            SearchNewsQuery {
                start_date: Some("2024-02-01".to_string()),
                end_date: Some("2024-01-01".to_string()),
                ..SearchNewsQuery::default()
            },
            "r",
        );
        assert!(result.is_err());
    }
}
