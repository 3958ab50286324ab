use axum::{extract::State, Extension, Json};
use kwnews_core::SentimentResult;
use kwnews_sentiment::display_label;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

const MAX_BATCH_SIZE: usize = 500;

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeBatchRequest {
    pub texts: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct AnalyzeData {
    pub text: String,
    pub sentiment: SentimentResult,
    /// Korean label for display (`긍정` / `부정` / `중립`).
    pub display_label: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct StatusData {
    pub available: bool,
    pub classifier: String,
}

fn analyzed(text: String, sentiment: SentimentResult) -> AnalyzeData {
    AnalyzeData {
        display_label: display_label(&sentiment),
        text,
        sentiment,
    }
}

pub(super) async fn analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AnalyzeRequest>,
) -> Json<ApiResponse<AnalyzeData>> {
    let sentiment = state.classifier.classify(&body.text);
    Json(ApiResponse::new(analyzed(body.text, sentiment), req_id.0))
}

pub(super) async fn analyze_batch(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AnalyzeBatchRequest>,
) -> Result<Json<ApiResponse<Vec<AnalyzeData>>>, ApiError> {
    if body.texts.len() > MAX_BATCH_SIZE {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            format!(
                "batch holds {} texts; at most {MAX_BATCH_SIZE} are accepted",
                body.texts.len()
            ),
        ));
    }

    let results = state.classifier.classify_batch(&body.texts);
    let data = body
        .texts
        .into_iter()
        .zip(results)
        .map(|(text, sentiment)| analyzed(text, sentiment))
        .collect();

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<StatusData>> {
    Json(ApiResponse::new(
        StatusData {
            available: true,
            classifier: state.classifier.name().to_string(),
        },
        req_id.0,
    ))
}
