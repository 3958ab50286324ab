//! HTTP client for the Naver News Search API.

use std::time::Duration;

use kwnews_core::NaverCredentials;
use reqwest::{Client, StatusCode, Url};

use crate::error::CollectorError;
use crate::types::{SearchResponse, SortOrder};

const DEFAULT_BASE_URL: &str = "https://openapi.naver.com";
const NEWS_SEARCH_PATH: &str = "v1/search/news.json";

/// Client for `GET /v1/search/news.json`.
///
/// Use [`NaverNewsClient::new`] for production or
/// [`NaverNewsClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct NaverNewsClient {
    client: Client,
    credentials: NaverCredentials,
    endpoint: Url,
}

impl NaverNewsClient {
    /// Creates a client pointed at the production Naver Open API.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        credentials: NaverCredentials,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, CollectorError> {
        Self::with_base_url(credentials, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CollectorError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        credentials: NaverCredentials,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, CollectorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise to exactly one trailing slash so the join appends the
        // search path instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join(NEWS_SEARCH_PATH))
            .map_err(|e| CollectorError::InvalidBaseUrl {
                base_url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            credentials,
            endpoint,
        })
    }

    /// Fetches one page of news search results.
    ///
    /// `display` is the page size (the API accepts at most 100) and `start`
    /// the 1-indexed offset of the first item.
    ///
    /// # Errors
    ///
    /// - [`CollectorError::RateLimited`] on HTTP 429.
    /// - [`CollectorError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`CollectorError::Http`] on network failure or timeout.
    /// - [`CollectorError::Deserialize`] if the body is not the expected JSON.
    pub async fn search_news(
        &self,
        query: &str,
        display: u32,
        start: u32,
        sort: SortOrder,
    ) -> Result<SearchResponse, CollectorError> {
        let url = self.build_url(query, display, start, sort);

        let response = self
            .client
            .get(url.clone())
            .header("X-Naver-Client-Id", &self.credentials.client_id)
            .header("X-Naver-Client-Secret", &self.credentials.client_secret)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CollectorError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            return Err(CollectorError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| CollectorError::Deserialize {
            context: format!("news search (query={query}, start={start})"),
            source: e,
        })
    }

    /// Builds the request URL with percent-encoded query parameters.
    fn build_url(&self, query: &str, display: u32, start: u32, sort: SortOrder) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("display", &display.to_string())
            .append_pair("start", &start.to_string())
            .append_pair("sort", sort.as_str());
        url
    }
}
