//! Integration tests for `QueryHarvester` and `MultiQueryCollector` using
//! wiremock HTTP mocks.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use kwnews_collector::{
    HarvestLimits, MultiQueryCollector, NaverNewsClient, QueryHarvester, RelevanceFilter,
    SortOrder, StopReason,
};
use kwnews_core::NaverCredentials;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const SEARCH_PATH: &str = "/v1/search/news.json";

fn test_client(base_url: &str) -> NaverNewsClient {
    NaverNewsClient::with_base_url(
        NaverCredentials {
            client_id: "test-id".to_string(),
            client_secret: "test-secret".to_string(),
        },
        5,
        "kwnews-test",
        base_url,
    )
    .expect("client construction should not fail")
}

fn test_harvester(base_url: &str) -> QueryHarvester {
    QueryHarvester::new(
        test_client(base_url),
        RelevanceFilter::new(["한국수자원공사", "kwater"]),
        HarvestLimits::default(),
    )
}

/// `count` relevant items whose links are `https://news.example.com/{tag}/{i}`.
fn items(tag: &str, count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "title": format!("<b>한국수자원공사</b> 소식 {tag}-{i}"),
                "originallink": format!("https://press.example.com/{tag}/{i}"),
                "link": format!("https://news.example.com/{tag}/{i}"),
                "description": "물 관리 &amp; 댐 안전",
                "pubDate": "Mon, 06 May 2024 09:12:00 +0900"
            })
        })
        .collect()
}

fn page(tag: &str, count: usize) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "total": 5000,
        "display": count,
        "items": items(tag, count),
    }))
}

/// Responds to any query with a full page whose links embed the query and offset.
fn echo_page(req: &Request) -> ResponseTemplate {
    let params: HashMap<String, String> = req.url.query_pairs().into_owned().collect();
    let query = params.get("query").cloned().unwrap_or_default();
    let start = params.get("start").cloned().unwrap_or_default();
    let display: usize = params
        .get("display")
        .and_then(|d| d.parse().ok())
        .unwrap_or(100);
    page(&format!("{query}@{start}"), display)
}

// ---------------------------------------------------------------------------
// QueryHarvester
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pagination_stops_after_short_page() {
    let server = MockServer::start().await;

    for (start, count) in [("1", 100), ("101", 100), ("201", 37)] {
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .and(query_param("start", start))
            .and(query_param("display", "100"))
            .and(query_param("sort", "date"))
            .respond_with(page(start, count))
            .expect(1)
            .mount(&server)
            .await;
    }

    let harvester = test_harvester(&server.uri());
    let outcome = harvester
        .harvest_detailed("한국수자원공사", 1000, HarvestLimits::default())
        .await;

    assert_eq!(outcome.pages_fetched, 3);
    assert_eq!(outcome.stop, StopReason::LastPage);
    assert_eq!(outcome.articles.len(), 237);
    assert_eq!(outcome.articles[0].title, "한국수자원공사 소식 1-0");
    assert_eq!(outcome.articles[0].content, "물 관리 & 댐 안전");
}

#[tokio::test]
async fn credentials_are_sent_as_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(header("X-Naver-Client-Id", "test-id"))
        .and(header("X-Naver-Client-Secret", "test-secret"))
        .and(query_param("query", "kwater OR 한국수자원공사"))
        .respond_with(page("h", 3))
        .expect(1)
        .mount(&server)
        .await;

    let articles = test_harvester(&server.uri())
        .harvest("kwater OR 한국수자원공사", 10)
        .await;
    assert_eq!(articles.len(), 3);
}

#[tokio::test]
async fn server_error_on_first_page_yields_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = test_harvester(&server.uri())
        .harvest_detailed("한국수자원공사", 100, HarvestLimits::default())
        .await;

    assert!(outcome.articles.is_empty());
    assert_eq!(outcome.stop, StopReason::SourceUnavailable);
    assert_eq!(outcome.pages_fetched, 0);
}

#[tokio::test]
async fn failure_mid_harvest_keeps_earlier_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("start", "1"))
        .respond_with(page("p1", 100))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("start", "101"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = test_harvester(&server.uri())
        .harvest_detailed("한국수자원공사", 500, HarvestLimits::default())
        .await;

    assert_eq!(outcome.articles.len(), 100);
    assert_eq!(outcome.stop, StopReason::SourceUnavailable);
}

#[tokio::test]
async fn undecodable_body_stops_harvest() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let articles = test_harvester(&server.uri())
        .harvest("한국수자원공사", 100)
        .await;
    assert!(articles.is_empty());
}

#[tokio::test]
async fn empty_page_stops_as_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(page("none", 0))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = test_harvester(&server.uri())
        .harvest_detailed("한국수자원공사", 100, HarvestLimits::default())
        .await;
    assert_eq!(outcome.stop, StopReason::Exhausted);
    assert_eq!(outcome.pages_fetched, 1);
}

#[tokio::test]
async fn result_cap_truncates_and_stops_paging() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(echo_page)
        .expect(2)
        .mount(&server)
        .await;

    let outcome = test_harvester(&server.uri())
        .harvest_detailed("한국수자원공사", 150, HarvestLimits::default())
        .await;

    assert_eq!(outcome.articles.len(), 150);
    assert_eq!(outcome.stop, StopReason::ResultCap);
    assert_eq!(outcome.pages_fetched, 2);
}

#[tokio::test]
async fn page_ceiling_bounds_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(echo_page)
        .expect(2)
        .mount(&server)
        .await;

    let harvester = test_harvester(&server.uri());
    let limits = HarvestLimits {
        page_size: 10,
        max_pages: 2,
        sort: SortOrder::Sim,
    };
    let outcome = harvester
        .harvest_detailed("한국수자원공사", 1000, limits)
        .await;

    assert_eq!(outcome.stop, StopReason::PageCeiling);
    assert_eq!(outcome.articles.len(), 20);
}

#[tokio::test]
async fn harvest_with_limits_uses_explicit_page_size() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("display", "25"))
        .and(query_param("start", "1"))
        .respond_with(page("a", 25))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("display", "25"))
        .and(query_param("start", "26"))
        .respond_with(page("b", 5))
        .expect(1)
        .mount(&server)
        .await;

    let articles = test_harvester(&server.uri())
        .harvest_with_limits("한국수자원공사", 100, 25, 10)
        .await;
    assert_eq!(articles.len(), 30);
}

#[tokio::test]
async fn irrelevant_and_linkless_items_are_dropped() {
    let server = MockServer::start().await;

    let body = json!({
        "items": [
            {
                "title": "<b>한국수자원공사</b> 가뭄 대응",
                "link": "https://news.example.com/keep",
                "description": "",
                "pubDate": "Mon, 06 May 2024 09:12:00 +0900"
            },
            {
                "title": "코스피 마감",
                "link": "https://news.example.com/stocks",
                "description": "증시 동향",
                "pubDate": "Mon, 06 May 2024 09:12:00 +0900"
            },
            {
                "title": "한국수자원공사 링크 없음",
                "link": "",
                "description": "",
                "pubDate": "Mon, 06 May 2024 09:12:00 +0900"
            }
        ]
    });
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = test_harvester(&server.uri())
        .harvest_detailed("한국수자원공사", 100, HarvestLimits::default())
        .await;

    assert_eq!(outcome.articles.len(), 1);
    assert_eq!(outcome.articles[0].url, "https://news.example.com/keep");
    assert_eq!(outcome.skipped, 2);
    assert_eq!(outcome.stop, StopReason::LastPage);
}

// ---------------------------------------------------------------------------
// MultiQueryCollector
// ---------------------------------------------------------------------------

fn collector(base_url: &str, queries: &[&str]) -> MultiQueryCollector {
    MultiQueryCollector::new(
        test_harvester(base_url),
        queries.iter().map(|q| (*q).to_string()).collect(),
    )
    .expect("non-empty query list")
    .with_query_delay(Duration::ZERO)
}

#[tokio::test]
async fn extensive_budget_is_split_and_truncated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(echo_page)
        .expect(10)
        .mount(&server)
        .await;

    let queries = [
        "q0", "q1", "q2", "q3", "q4", "q5", "q6", "q7", "q8", "q9",
    ];
    let articles = collector(&server.uri(), &queries).collect_extensive(10).await;

    assert!(articles.len() <= 10);
    assert_eq!(articles.len(), 10);
    assert_eq!(articles[0].url, "https://news.example.com/q0@1/0");
    assert_eq!(articles[9].url, "https://news.example.com/q9@1/0");
}

#[tokio::test]
async fn extensive_merges_in_query_order_and_dedupes() {
    let server = MockServer::start().await;

    // Both queries return the same three links.
    Mock::given(method("GET"))
        .respond_with(page("shared", 3))
        .expect(2)
        .mount(&server)
        .await;

    let articles = collector(&server.uri(), &["댐", "수도"])
        .collect_extensive(100)
        .await;

    assert_eq!(articles.len(), 3);
    let urls: Vec<_> = articles.iter().map(|a| a.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://news.example.com/shared/0",
            "https://news.example.com/shared/1",
            "https://news.example.com/shared/2",
        ]
    );
}

#[tokio::test]
async fn failing_query_is_skipped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("query", "broken"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("query", "working"))
        .respond_with(page("ok", 4))
        .expect(1)
        .mount(&server)
        .await;

    let articles = collector(&server.uri(), &["broken", "working"])
        .collect_extensive(100)
        .await;
    assert_eq!(articles.len(), 4);
}

#[tokio::test]
async fn budget_below_query_count_issues_no_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(echo_page)
        .expect(0)
        .mount(&server)
        .await;

    let articles = collector(&server.uri(), &["a", "b", "c"])
        .collect_extensive(2)
        .await;
    assert!(articles.is_empty());
}

#[tokio::test]
async fn extensive_pauses_between_queries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(page("paced", 3))
        .expect(3)
        .mount(&server)
        .await;

    let delay = Duration::from_millis(150);
    let collector = collector(&server.uri(), &["a", "b", "c"]).with_query_delay(delay);

    let started = Instant::now();
    let articles = collector.collect_extensive(30).await;
    let elapsed = started.elapsed();

    assert_eq!(articles.len(), 3);
    assert!(
        elapsed >= delay * 2,
        "three queries should wait twice between them, took {elapsed:?}"
    );
}

#[tokio::test]
async fn single_query_collect_uses_given_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("query", "K-water"))
        .respond_with(page("single", 7))
        .expect(1)
        .mount(&server)
        .await;

    let articles = collector(&server.uri(), &["unused"])
        .collect("K-water", 50)
        .await;
    assert_eq!(articles.len(), 7);
}

#[test]
fn empty_query_list_is_a_configuration_error() {
    let result = MultiQueryCollector::new(test_harvester("http://127.0.0.1:9"), Vec::new());
    assert!(matches!(
        result,
        Err(kwnews_collector::CollectorError::EmptyQueryList)
    ));
}
