//! Offline unit tests for kwnews-db pool configuration and row types.
//! These tests do not require a live database connection.

use kwnews_core::{AppConfig, Environment};
use kwnews_db::{HarvestCounts, HarvestRunRow, PoolConfig};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8000),
        log_level: "info".to_string(),
        topic_path: None,
        naver_client_id: None,
        naver_client_secret: None,
        naver_api_base_url: "https://openapi.naver.com".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        harvest_request_timeout_secs: 10,
        harvest_user_agent: "ua".to_string(),
        harvest_page_size: 100,
        harvest_max_pages: 10,
        harvest_query_delay_ms: 100,
        collect_schedule: None,
        collect_max_results: 1000,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`HarvestRunRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn harvest_run_row_has_expected_fields() {
    use chrono::Utc;
    use uuid::Uuid;

    let row = HarvestRunRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        run_type: "extensive".to_string(),
        trigger_source: "scheduler".to_string(),
        status: "running".to_string(),
        collected: 0_i32,
        inserted: 0_i32,
        duplicates: 0_i32,
        errors: 0_i32,
        started_at: Utc::now(),
        completed_at: None,
        error_message: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.run_type, "extensive");
    assert_eq!(row.status, "running");
    assert!(row.completed_at.is_none());
}

#[test]
fn harvest_counts_default_to_zero() {
    assert_eq!(
        HarvestCounts::default(),
        HarvestCounts {
            collected: 0,
            inserted: 0,
            duplicates: 0,
            errors: 0,
        }
    );
}
