use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_NAVER_API_BASE_URL: &str = "https://openapi.naver.com";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("KWNEWS_ENV", "development"))?;
    let bind_addr = parse_addr("KWNEWS_BIND_ADDR", "0.0.0.0:8000")?;
    let log_level = or_default("KWNEWS_LOG_LEVEL", "info");
    let topic_path = optional("KWNEWS_TOPIC_PATH").map(PathBuf::from);

    let naver_client_id = optional("NAVER_CLIENT_ID");
    let naver_client_secret = optional("NAVER_CLIENT_SECRET");
    let naver_api_base_url = or_default("NAVER_API_BASE_URL", DEFAULT_NAVER_API_BASE_URL);

    let db_max_connections = parse_u32("KWNEWS_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("KWNEWS_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("KWNEWS_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let harvest_request_timeout_secs = parse_u64("KWNEWS_HARVEST_REQUEST_TIMEOUT_SECS", "10")?;
    let harvest_user_agent = or_default(
        "KWNEWS_HARVEST_USER_AGENT",
        "kwnews/0.1 (news-sentiment)",
    );
    let harvest_page_size = parse_u32("KWNEWS_HARVEST_PAGE_SIZE", "100")?;
    if !(1..=100).contains(&harvest_page_size) {
        return Err(invalid(
            "KWNEWS_HARVEST_PAGE_SIZE",
            format!("{harvest_page_size} is outside the accepted range 1..=100"),
        ));
    }
    let harvest_max_pages = parse_u32("KWNEWS_HARVEST_MAX_PAGES", "10")?;
    let harvest_query_delay_ms = parse_u64("KWNEWS_HARVEST_QUERY_DELAY_MS", "100")?;

    let collect_schedule = optional("KWNEWS_COLLECT_SCHEDULE");
    let collect_max_results = parse_usize("KWNEWS_COLLECT_MAX_RESULTS", "1000")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        topic_path,
        naver_client_id,
        naver_client_secret,
        naver_api_base_url,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        harvest_request_timeout_secs,
        harvest_user_agent,
        harvest_page_size,
        harvest_max_pages,
        harvest_query_delay_ms,
        collect_schedule,
        collect_max_results,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "KWNEWS_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
