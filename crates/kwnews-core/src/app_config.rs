use std::net::SocketAddr;
use std::path::PathBuf;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Naver Open API credentials, sent as `X-Naver-Client-Id` / `X-Naver-Client-Secret`.
#[derive(Clone)]
pub struct NaverCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for NaverCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NaverCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Optional YAML file overriding the built-in K-water topic.
    pub topic_path: Option<PathBuf>,
    pub naver_client_id: Option<String>,
    pub naver_client_secret: Option<String>,
    pub naver_api_base_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub harvest_request_timeout_secs: u64,
    pub harvest_user_agent: String,
    pub harvest_page_size: u32,
    pub harvest_max_pages: u32,
    pub harvest_query_delay_ms: u64,
    /// Cron expression for the server's background harvest; `None` disables it.
    pub collect_schedule: Option<String>,
    pub collect_max_results: usize,
}

impl AppConfig {
    /// Returns the Naver API credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] naming the first absent variable.
    pub fn naver_credentials(&self) -> Result<NaverCredentials, ConfigError> {
        let client_id = self
            .naver_client_id
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("NAVER_CLIENT_ID".to_string()))?;
        let client_secret = self
            .naver_client_secret
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("NAVER_CLIENT_SECRET".to_string()))?;
        Ok(NaverCredentials {
            client_id,
            client_secret,
        })
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("topic_path", &self.topic_path)
            .field("database_url", &"[redacted]")
            .field("naver_client_id", &self.naver_client_id)
            .field(
                "naver_client_secret",
                &self.naver_client_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("naver_api_base_url", &self.naver_api_base_url)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "harvest_request_timeout_secs",
                &self.harvest_request_timeout_secs,
            )
            .field("harvest_user_agent", &self.harvest_user_agent)
            .field("harvest_page_size", &self.harvest_page_size)
            .field("harvest_max_pages", &self.harvest_max_pages)
            .field("harvest_query_delay_ms", &self.harvest_query_delay_ms)
            .field("collect_schedule", &self.collect_schedule)
            .field("collect_max_results", &self.collect_max_results)
            .finish()
    }
}
