//! Shared domain types and configuration for the kwnews workspace.

mod app_config;
mod article;
mod config;
mod sentiment;
mod text;
mod topic;

pub use app_config::{AppConfig, Environment, NaverCredentials};
pub use article::{Article, TaggedArticle};
pub use config::{load_app_config, load_app_config_from_env};
pub use sentiment::{ParseSentimentLabelError, SentimentLabel, SentimentResult};
pub use text::normalize_text;
pub use topic::{load_configured_topic, load_topic, TopicConfig};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read topic file {path}: {source}")]
    TopicFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse topic file: {0}")]
    TopicFileParse(#[source] serde_yaml::Error),

    #[error("topic validation failed: {0}")]
    Validation(String),
}
