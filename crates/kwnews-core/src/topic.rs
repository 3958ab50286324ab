use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const KWATER_QUERIES: &[&str] = &[
    "kwater OR 한국수자원공사",
    "한국수자원공사",
    "K-water",
    "수자원공사",
    "물관리",
    "댐",
    "수도",
    "상수도",
    "하수도",
    "물산업",
];

const KWATER_RELEVANCE_KEYWORDS: &[&str] = &[
    "kwater",
    "한국수자원공사",
    "수자원",
    "물관리",
    "댐",
    "수도",
    "상수도",
    "하수도",
];

/// The harvest target: search terms fanned out per collection plus the
/// keywords an item must mention to count as on-topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicConfig {
    pub name: String,
    pub queries: Vec<String>,
    pub relevance_keywords: Vec<String>,
}

impl TopicConfig {
    /// Built-in topic for K-water (한국수자원공사) coverage.
    #[must_use]
    pub fn kwater() -> Self {
        Self {
            name: "K-water".to_string(),
            queries: KWATER_QUERIES.iter().map(|q| (*q).to_string()).collect(),
            relevance_keywords: KWATER_RELEVANCE_KEYWORDS
                .iter()
                .map(|k| (*k).to_string())
                .collect(),
        }
    }
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self::kwater()
    }
}

/// Load and validate a topic from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_topic(path: &Path) -> Result<TopicConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TopicFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let topic: TopicConfig = serde_yaml::from_str(&content).map_err(ConfigError::TopicFileParse)?;

    validate_topic(&topic)?;

    Ok(topic)
}

/// Load the topic at `path`, or the built-in K-water topic when no path is set.
///
/// # Errors
///
/// Returns `ConfigError` if a configured file cannot be loaded.
pub fn load_configured_topic(path: Option<&Path>) -> Result<TopicConfig, ConfigError> {
    match path {
        Some(path) => load_topic(path),
        None => Ok(TopicConfig::kwater()),
    }
}

fn validate_topic(topic: &TopicConfig) -> Result<(), ConfigError> {
    if topic.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "topic name must be non-empty".to_string(),
        ));
    }

    if topic.queries.is_empty() {
        return Err(ConfigError::Validation(format!(
            "topic '{}' must define at least one query",
            topic.name
        )));
    }

    let mut seen_queries = HashSet::new();
    for query in &topic.queries {
        if query.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "topic '{}' contains a blank query",
                topic.name
            )));
        }
        if !seen_queries.insert(query.trim().to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "topic '{}' has duplicate query: '{query}'",
                topic.name
            )));
        }
    }

    if topic.relevance_keywords.is_empty() {
        return Err(ConfigError::Validation(format!(
            "topic '{}' must define at least one relevance keyword",
            topic.name
        )));
    }

    if topic.relevance_keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "topic '{}' contains a blank relevance keyword",
            topic.name
        )));
    }

    Ok(())
}

#[cfg(test)]
#[path = "topic_test.rs"]
mod tests;
