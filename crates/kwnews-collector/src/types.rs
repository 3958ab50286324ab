//! Wire types for the Naver News Search API.

use serde::{Deserialize, Serialize};

/// Response body of `GET /v1/search/news.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub last_build_date: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub start: Option<u32>,
    #[serde(default)]
    pub display: Option<u32>,
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

/// One search hit. `title` and `description` carry `<b>` highlight markup
/// and HTML entities.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub originallink: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "pubDate")]
    pub pub_date: String,
}

/// Result ordering accepted by the search API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Newest first.
    #[default]
    Date,
    /// Relevance.
    Sim,
}

impl SortOrder {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Date => "date",
            SortOrder::Sim => "sim",
        }
    }
}
