//! Single-query pagination against the news search API.

use chrono::{DateTime, Utc};
use kwnews_core::{normalize_text, AppConfig, Article};

use crate::client::NaverNewsClient;
use crate::types::{SearchItem, SortOrder};

/// Largest page size the search API accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

const PUB_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Paging bounds for one harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestLimits {
    /// Items requested per page, clamped to `1..=100`.
    pub page_size: u32,
    pub max_pages: u32,
    pub sort: SortOrder,
}

impl Default for HarvestLimits {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            max_pages: 10,
            sort: SortOrder::Date,
        }
    }
}

impl HarvestLimits {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            page_size: config.harvest_page_size.clamp(1, MAX_PAGE_SIZE),
            max_pages: config.harvest_max_pages,
            sort: SortOrder::Date,
        }
    }
}

/// Why a harvest stopped paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A page request failed; results gathered so far are kept.
    SourceUnavailable,
    /// A page came back with no items.
    Exhausted,
    /// A page came back shorter than the requested page size.
    LastPage,
    /// Enough articles were accumulated.
    ResultCap,
    /// The page budget ran out.
    PageCeiling,
}

/// Why a search item was dropped instead of becoming an [`Article`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingUrl,
    Irrelevant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestOutcome {
    pub articles: Vec<Article>,
    pub pages_fetched: u32,
    pub skipped: usize,
    pub stop: StopReason,
}

/// Keyword containment check applied to normalized title and description.
#[derive(Debug, Clone, Default)]
pub struct RelevanceFilter {
    keywords: Vec<String>,
}

impl RelevanceFilter {
    /// An empty keyword list accepts every item.
    #[must_use]
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// `title` and `content` are expected to be normalized already.
    #[must_use]
    pub fn is_relevant(&self, title: &str, content: &str) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        let title = title.to_lowercase();
        let content = content.to_lowercase();
        self.keywords
            .iter()
            .any(|k| title.contains(k.as_str()) || content.contains(k.as_str()))
    }
}

/// Pages through one search query until the source runs dry or a bound is hit.
#[derive(Debug, Clone)]
pub struct QueryHarvester {
    client: NaverNewsClient,
    relevance: RelevanceFilter,
    limits: HarvestLimits,
}

impl QueryHarvester {
    #[must_use]
    pub fn new(client: NaverNewsClient, relevance: RelevanceFilter, limits: HarvestLimits) -> Self {
        Self {
            client,
            relevance,
            limits,
        }
    }

    #[must_use]
    pub fn limits(&self) -> HarvestLimits {
        self.limits
    }

    /// Harvest up to `max_results` articles for `query` with the configured limits.
    pub async fn harvest(&self, query: &str, max_results: usize) -> Vec<Article> {
        self.harvest_detailed(query, max_results, self.limits)
            .await
            .articles
    }

    /// Harvest with an explicit page size and page budget.
    pub async fn harvest_with_limits(
        &self,
        query: &str,
        max_results: usize,
        page_size: u32,
        max_pages: u32,
    ) -> Vec<Article> {
        let limits = HarvestLimits {
            page_size,
            max_pages,
            sort: self.limits.sort,
        };
        self.harvest_detailed(query, max_results, limits)
            .await
            .articles
    }

    /// Run the paging loop and report how it ended.
    ///
    /// Request failures never propagate: they end the loop with
    /// [`StopReason::SourceUnavailable`] and the articles gathered so far.
    pub async fn harvest_detailed(
        &self,
        query: &str,
        max_results: usize,
        limits: HarvestLimits,
    ) -> HarvestOutcome {
        let page_size = limits.page_size.clamp(1, MAX_PAGE_SIZE);
        let page_len = usize::try_from(page_size).unwrap_or(usize::MAX);

        let mut articles: Vec<Article> = Vec::new();
        let mut pages_fetched: u32 = 0;
        let mut skipped: usize = 0;
        let mut start: u32 = 1;

        let stop = loop {
            if articles.len() >= max_results {
                break StopReason::ResultCap;
            }
            if pages_fetched >= limits.max_pages {
                break StopReason::PageCeiling;
            }

            let response = match self
                .client
                .search_news(query, page_size, start, limits.sort)
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(query, start, error = %e, "news search page failed; stopping harvest");
                    break StopReason::SourceUnavailable;
                }
            };
            pages_fetched += 1;

            let raw_count = response.items.len();
            if raw_count == 0 {
                break StopReason::Exhausted;
            }

            for item in &response.items {
                match self.to_article(item) {
                    Ok(article) => articles.push(article),
                    Err(reason) => {
                        skipped += 1;
                        tracing::trace!(query, ?reason, "search item skipped");
                    }
                }
            }

            if raw_count < page_len {
                break StopReason::LastPage;
            }
            start = start.saturating_add(page_size);
        };

        articles.truncate(max_results);

        tracing::debug!(
            query,
            collected = articles.len(),
            pages_fetched,
            skipped,
            ?stop,
            "harvest finished"
        );

        HarvestOutcome {
            articles,
            pages_fetched,
            skipped,
            stop,
        }
    }

    fn to_article(&self, item: &SearchItem) -> Result<Article, SkipReason> {
        let url = item.link.trim();
        if url.is_empty() {
            return Err(SkipReason::MissingUrl);
        }

        let title = normalize_text(&item.title);
        let content = normalize_text(&item.description);
        if !self.relevance.is_relevant(&title, &content) {
            return Err(SkipReason::Irrelevant);
        }

        Ok(Article {
            title,
            content,
            url: url.to_string(),
            published_at: parse_pub_date(&item.pub_date),
        })
    }
}

/// Parse the API's RFC 2822-style `pubDate`, falling back to the current time.
fn parse_pub_date(raw: &str) -> DateTime<Utc> {
    match DateTime::parse_from_str(raw.trim(), PUB_DATE_FORMAT) {
        Ok(parsed) => parsed.with_timezone(&Utc),
        Err(e) => {
            tracing::debug!(pub_date = raw, error = %e, "unparseable pubDate; using harvest time");
            Utc::now()
        }
    }
}

#[cfg(test)]
#[path = "harvest_test.rs"]
mod tests;
