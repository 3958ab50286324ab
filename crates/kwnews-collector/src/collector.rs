//! Fan-out of one harvest per topic query, merged and deduplicated.

use std::time::Duration;

use kwnews_core::{AppConfig, Article, NaverCredentials, TopicConfig};

use crate::client::NaverNewsClient;
use crate::dedup::dedupe_by_url;
use crate::error::CollectorError;
use crate::harvest::{HarvestLimits, QueryHarvester, RelevanceFilter};

const DEFAULT_QUERY_DELAY: Duration = Duration::from_millis(100);

/// Runs a [`QueryHarvester`] over a fixed, ordered list of related queries.
#[derive(Debug, Clone)]
pub struct MultiQueryCollector {
    harvester: QueryHarvester,
    queries: Vec<String>,
    query_delay: Duration,
}

impl MultiQueryCollector {
    /// # Errors
    ///
    /// Returns [`CollectorError::EmptyQueryList`] if `queries` is empty.
    pub fn new(harvester: QueryHarvester, queries: Vec<String>) -> Result<Self, CollectorError> {
        if queries.is_empty() {
            return Err(CollectorError::EmptyQueryList);
        }
        Ok(Self {
            harvester,
            queries,
            query_delay: DEFAULT_QUERY_DELAY,
        })
    }

    /// Build a collector over the topic's query list.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::EmptyQueryList`] if the topic has no queries.
    pub fn from_topic(harvester: QueryHarvester, topic: &TopicConfig) -> Result<Self, CollectorError> {
        Self::new(harvester, topic.queries.clone())
    }

    /// Wire a client, harvester and collector from application settings.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError`] if the HTTP client cannot be built or the
    /// topic has no queries.
    pub fn from_app_config(
        config: &AppConfig,
        credentials: NaverCredentials,
        topic: &TopicConfig,
    ) -> Result<Self, CollectorError> {
        let client = NaverNewsClient::with_base_url(
            credentials,
            config.harvest_request_timeout_secs,
            &config.harvest_user_agent,
            &config.naver_api_base_url,
        )?;
        let harvester = QueryHarvester::new(
            client,
            RelevanceFilter::new(&topic.relevance_keywords),
            HarvestLimits::from_app_config(config),
        );
        Ok(Self::from_topic(harvester, topic)?
            .with_query_delay(Duration::from_millis(config.harvest_query_delay_ms)))
    }

    /// Pause inserted between consecutive queries.
    #[must_use]
    pub fn with_query_delay(mut self, query_delay: Duration) -> Self {
        self.query_delay = query_delay;
        self
    }

    #[must_use]
    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    /// Harvest a single query.
    pub async fn collect(&self, query: &str, max_results: usize) -> Vec<Article> {
        self.harvester.harvest(query, max_results).await
    }

    /// Harvest every configured query and merge the results.
    ///
    /// Each query gets `max_results / queries.len()` (floor) of the budget,
    /// so fewer than `max_results` articles may come back. Queries run in
    /// order; a query that fails or yields nothing is skipped. The merged
    /// list is deduplicated by URL and truncated to `max_results`.
    pub async fn collect_extensive(&self, max_results: usize) -> Vec<Article> {
        let per_query = max_results / self.queries.len();
        if per_query == 0 {
            tracing::info!(
                max_results,
                queries = self.queries.len(),
                "budget smaller than query count; nothing to collect"
            );
            return Vec::new();
        }

        let mut merged: Vec<Article> = Vec::new();

        for (i, query) in self.queries.iter().enumerate() {
            if i > 0 && !self.query_delay.is_zero() {
                tokio::time::sleep(self.query_delay).await;
            }

            let articles = self.harvester.harvest(query, per_query).await;
            if articles.is_empty() {
                tracing::info!(query = %query, "query yielded no articles; skipping");
                continue;
            }
            tracing::info!(query = %query, count = articles.len(), "query harvested");
            merged.extend(articles);
        }

        let collected = merged.len();
        let mut deduped = dedupe_by_url(merged);
        deduped.truncate(max_results);

        tracing::info!(
            queries = self.queries.len(),
            per_query,
            collected,
            unique = deduped.len(),
            "extensive collection finished"
        );

        deduped
    }
}
