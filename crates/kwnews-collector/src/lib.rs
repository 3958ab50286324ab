//! News harvesting from the Naver News Search API.
//!
//! [`QueryHarvester`] pages through one query with a relevance filter,
//! [`MultiQueryCollector`] fans out over a topic's query list and merges the
//! results through [`dedupe_by_url`], and the [`pipeline`] functions tag and
//! persist what was collected.

pub mod client;
pub mod collector;
pub mod dedup;
pub mod error;
pub mod harvest;
pub mod pipeline;
pub mod types;

pub use client::NaverNewsClient;
pub use collector::MultiQueryCollector;
pub use dedup::dedupe_by_url;
pub use error::CollectorError;
pub use harvest::{
    HarvestLimits, HarvestOutcome, QueryHarvester, RelevanceFilter, SkipReason, StopReason,
};
pub use pipeline::{
    collect_and_save, save_articles, tag_articles, CollectAndSaveReport, SaveReport,
};
pub use types::{SearchItem, SearchResponse, SortOrder};
