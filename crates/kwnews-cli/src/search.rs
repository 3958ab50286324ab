//! Read-only queries over stored articles.

use chrono::{Duration, Utc};
use clap::Args;
use kwnews_core::SentimentLabel;
use kwnews_db::{ArticleFilter, ArticleStore, PageRequest, PgArticleStore};
use kwnews_sentiment::display_label;

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Match in title or content (case-insensitive)
    #[arg(long)]
    pub keyword: Option<String>,

    /// Match in title only
    #[arg(long)]
    pub title: Option<String>,

    /// Match in content only
    #[arg(long)]
    pub content: Option<String>,

    /// positive, negative, or neutral
    #[arg(long)]
    pub sentiment: Option<SentimentLabel>,

    /// Only articles published within the last N days (0 disables the filter)
    #[arg(long, value_parser = clap::value_parser!(i64).range(0..=3650))]
    pub days: Option<i64>,

    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(i64).range(1..=200))]
    pub limit: i64,

    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(i64).range(0..))]
    pub offset: i64,
}

impl SearchArgs {
    pub(crate) fn filter(self) -> ArticleFilter {
        ArticleFilter {
            keyword: self.keyword,
            title_keyword: self.title,
            content_keyword: self.content,
            sentiment: self.sentiment,
            published_after: self
                .days
                .filter(|d| *d > 0)
                .map(|d| Utc::now() - Duration::days(d)),
            published_before: None,
        }
    }
}

/// Print stored articles matching the search arguments, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_search(pool: &sqlx::PgPool, args: SearchArgs) -> anyhow::Result<()> {
    let page = PageRequest {
        limit: args.limit,
        offset: args.offset,
    };
    let store = PgArticleStore::new(pool.clone());
    let result = store.query(&args.filter(), page).await?;

    if result.articles.is_empty() {
        println!("no stored articles match the search");
        return Ok(());
    }

    println!("{:<18}{:<8}TITLE", "PUBLISHED", "TONE");
    for stored in &result.articles {
        let published = stored.article.published_at.format("%Y-%m-%d %H:%M");
        let tone = stored.sentiment.as_ref().map_or("-", display_label);
        println!("{published:<18}{tone:<8}{}", stored.article.title);
        println!("{:<26}{}", "", stored.article.url);
    }
    println!(
        "showing {}-{} of {} matches",
        page.offset + 1,
        page.offset + i64::try_from(result.articles.len()).unwrap_or(i64::MAX),
        result.total_count
    );
    Ok(())
}

/// Print totals, the sentiment distribution and the published-date range.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_stats(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let store = PgArticleStore::new(pool.clone());
    let stats = store.stats().await?;

    println!("total articles:     {}", stats.total);
    println!("published (7 days): {}", stats.recent_7_days);
    if let (Some(oldest), Some(newest)) = (stats.oldest_published_at, stats.newest_published_at) {
        println!(
            "published range:    {} .. {}",
            oldest.format("%Y-%m-%d"),
            newest.format("%Y-%m-%d")
        );
    }
    println!();
    println!("{:<12}COUNT", "SENTIMENT");
    for (label, count) in &stats.sentiment_distribution {
        println!("{label:<12}{count}");
    }
    Ok(())
}
