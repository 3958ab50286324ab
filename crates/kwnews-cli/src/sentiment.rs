//! Sentiment command handlers for the CLI.

use clap::Subcommand;
use kwnews_db::{ArticleFilter, ArticleStore, PageRequest, PgArticleStore};
use kwnews_sentiment::{display_label, KeywordClassifier, SentimentClassifier};

/// Sub-commands available under `sentiment`.
#[derive(Debug, Subcommand)]
pub enum SentimentCommands {
    /// Classify one or more texts with the keyword classifier
    Analyze {
        #[arg(required = true)]
        texts: Vec<String>,
    },
    /// Show verdicts for the most recently published stored articles
    Report {
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(i64).range(1..=200))]
        limit: i64,
    },
}

/// Print a verdict line per input text.
pub(crate) fn run_sentiment_analyze(texts: &[String]) {
    let classifier = KeywordClassifier::new();
    println!(
        "{:<10}{:<8}{:<8}{:<8}{:<8}TEXT",
        "LABEL", "CONF", "POS", "NEG", "NEU"
    );
    for (text, result) in texts.iter().zip(classifier.classify_batch(texts)) {
        println!(
            "{:<10}{:<8.3}{:<8.3}{:<8.3}{:<8.3}{text}",
            display_label(&result),
            result.confidence,
            result.positive_score,
            result.negative_score,
            result.neutral_score,
        );
    }
}

pub(crate) async fn run_sentiment_command(
    pool: &sqlx::PgPool,
    command: SentimentCommands,
) -> anyhow::Result<()> {
    match command {
        SentimentCommands::Analyze { texts } => {
            run_sentiment_analyze(&texts);
            Ok(())
        }
        SentimentCommands::Report { limit } => run_sentiment_report(pool, limit).await,
    }
}

/// Print the sentiment distribution and the latest `limit` verdicts.
///
/// # Errors
///
/// Returns an error if the database query fails.
async fn run_sentiment_report(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let store = PgArticleStore::new(pool.clone());
    let distribution = store.aggregate_by_sentiment().await?;

    if distribution.is_empty() {
        println!("no stored articles to report on; run `collect --save` first");
        return Ok(());
    }

    let total: i64 = distribution.values().sum();
    println!("sentiment distribution ({total} articles)");
    for (label, count) in &distribution {
        #[allow(clippy::cast_precision_loss)]
        let share = *count as f64 / total as f64 * 100.0;
        println!("  {label:<10}{count:>6}  {share:>5.1}%");
    }

    let page = store
        .query(&ArticleFilter::default(), PageRequest { limit, offset: 0 })
        .await?;

    println!();
    println!("{:<18}{:<8}{:<8}TITLE", "PUBLISHED", "TONE", "CONF");
    for stored in &page.articles {
        let published = stored.article.published_at.format("%Y-%m-%d %H:%M");
        match &stored.sentiment {
            Some(result) => println!(
                "{published:<18}{:<8}{:<8.3}{}",
                display_label(result),
                result.confidence,
                stored.article.title
            ),
            None => println!("{published:<18}{:<8}{:<8}{}", "-", "-", stored.article.title),
        }
    }
    Ok(())
}
