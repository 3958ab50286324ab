//! `collect` command: harvest, optionally classify, optionally persist.

use clap::Args;
use kwnews_collector::{save_articles, tag_articles, MultiQueryCollector, SaveReport};
use kwnews_core::{AppConfig, Article, TaggedArticle, TopicConfig};
use kwnews_db::{HarvestCounts, PgArticleStore};
use kwnews_sentiment::{display_label, KeywordClassifier, SentimentClassifier};

use crate::fail_run_best_effort;

const DEFAULT_QUERY: &str = "kwater OR 한국수자원공사";

#[derive(Debug, Args)]
pub struct CollectArgs {
    /// Search term for a single-query harvest
    #[arg(long, conflicts_with = "extensive")]
    pub query: Option<String>,

    /// Upper bound on returned articles (defaults to KWNEWS_COLLECT_MAX_RESULTS)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub max_results: Option<u32>,

    /// Fan out over every topic query and merge the results
    #[arg(long)]
    pub extensive: bool,

    /// Upsert the harvested articles into the database
    #[arg(long)]
    pub save: bool,

    /// Skip sentiment classification
    #[arg(long)]
    pub no_sentiment: bool,

    /// Print the article list as JSON instead of a table
    #[arg(long, conflicts_with = "save")]
    pub json: bool,

    /// Show what would be harvested without calling the API or the database
    #[arg(long)]
    pub dry_run: bool,
}

impl CollectArgs {
    fn run_type(&self) -> &'static str {
        if self.extensive {
            "extensive"
        } else {
            "query"
        }
    }
}

/// Run the `collect` command.
///
/// # Errors
///
/// Returns an error if credentials or the topic file are missing or invalid,
/// the database is unreachable when `--save` is set, or every article in a
/// saved batch fails to persist. An empty harvest is not an error.
pub(crate) async fn run_collect(config: &AppConfig, args: &CollectArgs) -> anyhow::Result<()> {
    let topic = kwnews_core::load_configured_topic(config.topic_path.as_deref())?;
    let max_results = args
        .max_results
        .map_or(config.collect_max_results, |n| n as usize);

    if args.dry_run {
        print_plan(&topic, args, max_results);
        return Ok(());
    }

    let credentials = config.naver_credentials()?;
    let collector = MultiQueryCollector::from_app_config(config, credentials, &topic)?;
    let classifier = KeywordClassifier::new();
    let classifier_ref: Option<&dyn SentimentClassifier> = if args.no_sentiment {
        None
    } else {
        Some(&classifier as &dyn SentimentClassifier)
    };

    if args.save {
        let pool = crate::connect(config).await?;
        return collect_and_persist(&pool, &collector, classifier_ref, args, max_results).await;
    }

    let articles = harvest(&collector, args, max_results).await;
    let tagged: Vec<TaggedArticle> = match classifier_ref {
        Some(c) => tag_articles(articles, c),
        None => articles
            .into_iter()
            .map(|article| TaggedArticle {
                article,
                sentiment: None,
            })
            .collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tagged)?);
    } else {
        print_articles(&tagged);
    }
    Ok(())
}

async fn harvest(
    collector: &MultiQueryCollector,
    args: &CollectArgs,
    max_results: usize,
) -> Vec<Article> {
    if args.extensive {
        collector.collect_extensive(max_results).await
    } else {
        let query = args.query.as_deref().unwrap_or(DEFAULT_QUERY);
        collector.collect(query, max_results).await
    }
}

async fn collect_and_persist(
    pool: &sqlx::PgPool,
    collector: &MultiQueryCollector,
    classifier: Option<&dyn SentimentClassifier>,
    args: &CollectArgs,
    max_results: usize,
) -> anyhow::Result<()> {
    let run = kwnews_db::create_harvest_run(pool, args.run_type(), "cli").await?;

    let articles = harvest(collector, args, max_results).await;
    let store = PgArticleStore::new(pool.clone());
    let report = save_articles(&store, &articles, classifier).await;

    if report.total_processed > 0 && report.errors == report.total_processed {
        let message = format!("all {} articles failed to save", report.errors);
        fail_run_best_effort(pool, run.id, &message).await;
        anyhow::bail!("{message}");
    }

    if let Err(e) = kwnews_db::complete_harvest_run(pool, run.id, counts(articles.len(), &report))
        .await
    {
        fail_run_best_effort(pool, run.id, &format!("{e:#}")).await;
        return Err(e.into());
    }

    println!(
        "collected {} articles: {} inserted, {} duplicates, {} errors",
        articles.len(),
        report.inserted,
        report.duplicates,
        report.errors
    );
    Ok(())
}

fn counts(collected: usize, report: &SaveReport) -> HarvestCounts {
    let to_i32 = |n: usize| i32::try_from(n).unwrap_or(i32::MAX);
    HarvestCounts {
        collected: to_i32(collected),
        inserted: to_i32(report.inserted),
        duplicates: to_i32(report.duplicates),
        errors: to_i32(report.errors),
    }
}

fn print_plan(topic: &TopicConfig, args: &CollectArgs, max_results: usize) {
    if args.extensive {
        let per_query = max_results / topic.queries.len().max(1);
        println!(
            "dry-run: would harvest {} queries for topic '{}' ({per_query} per query, {max_results} max):",
            topic.queries.len(),
            topic.name
        );
        for query in &topic.queries {
            println!("  {query}");
        }
    } else {
        let query = args.query.as_deref().unwrap_or(DEFAULT_QUERY);
        println!("dry-run: would harvest up to {max_results} articles for '{query}'");
    }
    if args.save {
        println!("dry-run: results would be saved to the database");
    }
}

fn print_articles(articles: &[TaggedArticle]) {
    if articles.is_empty() {
        println!("no articles found");
        return;
    }

    println!("{:<18}{:<8}TITLE", "PUBLISHED", "TONE");
    for tagged in articles {
        let published = tagged.article.published_at.format("%Y-%m-%d %H:%M");
        let tone = tagged.sentiment.as_ref().map_or("-", display_label);
        println!("{published:<18}{tone:<8}{}", tagged.article.title);
    }
    println!("{} articles", articles.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_saturate_into_table_columns() {
        let report = SaveReport {
            inserted: 3,
            duplicates: 1,
            errors: 0,
            total_processed: 4,
        };
        assert_eq!(
            counts(4, &report),
            HarvestCounts {
                collected: 4,
                inserted: 3,
                duplicates: 1,
                errors: 0,
            }
        );
    }
}
