//! Sentiment tagging and persistence of harvested articles.

use kwnews_core::{Article, TaggedArticle};
use kwnews_db::{ArticleStore, UpsertOutcome};
use kwnews_sentiment::SentimentClassifier;
use serde::Serialize;

use crate::collector::MultiQueryCollector;

/// Counters from one [`save_articles`] batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub inserted: usize,
    pub duplicates: usize,
    pub errors: usize,
    pub total_processed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollectAndSaveReport {
    /// Unique articles returned by the collector.
    pub collected: usize,
    #[serde(flatten)]
    pub save: SaveReport,
}

/// Classify each article's `"{title} {content}"` text.
#[must_use]
pub fn tag_articles(
    articles: Vec<Article>,
    classifier: &dyn SentimentClassifier,
) -> Vec<TaggedArticle> {
    articles
        .into_iter()
        .map(|article| {
            let sentiment = classifier.classify(&article.classification_text());
            TaggedArticle {
                article,
                sentiment: Some(sentiment),
            }
        })
        .collect()
}

/// Upsert every article, optionally tagging it first.
///
/// A store error on one article is logged and counted; the rest of the batch
/// still runs.
pub async fn save_articles<S: ArticleStore>(
    store: &S,
    articles: &[Article],
    classifier: Option<&dyn SentimentClassifier>,
) -> SaveReport {
    let mut report = SaveReport::default();

    for article in articles {
        let sentiment = classifier.map(|c| c.classify(&article.classification_text()));
        match store.upsert_by_url(article, sentiment.as_ref()).await {
            Ok(UpsertOutcome::Inserted) => report.inserted += 1,
            Ok(UpsertOutcome::Duplicate) => report.duplicates += 1,
            Err(e) => {
                report.errors += 1;
                tracing::warn!(url = %article.url, error = %e, "failed to save article");
            }
        }
        report.total_processed += 1;
    }

    tracing::info!(
        inserted = report.inserted,
        duplicates = report.duplicates,
        errors = report.errors,
        total = report.total_processed,
        "article batch saved"
    );

    report
}

/// Run an extensive collection and persist the results.
pub async fn collect_and_save<S: ArticleStore>(
    collector: &MultiQueryCollector,
    store: &S,
    classifier: Option<&dyn SentimentClassifier>,
    max_results: usize,
) -> CollectAndSaveReport {
    let articles = collector.collect_extensive(max_results).await;
    let save = save_articles(store, &articles, classifier).await;
    CollectAndSaveReport {
        collected: articles.len(),
        save,
    }
}
