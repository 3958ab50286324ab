use std::collections::HashSet;

use kwnews_core::Article;

/// Keep the first article seen for each URL, preserving input order.
///
/// Articles whose URL is empty or whitespace-only are dropped.
#[must_use]
pub fn dedupe_by_url(mut articles: Vec<Article>) -> Vec<Article> {
    let mut seen: HashSet<String> = HashSet::with_capacity(articles.len());
    articles.retain(|a| !a.url.trim().is_empty() && seen.insert(a.url.clone()));
    articles
}
