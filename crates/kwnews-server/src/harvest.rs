//! Collect-and-save runs recorded in the `harvest_runs` table.

use kwnews_collector::{collect_and_save, CollectAndSaveReport, MultiQueryCollector};
use kwnews_db::{DbError, HarvestCounts, PgArticleStore};
use kwnews_sentiment::SentimentClassifier;
use serde::Serialize;
use uuid::Uuid;

/// Who started a run, stored as `harvest_runs.trigger_source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Api,
    Scheduler,
}

impl Trigger {
    fn as_str(self) -> &'static str {
        match self {
            Trigger::Api => "api",
            Trigger::Scheduler => "scheduler",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackedRun {
    pub run_id: Uuid,
    #[serde(flatten)]
    pub report: CollectAndSaveReport,
}

/// Run an extensive collect-and-save and record it as a harvest run.
///
/// # Errors
///
/// Returns [`DbError`] if the run row cannot be created or finalized.
pub async fn run_tracked_collection(
    store: &PgArticleStore,
    collector: &MultiQueryCollector,
    classifier: &dyn SentimentClassifier,
    max_results: usize,
    trigger: Trigger,
) -> Result<TrackedRun, DbError> {
    let pool = store.pool();
    let run = kwnews_db::create_harvest_run(pool, "extensive", trigger.as_str()).await?;
    tracing::info!(
        run_id = run.id,
        trigger = trigger.as_str(),
        max_results,
        "harvest run started"
    );

    let report = collect_and_save(collector, store, Some(classifier), max_results).await;

    if let Err(e) = kwnews_db::complete_harvest_run(pool, run.id, counts(&report)).await {
        tracing::error!(run_id = run.id, error = %e, "failed to complete harvest run");
        if let Err(mark_err) =
            kwnews_db::fail_harvest_run(pool, run.id, &format!("{e:#}")).await
        {
            tracing::error!(
                run_id = run.id,
                error = %mark_err,
                "failed to mark harvest run as failed"
            );
        }
        return Err(e);
    }

    tracing::info!(
        run_id = run.id,
        collected = report.collected,
        inserted = report.save.inserted,
        duplicates = report.save.duplicates,
        errors = report.save.errors,
        "harvest run succeeded"
    );

    Ok(TrackedRun {
        run_id: run.public_id,
        report,
    })
}

fn counts(report: &CollectAndSaveReport) -> HarvestCounts {
    let to_i32 = |n: usize| i32::try_from(n).unwrap_or(i32::MAX);
    HarvestCounts {
        collected: to_i32(report.collected),
        inserted: to_i32(report.save.inserted),
        duplicates: to_i32(report.save.duplicates),
        errors: to_i32(report.save.errors),
    }
}

#[cfg(test)]
mod tests {
    use kwnews_collector::SaveReport;

    use super::*;

    #[test]
    fn counts_copy_report_fields() {
        let report = CollectAndSaveReport {
            collected: 12,
            save: SaveReport {
                inserted: 9,
                duplicates: 2,
                errors: 1,
                total_processed: 12,
            },
        };
        assert_eq!(
            counts(&report),
            HarvestCounts {
                collected: 12,
                inserted: 9,
                duplicates: 2,
                errors: 1,
            }
        );
    }

    #[test]
    fn trigger_names_match_table_constraint() {
        assert_eq!(Trigger::Api.as_str(), "api");
        assert_eq!(Trigger::Scheduler.as_str(), "scheduler");
    }
}
