//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring harvest when `KWNEWS_COLLECT_SCHEDULE` is set.

use std::sync::Arc;

use kwnews_core::AppConfig;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::api::AppState;
use crate::harvest::{run_tracked_collection, Trigger};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    state: AppState,
    config: Arc<AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match (config.collect_schedule.as_deref(), state.collector.is_some()) {
        (Some(cron), true) => {
            register_collection_job(&scheduler, cron, state, config.collect_max_results).await?;
        }
        (Some(_), false) => {
            tracing::warn!(
                "scheduler: KWNEWS_COLLECT_SCHEDULE set but Naver credentials are missing; \
                 scheduled harvest disabled"
            );
        }
        (None, _) => tracing::info!("scheduler: no collection schedule configured"),
    }

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the recurring extensive collect-and-save job.
async fn register_collection_job(
    scheduler: &JobScheduler,
    cron: &str,
    state: AppState,
    max_results: usize,
) -> Result<(), JobSchedulerError> {
    let state = Arc::new(state);

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let state = Arc::clone(&state);

        Box::pin(async move {
            tracing::info!("scheduler: starting news collection run");
            run_collection_job(&state, max_results).await;
            tracing::info!("scheduler: news collection run complete");
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, max_results, "scheduler: registered news collection job");
    Ok(())
}

async fn run_collection_job(state: &AppState, max_results: usize) {
    let Some(collector) = state.collector.as_deref() else {
        return;
    };

    if let Err(e) = run_tracked_collection(
        &state.store,
        collector,
        state.classifier.as_ref(),
        max_results,
        Trigger::Scheduler,
    )
    .await
    {
        tracing::error!(error = %e, "scheduler: news collection run failed");
    }
}
