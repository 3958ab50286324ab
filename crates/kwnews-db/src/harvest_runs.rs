//! Database operations for the `harvest_runs` bookkeeping table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const RUN_COLUMNS: &str = "id, public_id, run_type, trigger_source, status, \
     collected, inserted, duplicates, errors, started_at, completed_at, error_message, created_at";

/// A row from the `harvest_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HarvestRunRow {
    pub id: i64,
    pub public_id: Uuid,
    /// `query` or `extensive`.
    pub run_type: String,
    /// `cli`, `api`, or `scheduler`.
    pub trigger_source: String,
    pub status: String,
    pub collected: i32,
    pub inserted: i32,
    pub duplicates: i32,
    pub errors: i32,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Final counters recorded on a successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestCounts {
    pub collected: i32,
    pub inserted: i32,
    pub duplicates: i32,
    pub errors: i32,
}

/// Creates a new harvest run in `running` status with `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including check-constraint
/// violations for unknown `run_type` / `trigger_source` values.
pub async fn create_harvest_run(
    pool: &PgPool,
    run_type: &str,
    trigger_source: &str,
) -> Result<HarvestRunRow, DbError> {
    let row = sqlx::query_as::<_, HarvestRunRow>(&format!(
        "INSERT INTO harvest_runs (public_id, run_type, trigger_source, status) \
         VALUES ($1, $2, $3, 'running') \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(run_type)
    .bind(trigger_source)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a run as `succeeded` and records its counters.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `running`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn complete_harvest_run(
    pool: &PgPool,
    id: i64,
    counts: HarvestCounts,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE harvest_runs \
         SET status = 'succeeded', completed_at = NOW(), \
             collected = $1, inserted = $2, duplicates = $3, errors = $4 \
         WHERE id = $5 AND status = 'running'",
    )
    .bind(counts.collected)
    .bind(counts.inserted)
    .bind(counts.duplicates)
    .bind(counts.errors)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a run as `failed`, sets `completed_at = NOW()` and `error_message`.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `running`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn fail_harvest_run(pool: &PgPool, id: i64, error_message: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE harvest_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_harvest_run(pool: &PgPool, id: i64) -> Result<HarvestRunRow, DbError> {
    sqlx::query_as::<_, HarvestRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM harvest_runs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Returns the most recent `limit` runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_harvest_runs(pool: &PgPool, limit: i64) -> Result<Vec<HarvestRunRow>, DbError> {
    let rows = sqlx::query_as::<_, HarvestRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM harvest_runs ORDER BY created_at DESC, id DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
