// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The reconciliation transaction.
//!
//! Same row-locked shape as the claim transaction, so several coordinator
//! replicas could share the work. A job needs reconciling when its external
//! status trails its real status, or when every configured runner has
//! skipped a queued job (at which point it is definitively skipped).

use crate::store::{job_from_row, suite_from_row};
use crate::QueueError;
use cino_core::{CheckSuite, Job, JobStatus};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

const RECONCILE_SQL: &str = "SELECT * FROM jobs \
     WHERE (status = 'queued' AND skipped_by_runners @> $1) \
        OR (status IN ('in_progress', 'success', 'failure', 'skipped') \
            AND github_status IS DISTINCT FROM status) \
     ORDER BY id FOR UPDATE LIMIT 1";

/// A job locked for reconciliation, with its owning suite.
///
/// The queued→skipped rewrite and the `github_status` stamp are already
/// applied to the row (and mirrored on `job`), but remain uncommitted: the
/// caller reports to the status sink first and commits after, so a failed
/// report rolls back and the job is retried.
pub struct PendingReconcile {
    tx: Transaction<'static, Postgres>,
    pub job: Job,
    pub suite: CheckSuite,
}

impl PendingReconcile {
    pub async fn commit(self) -> Result<(), QueueError> {
        self.tx.commit().await?;
        Ok(())
    }
}

/// Lock the next job whose status must be pushed to the external sink.
/// `runner_ids` is the full set of configured runners, for the definitive
/// skip criterion.
pub async fn next_reconcilable(
    pool: &PgPool,
    runner_ids: &[String],
) -> Result<Option<PendingReconcile>, QueueError> {
    let mut tx = pool.begin().await?;
    let Some(row) = sqlx::query(RECONCILE_SQL)
        .bind(runner_ids.to_vec())
        .fetch_optional(&mut *tx)
        .await?
    else {
        tx.commit().await?;
        return Ok(None);
    };
    let mut job = job_from_row(&row)?;

    if job.status == JobStatus::Queued {
        // Every configured runner has declined: definitively skipped.
        job.status = JobStatus::Skipped;
    }
    job.github_status = Some(job.status);
    debug!(job = job.id, status = %job.status, "reconciling");
    sqlx::query("UPDATE jobs SET status = $1, github_status = $2 WHERE id = $3")
        .bind(job.status.as_str())
        .bind(job.status.as_str())
        .bind(job.id)
        .execute(&mut *tx)
        .await?;

    let suite_row = sqlx::query("SELECT * FROM check_suites WHERE id = $1")
        .bind(job.check_suite_id)
        .fetch_one(&mut *tx)
        .await?;
    let suite = suite_from_row(&suite_row)?;

    Ok(Some(PendingReconcile { tx, job, suite }))
}
