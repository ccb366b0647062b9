// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The claim/skip transaction.
//!
//! A job is claimable by runner R iff it is queued, or in progress and
//! already bound to R (recovery of an in-flight claim after a restart) —
//! and R has not recorded a skip for it. The row lock guarantees at most
//! one runner transitions a row out of `queued`; a runner that cannot
//! serve a job appends itself to `skipped_by_runners` under the same lock,
//! so it never redraws that row.

use crate::store::job_from_row;
use crate::QueueError;
use cino_core::{Job, JobStatus};
use sqlx::PgPool;
use tracing::debug;

const CLAIM_SQL: &str = "SELECT * FROM jobs \
     WHERE (status = 'queued' OR (status = 'in_progress' AND runner = $1)) \
       AND NOT ($1 = ANY(skipped_by_runners)) \
     ORDER BY id FOR UPDATE LIMIT 1";

/// Result of one claim attempt.
#[derive(Debug)]
pub enum ClaimOutcome<A> {
    /// Nothing claimable for this runner; park until notified.
    Empty,
    /// The runner recorded itself unable to serve the offered job.
    Skipped { job_id: i64 },
    /// The job is bound to this runner with a concrete device assignment.
    Claimed { job: Job, assignment: A },
}

/// One pass of the claim transaction for `runner_id`.
///
/// `judge` runs inside the row lock and decides whether the runner's local
/// devices satisfy the job: `None` records a skip, `Some` claims. Jobs are
/// offered in insertion order, so claims are approximately FIFO across the
/// fleet.
pub async fn claim_next<A>(
    pool: &PgPool,
    runner_id: &str,
    judge: impl FnOnce(&Job) -> Option<A>,
) -> Result<ClaimOutcome<A>, QueueError> {
    let mut tx = pool.begin().await?;
    let Some(row) = sqlx::query(CLAIM_SQL)
        .bind(runner_id)
        .fetch_optional(&mut *tx)
        .await?
    else {
        tx.commit().await?;
        return Ok(ClaimOutcome::Empty);
    };
    let mut job = job_from_row(&row)?;

    match judge(&job) {
        None => {
            debug!(job = job.id, runner = runner_id, "skipping unservable job");
            sqlx::query(
                "UPDATE jobs SET skipped_by_runners = array_append(skipped_by_runners, $1) \
                 WHERE id = $2",
            )
            .bind(runner_id)
            .bind(job.id)
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;
            Ok(ClaimOutcome::Skipped { job_id: job.id })
        }
        Some(assignment) => {
            debug!(job = job.id, runner = runner_id, "claiming job");
            sqlx::query(
                "UPDATE jobs SET status = 'in_progress', runner = $1, ts_start = now() \
                 WHERE id = $2",
            )
            .bind(runner_id)
            .bind(job.id)
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;
            job.status = JobStatus::InProgress;
            job.runner = Some(runner_id.to_string());
            Ok(ClaimOutcome::Claimed { job, assignment })
        }
    }
}
