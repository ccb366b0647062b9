// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cino-queue: the shared PostgreSQL job queue.
//!
//! Holds the `check_suites` and `jobs` tables, the claim/skip transaction
//! runners use to pull work, the reconciliation transaction the server uses
//! to push status out, and the LISTEN/NOTIFY subscription loop.

pub mod claim;
pub mod listen;
pub mod reconcile;
pub mod store;

use thiserror::Error;

pub use claim::{claim_next, ClaimOutcome};
pub use listen::listen_channel;
pub use reconcile::{next_reconcilable, PendingReconcile};
pub use store::{
    check_suite, connect, dispatch_jobs, finish_job, insert_check_suite, pending_check_suites,
    requeue_job, NewCheckSuite, NewJob,
};

/// Channel fired after the hook endpoint inserts a suite.
pub const NEW_CHECK_SUITES: &str = "new_check_suites";
/// Channel fired after the scanner inserts jobs (and on requeues).
pub const NEW_JOBS: &str = "new_jobs";
/// Channel fired on any job mutation.
pub const CHANGED_JOBS: &str = "changed_jobs";

/// Errors from the queue store.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error(transparent)]
    Db(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("corrupt row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },
}
