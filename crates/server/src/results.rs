// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The results reconciler: job status → GitHub check runs.
//!
//! Watches the job-change channel and pushes every divergence between the
//! queue status and the externally reported one, including the definitive
//! queued→skipped rewrite once every configured runner has declined a job.

use crate::config::ServerConfig;
use cino_core::{Job, JobStatus, TestRequirements};
use cino_github::{CheckRunSummary, CheckRunUpdate, StatusSink};
use sqlx::PgPool;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::info;

/// Watch the job-change channel and reconcile until a fatal queue error.
pub async fn watch(
    pool: PgPool,
    config: ServerConfig,
    sink: Arc<StatusSink>,
) -> anyhow::Result<()> {
    let runner_ids = config.runner_ids();
    let error = cino_queue::listen_channel(&pool, cino_queue::CHANGED_JOBS, || {
        drain(&pool, &runner_ids, &sink)
    })
    .await;
    Err(error)
}

async fn drain(
    pool: &PgPool,
    runner_ids: &[String],
    sink: &StatusSink,
) -> anyhow::Result<()> {
    while let Some(pending) = cino_queue::next_reconcilable(pool, runner_ids).await? {
        info!(
            job = pending.job.id,
            status = %pending.job.status,
            "reporting job status"
        );
        let update = render_update(&pending.job);
        sink.update_check_run(&pending.suite, &pending.job, update)
            .await?;
        pending.commit().await?;
    }
    Ok(())
}

/// Build the check-run payload for a job's current status.
fn render_update(job: &Job) -> CheckRunUpdate {
    let output = match job.status {
        JobStatus::Skipped => Some(CheckRunSummary {
            title: "No suitable device".to_string(),
            summary: skipped_summary(&job.requirements.effective),
            text: None,
        }),
        JobStatus::Success | JobStatus::Failure if !job.results.is_empty() => {
            Some(CheckRunSummary {
                title: if job.status == JobStatus::Success {
                    "All tests passed".to_string()
                } else {
                    "Tests failed".to_string()
                },
                summary: run_summary(job),
                text: Some(job.report()),
            })
        }
        _ => None,
    };
    CheckRunUpdate {
        status: job.status,
        output,
        completed_at: job.finished_at,
    }
}

/// Describe the requirements no runner could satisfy.
fn skipped_summary(requirements: &TestRequirements) -> String {
    let mut out = String::from("No suitable runners matching the following features:\n\n");
    if !requirements.wiring.is_empty() {
        let _ = writeln!(out, "* {}", requirements.wiring.join(", "));
    }
    for sketch in &requirements.sketches {
        out.push_str("* Device:\n");
        if !sketch.architecture.is_empty() {
            let _ = writeln!(out, "   * Architecture: {}", sketch.architecture);
        }
        if !sketch.fqbn.is_empty() {
            let _ = writeln!(out, "   * Board: {}", sketch.fqbn);
        }
        if !sketch.features.is_empty() {
            let _ = writeln!(out, "   * Features: {}", sketch.features.join(", "));
        }
    }
    out
}

/// List what ran, where, and on which boards.
fn run_summary(job: &Job) -> String {
    let mut out = format!("{} test(s) were run:\n\n", job.results.len());
    for result in &job.results {
        let _ = writeln!(out, "* `{}`", result.path);
    }
    let _ = writeln!(
        out,
        "\nusing the following board(s) attached to **{}**:\n",
        job.runner.as_deref().unwrap_or("unknown")
    );
    for fqbn in job.device_fqbns() {
        let _ = writeln!(out, "* {fqbn}");
    }
    out
}

#[cfg(test)]
#[path = "results_tests.rs"]
mod tests;
