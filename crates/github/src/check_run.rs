// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Check-run creation and updates.

use crate::{GithubError, StatusSink};
use chrono::{DateTime, Utc};
use cino_core::{CheckSuite, Job, JobStatus};
use octocrab::models::CheckRunId;
use octocrab::params::checks::{CheckRunConclusion, CheckRunOutput, CheckRunStatus};
use tracing::debug;

/// Human-facing body of a check-run update.
#[derive(Debug, Clone)]
pub struct CheckRunSummary {
    pub title: String,
    pub summary: String,
    /// Full report body (per-test output), if any.
    pub text: Option<String>,
}

/// One status push for an existing check run.
#[derive(Debug, Clone)]
pub struct CheckRunUpdate {
    pub status: JobStatus,
    pub output: Option<CheckRunSummary>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Map a queue status onto the check-run status/conclusion pair.
/// Terminal statuses complete the run; `skipped` is a completed run with
/// a `skipped` conclusion.
fn map_status(status: JobStatus) -> (CheckRunStatus, Option<CheckRunConclusion>) {
    match status {
        JobStatus::Queued => (CheckRunStatus::Queued, None),
        JobStatus::InProgress => (CheckRunStatus::InProgress, None),
        JobStatus::Success => (CheckRunStatus::Completed, Some(CheckRunConclusion::Success)),
        JobStatus::Failure => (CheckRunStatus::Completed, Some(CheckRunConclusion::Failure)),
        JobStatus::Skipped => (CheckRunStatus::Completed, Some(CheckRunConclusion::Skipped)),
    }
}

impl StatusSink {
    /// Create a queued check run for a job about to be dispatched.
    /// Returns the GitHub-side check-run id to store on the job row.
    pub async fn create_check_run(
        &self,
        suite: &CheckSuite,
        name: &str,
    ) -> Result<i64, GithubError> {
        let client = self.for_installation(suite.installation_id)?;
        let check_run = client
            .checks(&suite.repo_owner, &suite.repo_name)
            .create_check_run(name.to_string(), suite.commit_ref.clone())
            .status(CheckRunStatus::Queued)
            .send()
            .await?;
        debug!(check_run = check_run.id.0, name, "created check run");
        Ok(check_run.id.0 as i64)
    }

    /// Push a status update for a job's existing check run.
    pub async fn update_check_run(
        &self,
        suite: &CheckSuite,
        job: &Job,
        update: CheckRunUpdate,
    ) -> Result<(), GithubError> {
        let client = self.for_installation(suite.installation_id)?;
        let checks = client.checks(&suite.repo_owner, &suite.repo_name);
        let (status, conclusion) = map_status(update.status);

        let mut builder = checks
            .update_check_run(CheckRunId(job.github_check_run_id as u64))
            .status(status);
        if let Some(conclusion) = conclusion {
            builder = builder.conclusion(conclusion);
        }
        if let Some(output) = update.output {
            builder = builder.output(CheckRunOutput {
                title: output.title,
                summary: output.summary,
                text: output.text,
                annotations: Vec::new(),
                images: Vec::new(),
            });
        }
        if let Some(completed_at) = update.completed_at {
            builder = builder.completed_at(completed_at);
        }
        builder.send().await?;
        debug!(
            check_run = job.github_check_run_id,
            status = %update.status,
            "updated check run"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "check_run_tests.rs"]
mod tests;
