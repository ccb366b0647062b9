// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job rows and realized test results.

use crate::requirements::RequirementsMatrix;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Queue status of a job. The externally reported status
/// ([`Job::github_status`]) trails this value and converges to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    InProgress,
    Success,
    Failure,
    Skipped,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::InProgress => "in_progress",
            JobStatus::Success => "success",
            JobStatus::Failure => "failure",
            JobStatus::Skipped => "skipped",
        }
    }

    /// Once terminal, runner, results, and end time are frozen.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Success | JobStatus::Failure | JobStatus::Skipped
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a status string read back from storage.
#[derive(Debug, thiserror::Error)]
#[error("unknown job status: {0}")]
pub struct ParseStatusError(pub String);

impl std::str::FromStr for JobStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(JobStatus::Queued),
            "in_progress" => Ok(JobStatus::InProgress),
            "success" => Ok(JobStatus::Success),
            "failure" => Ok(JobStatus::Failure),
            "skipped" => Ok(JobStatus::Skipped),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// Outcome of a single executed test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Success,
    Failure,
}

/// Realized outcome of one test within a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    /// Test directory, relative to the repository root.
    pub path: String,
    pub status: TestStatus,
    /// Concatenated driver output (compile, upload, serial).
    pub output: String,
    /// FQBNs of the devices the test's sketches ran on.
    pub device_fqbns: Vec<String>,
}

/// One unit of work, claimable by exactly one runner.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: i64,
    pub check_suite_id: i64,
    pub github_check_run_id: i64,
    pub status: JobStatus,
    /// Last status reported to GitHub; may lag `status`.
    pub github_status: Option<JobStatus>,
    /// Runner currently bound to the job, if any.
    pub runner: Option<String>,
    /// Runners that declared inability to serve this job. Grows
    /// monotonically over the job's lifetime.
    pub skipped_by_runners: Vec<String>,
    pub requirements: RequirementsMatrix,
    pub results: Vec<TestResult>,
    /// Repo-relative paths of the tests this entry was expanded from.
    pub test_paths: Vec<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Human-readable name, used as the GitHub check-run title.
    pub fn display_name(&self) -> String {
        self.requirements.display_name()
    }

    /// Unique device FQBNs used across all results, in first-use order.
    pub fn device_fqbns(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for result in &self.results {
            for fqbn in &result.device_fqbns {
                if !out.contains(fqbn) {
                    out.push(fqbn.clone());
                }
            }
        }
        out
    }

    /// Aggregate status over the realized results.
    ///
    /// Starts at `skipped`, upgrades to `success` if any test passed,
    /// downgrades to `failure` if any test failed; `failure` is sticky.
    pub fn status_from_results(&self) -> JobStatus {
        let mut status = JobStatus::Skipped;
        for result in &self.results {
            match result.status {
                TestStatus::Success if status == JobStatus::Skipped => {
                    status = JobStatus::Success;
                }
                TestStatus::Failure => status = JobStatus::Failure,
                TestStatus::Success => {}
            }
        }
        status
    }

    /// Concatenated per-test output, one section per executed test.
    pub fn report(&self) -> String {
        let mut out = String::new();
        for result in &self.results {
            out.push_str(&format!("Running test in {}:\n", result.path));
            out.push_str(&result.output);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
