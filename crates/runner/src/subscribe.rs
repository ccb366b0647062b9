// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The subscribe loop: wait for queue notifications, claim what we can
//! serve, run it, write the outcome back.

use crate::config::RunnerConfig;
use crate::devices::{assign_devices, Device};
use crate::exec::TestDriver;
use anyhow::Context;
use cino_core::{Job, JobStatus, TestResult, TestStatus};
use cino_queue::{claim_next, ClaimOutcome};
use cino_scan::{clone_repo, find_tests, DiscoveredTest};
use sqlx::PgPool;
use tracing::{debug, info, warn};

/// Validate the config, connect, and serve jobs until a fatal error.
pub async fn subscribe(config: &RunnerConfig, driver: &dyn TestDriver) -> anyhow::Result<()> {
    config.validate_for_subscribe()?;
    let pool = cino_queue::connect(&config.db.dsn)
        .await
        .context("connecting to the queue database")?;

    info!(runner = %config.runner_id, "waiting for jobs");
    let error = cino_queue::listen_channel(&pool, cino_queue::NEW_JOBS, || {
        drain_queue(&pool, config, driver)
    })
    .await;
    Err(error)
}

/// Retry the claim transaction until the queue offers nothing more.
async fn drain_queue(
    pool: &PgPool,
    config: &RunnerConfig,
    driver: &dyn TestDriver,
) -> anyhow::Result<()> {
    loop {
        let outcome = claim_next(pool, &config.runner_id, |job| {
            assign_devices(&job.requirements.effective, &config.wiring, &config.devices)
        })
        .await?;
        match outcome {
            ClaimOutcome::Empty => return Ok(()),
            ClaimOutcome::Skipped { job_id } => {
                info!(job = job_id, "skipped job we cannot serve");
            }
            ClaimOutcome::Claimed { job, assignment } => {
                run_claimed_job(pool, config, driver, job, assignment).await?;
            }
        }
    }
}

/// Execute one claimed job end to end and persist its outcome.
async fn run_claimed_job(
    pool: &PgPool,
    config: &RunnerConfig,
    driver: &dyn TestDriver,
    mut job: Job,
    devices: Vec<Device>,
) -> anyhow::Result<()> {
    info!(job = job.id, "processing job");

    let suite = cino_queue::check_suite(pool, job.check_suite_id).await?;
    let repo = clone_repo(&suite.clone_url, &suite.commit_ref).await?;
    let tests = find_tests(repo.path())?;

    let matching: Vec<&DiscoveredTest> = tests
        .iter()
        .filter(|test| {
            let matches = test
                .requirements()
                .eq_unordered(&job.requirements.original);
            if !matches {
                debug!(
                    job = job.id,
                    path = %test.rel_path(),
                    "skipping test with other requirements"
                );
            }
            matches
        })
        .collect();

    // Cross-check against the paths recorded at dispatch: a listed test
    // that is gone, or whose authored requirements diverged, must not be
    // dropped silently.
    let mut results = Vec::new();
    for path in &job.test_paths {
        if !matching.iter().any(|test| &test.rel_path() == path) {
            warn!(job = job.id, path = %path, "dispatched test is missing or diverged");
            results.push(TestResult {
                path: path.clone(),
                status: TestStatus::Failure,
                output: "Test is missing or its requirements changed since dispatch\n"
                    .to_string(),
                device_fqbns: Vec::new(),
            });
        }
    }

    // Driver errors fail the job and are recorded in its result body; they
    // do not stall the queue.
    for test in matching {
        match driver.run_test(test, &devices).await {
            Ok(result) => results.push(result),
            Err(error) => {
                warn!(job = job.id, path = %test.rel_path(), %error, "test execution failed");
                results.push(TestResult {
                    path: test.rel_path(),
                    status: TestStatus::Failure,
                    output: format!("Execution error: {error}\n"),
                    device_fqbns: devices.iter().map(|d| d.fqbn.clone()).collect(),
                });
            }
        }
    }
    job.results = results;

    let status = job.status_from_results();
    if status == JobStatus::Skipped {
        // Nothing actually ran; put the job back for another runner.
        cino_queue::requeue_job(pool, job.id, &config.runner_id).await?;
    } else {
        cino_queue::finish_job(pool, job.id, status, &job.results).await?;
    }
    info!(job = job.id, %status, "job completed");
    Ok(())
}
