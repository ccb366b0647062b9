// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection handling and row persistence.

use crate::QueueError;
use cino_core::{
    CheckSuite, Job, JobStatus, ParseStatusError, RequirementsMatrix, TestResult,
};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};

/// Connect to the queue database and apply pending migrations.
pub async fn connect(dsn: &str) -> Result<PgPool, QueueError> {
    let pool = PgPoolOptions::new().max_connections(5).connect(dsn).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

fn parse_status<T>(id: i64, value: &str) -> Result<T, QueueError>
where
    T: std::str::FromStr<Err = ParseStatusError>,
{
    value.parse().map_err(|e: ParseStatusError| QueueError::CorruptRow {
        id,
        reason: e.to_string(),
    })
}

pub(crate) fn suite_from_row(row: &PgRow) -> Result<CheckSuite, QueueError> {
    let id: i64 = row.try_get("id")?;
    let status: String = row.try_get("status")?;
    Ok(CheckSuite {
        id,
        github_id: row.try_get("github_id")?,
        status: parse_status(id, &status)?,
        installation_id: row.try_get("github_installation_id")?,
        repo_name: row.try_get("repo_name")?,
        repo_owner: row.try_get("repo_owner")?,
        clone_url: row.try_get("repo_clone_url")?,
        commit_ref: row.try_get("commit_ref")?,
        created_at: row.try_get("created")?,
    })
}

pub(crate) fn job_from_row(row: &PgRow) -> Result<Job, QueueError> {
    let id: i64 = row.try_get("id")?;
    let status: String = row.try_get("status")?;
    let github_status: Option<String> = row.try_get("github_status")?;
    let requirements: Json<RequirementsMatrix> = row.try_get("test_requirements")?;
    let results: Option<Json<Vec<TestResult>>> = row.try_get("test_results")?;
    Ok(Job {
        id,
        check_suite_id: row.try_get("check_suite")?,
        github_check_run_id: row.try_get("github_check_run_id")?,
        status: parse_status(id, &status)?,
        github_status: github_status
            .as_deref()
            .map(|s| parse_status(id, s))
            .transpose()?,
        runner: row.try_get("runner")?,
        skipped_by_runners: row.try_get("skipped_by_runners")?,
        requirements: requirements.0,
        results: results.map(|json| json.0).unwrap_or_default(),
        test_paths: row.try_get("test_paths")?,
        started_at: row.try_get("ts_start")?,
        finished_at: row.try_get("ts_end")?,
    })
}

/// A suite as delivered by the hook endpoint, before it has a row id.
#[derive(Debug, Clone)]
pub struct NewCheckSuite {
    pub github_id: i64,
    pub installation_id: i64,
    pub repo_owner: String,
    pub repo_name: String,
    pub clone_url: String,
    pub commit_ref: String,
}

/// Insert a pending check suite. The insert trigger announces it on
/// [`crate::NEW_CHECK_SUITES`].
pub async fn insert_check_suite(pool: &PgPool, suite: &NewCheckSuite) -> Result<(), QueueError> {
    sqlx::query(
        "INSERT INTO check_suites \
         (github_id, github_installation_id, repo_name, repo_owner, repo_clone_url, commit_ref) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(suite.github_id)
    .bind(suite.installation_id)
    .bind(&suite.repo_name)
    .bind(&suite.repo_owner)
    .bind(&suite.clone_url)
    .bind(&suite.commit_ref)
    .execute(pool)
    .await?;
    Ok(())
}

/// All suites not yet dispatched, oldest first.
pub async fn pending_check_suites(pool: &PgPool) -> Result<Vec<CheckSuite>, QueueError> {
    let rows = sqlx::query("SELECT * FROM check_suites WHERE status = 'pending' ORDER BY id")
        .fetch_all(pool)
        .await?;
    rows.iter().map(suite_from_row).collect()
}

/// Fetch one suite by row id.
pub async fn check_suite(pool: &PgPool, id: i64) -> Result<CheckSuite, QueueError> {
    let row = sqlx::query("SELECT * FROM check_suites WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await?;
    suite_from_row(&row)
}

/// One matrix entry ready to be queued.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub github_check_run_id: i64,
    pub requirements: RequirementsMatrix,
    /// Repo-relative paths of the tests this entry was expanded from.
    pub test_paths: Vec<String>,
}

/// Mark the suite dispatched and insert its job matrix, atomically.
/// The insert trigger announces each job on [`crate::NEW_JOBS`].
pub async fn dispatch_jobs(
    pool: &PgPool,
    suite_id: i64,
    jobs: &[NewJob],
) -> Result<(), QueueError> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE check_suites SET status = 'dispatched' WHERE id = $1")
        .bind(suite_id)
        .execute(&mut *tx)
        .await?;
    for job in jobs {
        sqlx::query(
            "INSERT INTO jobs \
             (check_suite, github_check_run_id, status, github_status, test_requirements, test_paths) \
             VALUES ($1, $2, 'queued', 'queued', $3, $4)",
        )
        .bind(suite_id)
        .bind(job.github_check_run_id)
        .bind(Json(&job.requirements))
        .bind(&job.test_paths)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Freeze a finished job with its realized results.
pub async fn finish_job(
    pool: &PgPool,
    id: i64,
    status: JobStatus,
    results: &[TestResult],
) -> Result<(), QueueError> {
    sqlx::query("UPDATE jobs SET status = $1, test_results = $2, ts_end = now() WHERE id = $3")
        .bind(status.as_str())
        .bind(Json(results))
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Return a claimed job to the queue, recording that the claiming runner
/// could not actually serve it.
pub async fn requeue_job(pool: &PgPool, id: i64, runner_id: &str) -> Result<(), QueueError> {
    sqlx::query(
        "UPDATE jobs SET status = 'queued', runner = NULL, ts_start = NULL, \
         skipped_by_runners = array_append(skipped_by_runners, $1) WHERE id = $2",
    )
    .bind(runner_id)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}
