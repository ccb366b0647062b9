// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The scanner: pending check suites → job matrix.
//!
//! For each newly created check suite the repository is cloned and
//! inspected for tests. The job matrix is generated according to the
//! repository kind: libraries expand over architectures, cores over the
//! boards they provide, plain sketch collections dispatch as authored.

use crate::config::ServerConfig;
use cino_core::{dedup, identity, repeat, Axis, CheckSuite, TestRequirements};
use cino_github::StatusSink;
use cino_queue::NewJob;
use cino_scan::{clone_repo, core_boards, find_tests, library_architectures, PackageKind, ScanError};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};

/// Watch the check-suite channel and dispatch pending suites.
/// Returns only on a fatal queue error.
pub async fn watch(
    pool: PgPool,
    config: ServerConfig,
    sink: Arc<StatusSink>,
) -> anyhow::Result<()> {
    let error = cino_queue::listen_channel(&pool, cino_queue::NEW_CHECK_SUITES, || {
        scan_pending(&pool, &config, &sink)
    })
    .await;
    Err(error)
}

async fn scan_pending(
    pool: &PgPool,
    config: &ServerConfig,
    sink: &StatusSink,
) -> anyhow::Result<()> {
    for suite in cino_queue::pending_check_suites(pool).await? {
        info!(suite = suite.id, repo = %suite.clone_url, "processing check suite");
        scan_suite(pool, config, sink, &suite).await?;
    }
    Ok(())
}

/// Clone, discover, expand, and dispatch one suite.
async fn scan_suite(
    pool: &PgPool,
    config: &ServerConfig,
    sink: &StatusSink,
    suite: &CheckSuite,
) -> anyhow::Result<()> {
    let repo = clone_repo(&suite.clone_url, &suite.commit_ref).await?;

    let tests = match find_tests(repo.path()) {
        Ok(tests) => tests,
        Err(ScanError::NoTestsFound(_)) => {
            // Nothing to do for this suite; dispatch it empty so it is not
            // rescanned forever.
            warn!(suite = suite.id, "repository declares no tests");
            cino_queue::dispatch_jobs(pool, suite.id, &[]).await?;
            return Ok(());
        }
        Err(error) => return Err(error.into()),
    };
    let kind = tests
        .first()
        .map(|test| test.kind)
        .unwrap_or(PackageKind::SketchCollection);
    let templates: Vec<TestRequirements> =
        tests.iter().map(|test| test.requirements()).collect();

    let matrix = match kind {
        PackageKind::Library => {
            let declared = match library_architectures(repo.path()) {
                Ok(architectures) => architectures,
                Err(error) => {
                    warn!(suite = suite.id, %error, "failed to get architectures for library");
                    return Ok(());
                }
            };
            let architectures = effective_architectures(declared, &config.architectures);
            dedup(repeat(&templates, &architectures, Axis::Architecture))
        }
        PackageKind::Core => {
            let boards = match core_boards(repo.path()) {
                Ok(boards) => boards,
                Err(error) => {
                    warn!(suite = suite.id, %error, "failed to get boards for core");
                    return Ok(());
                }
            };
            dedup(repeat(&templates, &boards, Axis::Fqbn))
        }
        PackageKind::SketchCollection => dedup(identity(&templates)),
    };

    let mut jobs = Vec::with_capacity(matrix.len());
    for entry in matrix {
        let test_paths: Vec<String> = tests
            .iter()
            .filter(|test| test.requirements().eq_unordered(&entry.original))
            .map(|test| test.rel_path())
            .collect();
        let name = entry.display_name();
        let check_run_id = sink.create_check_run(suite, &name).await?;
        info!(check_run = check_run_id, name = %name, "created GitHub check run");
        jobs.push(NewJob {
            github_check_run_id: check_run_id,
            requirements: entry,
            test_paths,
        });
    }

    cino_queue::dispatch_jobs(pool, suite.id, &jobs).await?;
    Ok(())
}

/// Resolve a library's declared architectures against the configured
/// fleet list: a sole `"*"` takes the configured list wholesale; otherwise
/// a non-empty configured list filters the declared one, keeping the
/// declared order.
fn effective_architectures(declared: Vec<String>, configured: &[String]) -> Vec<String> {
    if declared.len() == 1 && declared[0] == "*" {
        return configured.to_vec();
    }
    if configured.is_empty() {
        return declared;
    }
    declared
        .into_iter()
        .filter(|architecture| configured.contains(architecture))
        .collect()
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
