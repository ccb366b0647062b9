// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{TimeZone, Utc};
use cino_core::{
    RequirementsMatrix, SketchRequirement, TestResult, TestStatus,
};

fn requirements(wiring: &[&str], sketches: Vec<SketchRequirement>) -> TestRequirements {
    TestRequirements {
        wiring: wiring.iter().map(|s| s.to_string()).collect(),
        sketches,
    }
}

fn job(status: JobStatus, requirements: TestRequirements, results: Vec<TestResult>) -> Job {
    Job {
        id: 7,
        check_suite_id: 1,
        github_check_run_id: 99,
        status,
        github_status: Some(status),
        runner: Some("bench-1".to_string()),
        skipped_by_runners: Vec::new(),
        requirements: RequirementsMatrix {
            original: requirements.clone(),
            effective: requirements,
        },
        results,
        test_paths: Vec::new(),
        started_at: None,
        finished_at: Some(Utc.with_ymd_and_hms(2021, 3, 14, 15, 9, 26).single().unwrap()),
    }
}

fn passed(path: &str, fqbn: &str) -> TestResult {
    TestResult {
        path: path.to_string(),
        status: TestStatus::Success,
        output: format!("ran {path}\n"),
        device_fqbns: vec![fqbn.to_string()],
    }
}

#[test]
fn in_progress_update_has_no_output() {
    let update = render_update(&job(
        JobStatus::InProgress,
        requirements(&[], Vec::new()),
        Vec::new(),
    ));
    assert_eq!(update.status, JobStatus::InProgress);
    assert!(update.output.is_none());
}

#[test]
fn skipped_update_describes_unmet_requirements() {
    let update = render_update(&job(
        JobStatus::Skipped,
        requirements(
            &["i2c"],
            vec![SketchRequirement {
                fqbn: "arduino:avr:uno".to_string(),
                architecture: "avr".to_string(),
                features: vec!["wifi".to_string()],
            }],
        ),
        Vec::new(),
    ));

    let output = update.output.expect("skipped update carries output");
    assert_eq!(output.title, "No suitable device");
    assert!(output.summary.contains("* i2c\n"));
    assert!(output.summary.contains("* Device:\n"));
    assert!(output.summary.contains("   * Architecture: avr\n"));
    assert!(output.summary.contains("   * Board: arduino:avr:uno\n"));
    assert!(output.summary.contains("   * Features: wifi\n"));
    assert!(output.text.is_none());
}

#[test]
fn success_update_lists_tests_runner_and_boards() {
    let update = render_update(&job(
        JobStatus::Success,
        requirements(&[], Vec::new()),
        vec![
            passed("tests/a", "arduino:avr:uno"),
            passed("tests/b", "arduino:avr:nano"),
        ],
    ));

    let output = update.output.expect("terminal update carries output");
    assert_eq!(output.title, "All tests passed");
    assert!(output.summary.starts_with("2 test(s) were run:"));
    assert!(output.summary.contains("* `tests/a`\n"));
    assert!(output.summary.contains("* `tests/b`\n"));
    assert!(output.summary.contains("**bench-1**"));
    assert!(output.summary.contains("* arduino:avr:uno\n"));
    assert!(output.summary.contains("* arduino:avr:nano\n"));
    let text = output.text.expect("report body present");
    assert!(text.contains("Running test in tests/a:\nran tests/a\n"));
    assert!(update.completed_at.is_some());
}

#[test]
fn failure_update_uses_the_failed_title() {
    let mut result = passed("tests/a", "uno");
    result.status = TestStatus::Failure;
    let update = render_update(&job(
        JobStatus::Failure,
        requirements(&[], Vec::new()),
        vec![result],
    ));
    assert_eq!(update.output.expect("output").title, "Tests failed");
}

#[test]
fn terminal_update_without_results_has_no_output() {
    // A failure written by something other than a normal run (no realized
    // results) still completes the check run, just without a body.
    let update = render_update(&job(
        JobStatus::Failure,
        requirements(&[], Vec::new()),
        Vec::new(),
    ));
    assert!(update.output.is_none());
}
