// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot mode: run the tests under the given paths on the configured
//! (or flag-supplied) devices, without touching the queue.

use crate::config::RunnerConfig;
use crate::devices::assign_devices;
use crate::exec::TestDriver;
use cino_core::TestStatus;
use cino_scan::find_tests;
use std::path::PathBuf;
use tracing::warn;

/// Returns overall success: false if any test failed or could not be
/// served by the local devices.
pub async fn run(
    config: &RunnerConfig,
    paths: &[PathBuf],
    driver: &dyn TestDriver,
) -> anyhow::Result<bool> {
    let mut success = true;
    for path in paths {
        let tests = find_tests(path)?;
        println!("Running {} test(s) in {}", tests.len(), path.display());

        for test in &tests {
            println!("Running test in {}", test.rel_path());
            let Some(devices) =
                assign_devices(&test.requirements(), &config.wiring, &config.devices)
            else {
                warn!(path = %test.rel_path(), "no matching devices for test");
                println!("No matching devices; test not run");
                success = false;
                continue;
            };

            let result = driver.run_test(test, &devices).await?;
            print!("{}", result.output);
            if result.status == TestStatus::Failure {
                success = false;
            }
        }
    }
    Ok(success)
}
