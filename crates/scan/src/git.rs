// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shallow repository cloning.

use crate::ScanError;
use std::path::Path;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::debug;

/// A checked-out working tree in a temporary directory.
///
/// The directory is removed when the value is dropped.
pub struct ClonedRepo {
    dir: TempDir,
}

impl ClonedRepo {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Fetch exactly one commit of `clone_url` into a fresh temp directory.
pub async fn clone_repo(clone_url: &str, commit_ref: &str) -> Result<ClonedRepo, ScanError> {
    let dir = tempfile::Builder::new().prefix(".cino-clone").tempdir()?;

    let steps: &[&[&str]] = &[
        &["init"],
        &["remote", "add", "origin", clone_url],
        &["fetch", "--depth", "1", "origin", commit_ref],
        &["checkout", "FETCH_HEAD"],
    ];
    for args in steps {
        debug!(dir = %dir.path().display(), args = ?args, "git");
        let output = Command::new("git")
            .args(*args)
            .current_dir(dir.path())
            .output()
            .await?;
        if !output.status.success() {
            return Err(ScanError::Git {
                command: args.join(" "),
                output: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
    }

    Ok(ClonedRepo { dir })
}
