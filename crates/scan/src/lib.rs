// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cino-scan: repository classification, test discovery, and cloning.

pub mod discover;
pub mod git;
pub mod repo;

use std::path::PathBuf;
use thiserror::Error;

pub use discover::{find_tests, DiscoveredTest};
pub use git::{clone_repo, ClonedRepo};
pub use repo::{classify, core_boards, library_architectures, PackageKind};

/// Errors from scanning a source tree.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("no tests were found in {0}")]
    NoTestsFound(PathBuf),
    #[error(transparent)]
    Manifest(#[from] cino_core::ManifestError),
    #[error("git {command} failed: {output}")]
    Git { command: String, output: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
