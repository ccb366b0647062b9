// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cino-github: the GitHub status sink.
//!
//! Thin boundary layer: GitHub App authentication, check-run creation and
//! updates, and webhook signature validation. Summary rendering belongs to
//! the server; this crate only moves payloads.

pub mod check_run;
pub mod client;
pub mod webhook;

use thiserror::Error;

pub use check_run::{CheckRunSummary, CheckRunUpdate};
pub use client::StatusSink;
pub use webhook::{verify_signature, CheckSuiteEvent, CHECK_SUITE_EVENT};

/// Errors from the GitHub boundary.
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("error reading private key: {0}")]
    Key(#[source] std::io::Error),
    #[error("invalid private key: {0}")]
    InvalidKey(#[from] jsonwebtoken::errors::Error),
    #[error(transparent)]
    Api(#[from] octocrab::Error),
}
