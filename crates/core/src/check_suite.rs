// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Check suite rows.

use chrono::{DateTime, Utc};

use crate::job::ParseStatusError;

/// Lifecycle of a check suite: inserted by the hook endpoint as pending,
/// advanced by the scanner exactly once, then immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteStatus {
    Pending,
    Dispatched,
}

impl SuiteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuiteStatus::Pending => "pending",
            SuiteStatus::Dispatched => "dispatched",
        }
    }
}

impl std::fmt::Display for SuiteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SuiteStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SuiteStatus::Pending),
            "dispatched" => Ok(SuiteStatus::Dispatched),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// A CI request notified by GitHub.
#[derive(Debug, Clone)]
pub struct CheckSuite {
    pub id: i64,
    pub github_id: i64,
    pub status: SuiteStatus,
    /// GitHub App installation the suite belongs to; scopes API credentials.
    pub installation_id: i64,
    pub repo_owner: String,
    pub repo_name: String,
    pub clone_url: String,
    pub commit_ref: String,
    pub created_at: DateTime<Utc>,
}
