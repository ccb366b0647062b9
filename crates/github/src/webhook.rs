// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhook payloads and signature validation.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

/// `X-GitHub-Event` value carrying a check-suite notification.
pub const CHECK_SUITE_EVENT: &str = "check_suite";

/// Verify a `X-Hub-Signature-256` header against the raw request body.
///
/// The header is `sha256=` followed by the hex HMAC-SHA256 of the body
/// under the webhook shared secret. Comparison is constant-time.
pub fn verify_signature(secret: &str, body: &[u8], signature_header: &str) -> bool {
    let Some(hex_digest) = signature_header.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// The fields of a `check_suite` webhook delivery the scanner needs.
#[derive(Debug, Deserialize)]
pub struct CheckSuiteEvent {
    pub action: String,
    pub check_suite: EventCheckSuite,
    pub installation: EventInstallation,
    pub repository: EventRepository,
}

impl CheckSuiteEvent {
    /// Only freshly requested suites enter the queue.
    pub fn wants_dispatch(&self) -> bool {
        self.action == "requested" || self.action == "rerequested"
    }
}

#[derive(Debug, Deserialize)]
pub struct EventCheckSuite {
    pub id: i64,
    pub head_sha: String,
}

#[derive(Debug, Deserialize)]
pub struct EventInstallation {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct EventRepository {
    pub name: String,
    pub clone_url: String,
    pub owner: EventOwner,
}

#[derive(Debug, Deserialize)]
pub struct EventOwner {
    pub login: String,
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
