// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! GitHub App authentication.

use crate::GithubError;
use jsonwebtoken::EncodingKey;
use octocrab::models::{AppId, InstallationId};
use octocrab::Octocrab;
use std::path::Path;

/// App-authenticated GitHub client factory.
///
/// Holds the app-level client; per-request clients are scoped to the
/// installation a check suite belongs to.
pub struct StatusSink {
    app: Octocrab,
}

impl StatusSink {
    /// Build from the configured app id and RSA private key file.
    pub fn from_key_file(app_id: u64, private_key_file: &Path) -> Result<Self, GithubError> {
        let pem = std::fs::read(private_key_file).map_err(GithubError::Key)?;
        let key = EncodingKey::from_rsa_pem(&pem)?;
        let app = Octocrab::builder().app(AppId(app_id), key).build()?;
        Ok(Self { app })
    }

    /// Client acting as the given installation.
    pub(crate) fn for_installation(&self, installation_id: i64) -> Result<Octocrab, GithubError> {
        Ok(self.app.installation(InstallationId(installation_id as u64))?)
    }
}
