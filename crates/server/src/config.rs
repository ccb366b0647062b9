// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server configuration.
//!
//! One YAML file, loaded at startup and threaded into the tasks that need
//! it. `CINO_DB_DSN` overrides the configured DSN. The runner list is the
//! full fleet roster; the reconciler needs it to decide when a queued job
//! has been skipped by everyone.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("error loading configuration: {0}")]
    Read(#[from] std::io::Error),
    #[error("error parsing configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("database DSN not configured")]
    MissingDsn,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DbConfig {
    #[serde(default)]
    pub dsn: String,
}

/// One runner of the configured fleet.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerEntry {
    pub id: String,
}

/// GitHub App credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    pub app_id: u64,
    /// Webhook shared secret.
    #[serde(default)]
    pub secret: String,
    pub private_key_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Architectures the fleet can serve; filters library expansion.
    #[serde(default)]
    pub architectures: Vec<String>,
    #[serde(default)]
    pub runners: Vec<RunnerEntry>,
    #[serde(default)]
    pub db: DbConfig,
    pub github: GithubConfig,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: ServerConfig = serde_yaml::from_str(&raw)?;
        if let Ok(dsn) = std::env::var("CINO_DB_DSN") {
            config.db.dsn = dsn;
        }
        if config.db.dsn.is_empty() {
            return Err(ConfigError::MissingDsn);
        }
        Ok(config)
    }

    /// Ids of every configured runner.
    pub fn runner_ids(&self) -> Vec<String> {
        self.runners.iter().map(|r| r.id.clone()).collect()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
