// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner configuration.
//!
//! Loaded once at startup from a YAML file and threaded explicitly into
//! the components that need it; the device list is captured here and never
//! changes while the process runs. `CINO_DB_DSN` overrides the configured
//! DSN.

use crate::devices::Device;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("error loading configuration: {0}")]
    Read(#[from] std::io::Error),
    #[error("error parsing configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("runner_id not configured")]
    MissingRunnerId,
    #[error("database DSN not configured")]
    MissingDsn,
    #[error("no devices configured")]
    NoDevices,
    #[error("device {0} not found")]
    DeviceNotFound(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DbConfig {
    #[serde(default)]
    pub dsn: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunnerConfig {
    /// Stable identity under which jobs are claimed and skips recorded.
    #[serde(default)]
    pub runner_id: String,
    /// Wiring capabilities this host provides (e.g. `i2c`).
    #[serde(default)]
    pub wiring: Vec<String>,
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub db: DbConfig,
}

impl RunnerConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                serde_yaml::from_str(&raw)?
            }
            None => RunnerConfig::default(),
        };
        if let Ok(dsn) = std::env::var("CINO_DB_DSN") {
            config.db.dsn = dsn;
        }
        Ok(config)
    }

    /// Startup checks for subscribe mode: identity, queue, and every
    /// configured device present in the OS.
    pub fn validate_for_subscribe(&self) -> Result<(), ConfigError> {
        if self.runner_id.is_empty() {
            return Err(ConfigError::MissingRunnerId);
        }
        if self.db.dsn.is_empty() {
            return Err(ConfigError::MissingDsn);
        }
        if self.devices.is_empty() {
            return Err(ConfigError::NoDevices);
        }
        for device in &self.devices {
            if !Path::new(&device.port).exists() {
                return Err(ConfigError::DeviceNotFound(device.port.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
