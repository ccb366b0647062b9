// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cino.yml` test manifests.
//!
//! A directory containing a `cino.yml` file is a test. The manifest names
//! the wiring the host must provide and the sketches to flash; when no
//! sketches are listed the test directory itself is the sketch root.

use crate::requirements::{SketchRequirement, TestRequirements};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// File name a test directory is recognized by.
pub const MANIFEST_FILE: &str = "cino.yml";

/// Errors loading or validating a test manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("error reading cino.yml: {0}")]
    Read(#[from] std::io::Error),
    #[error("error parsing cino.yml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("missing sketch directory (dir) for multi-sketch test")]
    MissingSketchDir,
    #[error("sketch referenced in cino.yml does not exist: {0}")]
    SketchDirNotFound(String),
}

/// One sketch declaration within a manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SketchEntry {
    /// Sketch root, relative to the test directory.
    #[serde(default)]
    pub dir: String,
    /// Library-manager identifiers to install before compiling.
    #[serde(default)]
    pub libraries: Vec<String>,
    #[serde(flatten)]
    pub requirement: SketchRequirement,
}

/// Parsed contents of a `cino.yml` file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestManifest {
    #[serde(default, rename = "require-wiring")]
    pub require_wiring: Vec<String>,
    #[serde(default)]
    pub sketches: Vec<SketchEntry>,
}

impl TestManifest {
    /// Parse the manifest in `test_dir` and apply the default-sketch rules:
    /// no `sketches` key or exactly one entry makes the test directory
    /// itself the sketch root; with several entries, every `dir` must name
    /// an existing subdirectory.
    pub fn load(test_dir: &Path) -> Result<Self, ManifestError> {
        let raw = std::fs::read_to_string(test_dir.join(MANIFEST_FILE))?;
        // An empty manifest is a valid test declaration (one implicit sketch).
        let mut manifest: TestManifest =
            serde_yaml::from_str::<Option<TestManifest>>(&raw)?.unwrap_or_default();
        match manifest.sketches.len() {
            0 => manifest.sketches.push(SketchEntry {
                dir: ".".to_string(),
                ..SketchEntry::default()
            }),
            1 => manifest.sketches[0].dir = ".".to_string(),
            _ => {
                for entry in &manifest.sketches {
                    if entry.dir.is_empty() {
                        return Err(ManifestError::MissingSketchDir);
                    }
                    if !test_dir.join(&entry.dir).is_dir() {
                        return Err(ManifestError::SketchDirNotFound(entry.dir.clone()));
                    }
                }
            }
        }
        Ok(manifest)
    }

    /// The authored requirements: global wiring plus the per-sketch triples.
    pub fn requirements(&self) -> TestRequirements {
        TestRequirements {
            wiring: self.require_wiring.clone(),
            sketches: self
                .sketches
                .iter()
                .map(|entry| entry.requirement.clone())
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
