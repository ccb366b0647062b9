// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test discovery.
//!
//! Walks a source tree for directories containing a `cino.yml` manifest.
//! Directories are visited in sorted order so that a coordinator and a
//! runner scanning the same tree produce the same test list.

use crate::repo::{classify, PackageKind};
use crate::ScanError;
use cino_core::{TestManifest, TestRequirements, MANIFEST_FILE};
use std::path::{Path, PathBuf};

/// A test directory found on disk, with its parsed manifest and the
/// package it belongs to.
#[derive(Debug, Clone)]
pub struct DiscoveredTest {
    pub manifest: TestManifest,
    /// Absolute path to the test directory.
    pub path: PathBuf,
    /// Absolute path to the package root containing the test.
    pub package_root: PathBuf,
    pub kind: PackageKind,
}

impl DiscoveredTest {
    /// Test path relative to the package root (repo-relative for display
    /// and for the job row's test path list). The package root itself is
    /// `"."`.
    pub fn rel_path(&self) -> String {
        let rel = self
            .path
            .strip_prefix(&self.package_root)
            .unwrap_or(&self.path)
            .display()
            .to_string();
        if rel.is_empty() {
            ".".to_string()
        } else {
            rel
        }
    }

    /// The authored requirements from the manifest.
    pub fn requirements(&self) -> TestRequirements {
        self.manifest.requirements()
    }
}

/// Find all tests under `path`.
///
/// If `path` itself holds a `cino.yml` it is a single test (and its own
/// package root, treated as a sketch collection). Otherwise every
/// subdirectory with a manifest becomes one test and the root is
/// classified to decide the expansion axis.
pub fn find_tests(path: &Path) -> Result<Vec<DiscoveredTest>, ScanError> {
    if !path.is_dir() {
        return Err(ScanError::NotADirectory(path.to_path_buf()));
    }

    if path.join(MANIFEST_FILE).is_file() {
        let manifest = TestManifest::load(path)?;
        return Ok(vec![DiscoveredTest {
            manifest,
            path: path.to_path_buf(),
            package_root: path.to_path_buf(),
            kind: PackageKind::SketchCollection,
        }]);
    }

    let mut test_dirs = Vec::new();
    collect_test_dirs(path, &mut test_dirs)?;
    if test_dirs.is_empty() {
        return Err(ScanError::NoTestsFound(path.to_path_buf()));
    }

    let kind = classify(path);
    let mut tests = Vec::with_capacity(test_dirs.len());
    for dir in test_dirs {
        let manifest = TestManifest::load(&dir)?;
        tests.push(DiscoveredTest {
            manifest,
            path: dir,
            package_root: path.to_path_buf(),
            kind,
        });
    }
    Ok(tests)
}

/// Depth-first walk collecting directories that contain a manifest.
/// Children are visited in name order.
fn collect_test_dirs(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ScanError> {
    let mut children: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    children.sort();

    for child in children {
        if child.join(MANIFEST_FILE).is_file() {
            out.push(child.clone());
        }
        collect_test_dirs(&child, out)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "discover_tests.rs"]
mod tests;
