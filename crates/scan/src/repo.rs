// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository classification.
//!
//! A repository is a library (`library.properties` at the root), a core
//! (`boards.txt` at the root), or otherwise a plain sketch collection.
//! Libraries declare the architectures they support; cores declare the
//! boards they provide. Both drive the matrix expansion axis.

use crate::ScanError;
use regex::Regex;
use std::path::Path;

/// What kind of package a repository root contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    SketchCollection,
    Library,
    Core,
}

/// Classify a repository root by its marker files.
pub fn classify(root: &Path) -> PackageKind {
    if root.join("library.properties").is_file() {
        PackageKind::Library
    } else if root.join("boards.txt").is_file() {
        PackageKind::Core
    } else {
        PackageKind::SketchCollection
    }
}

/// Architectures a library declares in `library.properties`
/// (`architectures` key, comma-separated).
pub fn library_architectures(root: &Path) -> Result<Vec<String>, ScanError> {
    let entries = properties(&root.join("library.properties"))?;
    let value = entries
        .iter()
        .find(|(key, _)| key == "architectures")
        .map(|(_, value)| value.as_str())
        .unwrap_or_default();
    Ok(value.split(',').map(|s| s.to_string()).collect())
}

/// Board identifiers a core provides, from `boards.txt` keys matching
/// `^([^.]+)\.name$`, in file order.
pub fn core_boards(root: &Path) -> Result<Vec<String>, ScanError> {
    let entries = properties(&root.join("boards.txt"))?;
    #[allow(clippy::unwrap_used)] // literal pattern
    let re = Regex::new(r"^([^.]+)\.name$").unwrap();
    let mut out = Vec::new();
    for (key, _) in entries {
        if let Some(captures) = re.captures(&key) {
            if let Some(board) = captures.get(1) {
                out.push(board.as_str().to_string());
            }
        }
    }
    Ok(out)
}

/// Parse a flat Arduino properties file: `key=value` lines, `#` comments,
/// blank lines ignored. Order is preserved.
fn properties(path: &Path) -> Result<Vec<(String, String)>, ScanError> {
    let raw = std::fs::read_to_string(path)?;
    let mut out = Vec::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            out.push((key.trim().to_string(), value.trim().to_string()));
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "repo_tests.rs"]
mod tests;
