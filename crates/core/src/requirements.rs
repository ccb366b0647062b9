// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test requirement types and order-insensitive equality.
//!
//! A test declares what hardware it needs: wiring between devices, and one
//! requirement triple per sketch. An empty axis value means "unconstrained,
//! expand the matrix over this axis"; the literal [`ANY`] means
//! "unconstrained, any single value will do" and never multiplies the matrix.

use serde::{Deserialize, Serialize};

/// Wildcard axis value: any single device works, no matrix expansion.
pub const ANY: &str = "*";

/// True when an axis value pins the sketch to one concrete choice
/// (non-empty and not the [`ANY`] wildcard).
pub fn is_pinned(value: &str) -> bool {
    !value.is_empty() && value != ANY
}

/// Hardware requirements of a single sketch slot within a test.
///
/// The k-th sketch of a test is flashed to the k-th assigned device, so the
/// position of a `SketchRequirement` within [`TestRequirements::sketches`]
/// is significant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SketchRequirement {
    /// Exact board requirement (`vendor:arch:board`), empty, or `"*"`.
    #[serde(default, rename = "require-fqbn")]
    pub fqbn: String,
    /// Architecture requirement (the middle FQBN token), empty, or `"*"`.
    #[serde(default, rename = "require-architecture")]
    pub architecture: String,
    /// Capabilities the assigned device must provide.
    #[serde(default, rename = "require-features")]
    pub features: Vec<String>,
}

/// Full requirements of a test: host wiring plus the ordered sketch slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRequirements {
    /// Physical inter-device connections the runner host must provide.
    #[serde(default, rename = "require-wiring")]
    pub wiring: Vec<String>,
    #[serde(default)]
    pub sketches: Vec<SketchRequirement>,
}

impl TestRequirements {
    /// Compare without regard to the order of the feature and wiring lists.
    ///
    /// Those axes are semantically sets but serialized as sequences. Sorted
    /// copies are compared; the stored order is never mutated, keeping the
    /// authored order stable for diffing and display.
    pub fn eq_unordered(&self, other: &TestRequirements) -> bool {
        self.normalized() == other.normalized()
    }

    fn normalized(&self) -> TestRequirements {
        let mut out = self.clone();
        out.wiring.sort_unstable();
        for sketch in &mut out.sketches {
            sketch.features.sort_unstable();
        }
        out
    }
}

/// One entry of the expanded job matrix.
///
/// `original` is the requirement as authored in the test manifest;
/// `effective` is the post-expansion, possibly stricter form actually
/// dispatched. Both are retained so a runner can compare rediscovered
/// tests against `original` without re-implementing matrix reasoning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementsMatrix {
    pub original: TestRequirements,
    pub effective: TestRequirements,
}

impl RequirementsMatrix {
    /// Human-readable name for the dispatched entry, used as the check-run
    /// title. One token per sketch: the pinned FQBN if any, else the pinned
    /// architecture, plus the required features; wiring appended last.
    pub fn display_name(&self) -> String {
        let mut tokens = Vec::new();
        for sketch in &self.effective.sketches {
            let mut tags = Vec::new();
            if is_pinned(&sketch.fqbn) {
                tags.push(sketch.fqbn.clone());
            } else if is_pinned(&sketch.architecture) {
                tags.push(sketch.architecture.clone());
            }
            tags.extend(sketch.features.iter().cloned());
            if !tags.is_empty() {
                tokens.push(tags.join(","));
            }
        }
        if !self.effective.wiring.is_empty() {
            tokens.push(self.effective.wiring.join(","));
        }
        format!("Hardware test: {}", tokens.join(" "))
    }
}

#[cfg(test)]
#[path = "requirements_tests.rs"]
mod tests;
