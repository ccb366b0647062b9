// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Device configuration and assignment.
//!
//! Assignment is a most-constrained-first greedy over the configured
//! device order. Not optimal, but deterministic for a fixed device list,
//! which matters because runners must produce reproducible skip decisions.
//! Device fleets are small enough that optimality is not worth a real
//! bipartite matching; one could be substituted behind [`assign_devices`]
//! without touching callers.

use cino_core::{is_pinned, SketchRequirement, TestRequirements};
use serde::Deserialize;
use tracing::debug;

/// A physically attached board, as configured at runner startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Device {
    /// `vendor:arch:board` triple.
    pub fqbn: String,
    /// OS-level device path, e.g. `/dev/ttyACM0`.
    pub port: String,
    /// Capabilities this device provides.
    #[serde(default)]
    pub features: Vec<String>,
}

/// Whether one device can serve one sketch slot.
pub fn match_device(requirement: &SketchRequirement, device: &Device) -> bool {
    if is_pinned(&requirement.fqbn) && requirement.fqbn != device.fqbn {
        return false;
    }
    if is_pinned(&requirement.architecture) {
        let architecture = device.fqbn.split(':').nth(1).unwrap_or_default();
        if requirement.architecture != architecture {
            return false;
        }
    }
    requirement
        .features
        .iter()
        .all(|feature| device.features.contains(feature))
}

/// Pick one device per sketch, or `None` if the requirements cannot be met.
///
/// Sketches are served scarcest-first (fewest matching devices, ties by
/// sketch position) so a scarce device is not burned on a sketch that had
/// alternatives; within a candidate list the first device in configured
/// order wins. The returned list is indexed by sketch position.
pub fn assign_devices(
    requirements: &TestRequirements,
    wiring: &[String],
    devices: &[Device],
) -> Option<Vec<Device>> {
    if !requirements.wiring.iter().all(|w| wiring.contains(w)) {
        debug!(
            required = ?requirements.wiring,
            provided = ?wiring,
            "wiring required by job does not match our capabilities"
        );
        return None;
    }
    if requirements.sketches.len() > devices.len() {
        debug!(
            required = requirements.sketches.len(),
            available = devices.len(),
            "job requires more devices than we have"
        );
        return None;
    }

    let mut candidates: Vec<Vec<usize>> = requirements
        .sketches
        .iter()
        .map(|sketch| {
            devices
                .iter()
                .enumerate()
                .filter(|(_, device)| match_device(sketch, device))
                .map(|(index, _)| index)
                .collect()
        })
        .collect();

    let mut order: Vec<usize> = (0..requirements.sketches.len()).collect();
    // Stable sort: equal counts keep natural sketch order.
    order.sort_by_key(|&sketch| candidates[sketch].len());

    let mut assigned: Vec<Option<Device>> = vec![None; requirements.sketches.len()];
    for sketch in order {
        let &device = candidates[sketch].first()?;
        assigned[sketch] = Some(devices[device].clone());
        for pool in &mut candidates {
            pool.retain(|&d| d != device);
        }
    }
    assigned.into_iter().collect()
}

#[cfg(test)]
#[path = "devices_tests.rs"]
mod tests;
