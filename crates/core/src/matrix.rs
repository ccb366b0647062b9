// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job matrix expansion.
//!
//! Turns abstract per-test requirement templates into concrete
//! per-architecture or per-FQBN entries. Expansion is a pure function over
//! value types; the explicit original/effective pair in each entry replaces
//! any reliance on shared references between templates.

use crate::requirements::{RequirementsMatrix, TestRequirements};

/// Which per-sketch axis an expansion writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Architecture,
    Fqbn,
}

/// All k-tuples over `values` with replacement, in lexicographic order by
/// input index.
///
/// Produces `values.len().pow(k)` tuples; `k == 0` yields the single empty
/// tuple, and an empty `values` with `k > 0` yields nothing.
pub fn perm(values: &[String], k: usize) -> Vec<Vec<String>> {
    let mut out = vec![Vec::new()];
    for _ in 0..k {
        let mut next = Vec::with_capacity(out.len() * values.len());
        for prefix in &out {
            for value in values {
                let mut tuple = prefix.clone();
                tuple.push(value.clone());
                next.push(tuple);
            }
        }
        out = next;
    }
    out
}

/// Expand each template over `values` along `axis`.
///
/// For a template with n sketches, every n-tuple from [`perm`] produces one
/// matrix entry. A tuple value is written into a sketch only when that
/// sketch's axis field is empty; `"*"` and explicit values are left
/// untouched, so tuples differing only at untouched positions collapse
/// under [`dedup`].
pub fn repeat(
    templates: &[TestRequirements],
    values: &[String],
    axis: Axis,
) -> Vec<RequirementsMatrix> {
    let mut out = Vec::new();
    for template in templates {
        for tuple in perm(values, template.sketches.len()) {
            let mut effective = template.clone();
            for (sketch, value) in effective.sketches.iter_mut().zip(&tuple) {
                let slot = match axis {
                    Axis::Architecture => &mut sketch.architecture,
                    Axis::Fqbn => &mut sketch.fqbn,
                };
                if slot.is_empty() {
                    slot.clone_from(value);
                }
            }
            out.push(RequirementsMatrix {
                original: template.clone(),
                effective,
            });
        }
    }
    out
}

/// Identity expansion: each template dispatched exactly as authored.
pub fn identity(templates: &[TestRequirements]) -> Vec<RequirementsMatrix> {
    templates
        .iter()
        .map(|template| RequirementsMatrix {
            original: template.clone(),
            effective: template.clone(),
        })
        .collect()
}

/// Drop entries whose effective requirements duplicate an earlier entry
/// under order-insensitive equality. First occurrence wins; relative order
/// is preserved.
pub fn dedup(entries: Vec<RequirementsMatrix>) -> Vec<RequirementsMatrix> {
    let mut out: Vec<RequirementsMatrix> = Vec::new();
    for entry in entries {
        if !out
            .iter()
            .any(|kept| kept.effective.eq_unordered(&entry.effective))
        {
            out.push(entry);
        }
    }
    out
}

#[cfg(test)]
#[path = "matrix_tests.rs"]
mod tests;
