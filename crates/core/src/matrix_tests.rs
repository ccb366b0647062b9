// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::requirements::{is_pinned, SketchRequirement, ANY};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn sketch(fqbn: &str, features: &[&str]) -> SketchRequirement {
    SketchRequirement {
        fqbn: fqbn.to_string(),
        architecture: String::new(),
        features: strings(features),
    }
}

fn template(wiring: &[&str], sketches: Vec<SketchRequirement>) -> TestRequirements {
    TestRequirements {
        wiring: strings(wiring),
        sketches,
    }
}

fn effectives(entries: Vec<RequirementsMatrix>) -> Vec<TestRequirements> {
    entries.into_iter().map(|e| e.effective).collect()
}

// ============================================================================
// Perm: tuple enumeration
// ============================================================================

#[yare::parameterized(
    k1 = { 1 },
    k2 = { 2 },
    k3 = { 3 },
    k4 = { 4 },
)]
fn perm_cardinality_and_order(k: usize) {
    let set = strings(&["foo", "bar", "baz"]);
    let tuples = perm(&set, k);
    assert_eq!(tuples.len(), 3usize.pow(k as u32));
    assert_eq!(tuples[0], vec!["foo".to_string(); k]);
    assert_eq!(tuples[tuples.len() - 1], vec!["baz".to_string(); k]);
}

#[test]
fn perm_zero_arity_yields_single_empty_tuple() {
    assert_eq!(perm(&strings(&["a", "b"]), 0), vec![Vec::<String>::new()]);
}

#[test]
fn perm_empty_values_yields_nothing() {
    assert!(perm(&[], 2).is_empty());
}

// ============================================================================
// Repeat: axis expansion
// ============================================================================

#[test]
fn repeat_fills_single_empty_fqbn_slot() {
    let templates = vec![template(&["i2c"], vec![sketch("", &["foo", "bar"])])];
    let fqbns = strings(&["arduino:avr:uno", "arduino:avr:nano"]);

    let result = effectives(dedup(repeat(&templates, &fqbns, Axis::Fqbn)));

    let expected = vec![
        template(&["i2c"], vec![sketch("arduino:avr:uno", &["foo", "bar"])]),
        template(&["i2c"], vec![sketch("arduino:avr:nano", &["foo", "bar"])]),
    ];
    assert_eq!(result, expected);
}

#[test]
fn repeat_two_empty_slots_yields_full_product() {
    let templates = vec![template(
        &["i2c"],
        vec![sketch("", &["foo", "bar"]), sketch("", &["baz"])],
    )];
    let fqbns = strings(&["arduino:avr:uno", "arduino:avr:nano"]);

    let result = effectives(dedup(repeat(&templates, &fqbns, Axis::Fqbn)));

    let expected = vec![
        template(
            &["i2c"],
            vec![
                sketch("arduino:avr:uno", &["foo", "bar"]),
                sketch("arduino:avr:uno", &["baz"]),
            ],
        ),
        template(
            &["i2c"],
            vec![
                sketch("arduino:avr:uno", &["foo", "bar"]),
                sketch("arduino:avr:nano", &["baz"]),
            ],
        ),
        template(
            &["i2c"],
            vec![
                sketch("arduino:avr:nano", &["foo", "bar"]),
                sketch("arduino:avr:uno", &["baz"]),
            ],
        ),
        template(
            &["i2c"],
            vec![
                sketch("arduino:avr:nano", &["foo", "bar"]),
                sketch("arduino:avr:nano", &["baz"]),
            ],
        ),
    ];
    assert_eq!(result, expected);
}

#[test]
fn repeat_wildcard_slot_does_not_multiply() {
    let templates = vec![template(
        &["i2c"],
        vec![sketch("", &["foo", "bar"]), sketch(ANY, &["baz"])],
    )];
    let fqbns = strings(&["arduino:avr:uno", "arduino:avr:nano"]);

    let result = effectives(dedup(repeat(&templates, &fqbns, Axis::Fqbn)));

    let expected = vec![
        template(
            &["i2c"],
            vec![
                sketch("arduino:avr:uno", &["foo", "bar"]),
                sketch(ANY, &["baz"]),
            ],
        ),
        template(
            &["i2c"],
            vec![
                sketch("arduino:avr:nano", &["foo", "bar"]),
                sketch(ANY, &["baz"]),
            ],
        ),
    ];
    assert_eq!(result, expected);
}

#[test]
fn repeat_architecture_axis_keeps_pinned_value() {
    let pinned = SketchRequirement {
        fqbn: String::new(),
        architecture: "samd".to_string(),
        features: Vec::new(),
    };
    let templates = vec![template(&[], vec![pinned.clone()])];

    let result = dedup(repeat(
        &templates,
        &strings(&["avr", "megaavr"]),
        Axis::Architecture,
    ));

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].effective.sketches[0], pinned);
}

#[test]
fn repeat_no_sketches_yields_one_trivial_entry() {
    let templates = vec![template(&["i2c"], Vec::new())];
    let result = repeat(&templates, &strings(&["avr"]), Axis::Architecture);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].effective, templates[0]);
}

#[test]
fn repeat_empty_axis_values_yields_nothing() {
    let templates = vec![template(&[], vec![sketch("", &[])])];
    assert!(repeat(&templates, &[], Axis::Fqbn).is_empty());
}

#[test]
fn repeat_retains_original_template() {
    let templates = vec![template(&[], vec![sketch("", &["foo"])])];
    for entry in repeat(&templates, &strings(&["uno", "nano"]), Axis::Fqbn) {
        assert_eq!(entry.original, templates[0]);
    }
}

#[test]
fn identity_maps_each_template_unchanged() {
    let templates = vec![
        template(&["i2c"], vec![sketch("uno", &[])]),
        template(&[], vec![sketch("", &["foo"])]),
    ];
    let result = identity(&templates);
    assert_eq!(result.len(), 2);
    for (entry, tmpl) in result.iter().zip(&templates) {
        assert_eq!(&entry.original, tmpl);
        assert_eq!(&entry.effective, tmpl);
    }
}

// ============================================================================
// Dedup
// ============================================================================

#[test]
fn dedup_keeps_first_occurrence_order() {
    let a = template(&[], vec![sketch("uno", &[])]);
    let b = template(&[], vec![sketch("nano", &[])]);
    let entries = vec![
        RequirementsMatrix {
            original: a.clone(),
            effective: a.clone(),
        },
        RequirementsMatrix {
            original: b.clone(),
            effective: b.clone(),
        },
        RequirementsMatrix {
            original: b.clone(),
            effective: a.clone(),
        },
    ];

    let result = dedup(entries);
    assert_eq!(effectives(result), vec![a, b]);
}

#[test]
fn dedup_compares_features_as_sets() {
    let first = template(&[], vec![sketch("uno", &["foo", "bar"])]);
    let second = template(&[], vec![sketch("uno", &["bar", "foo"])]);
    let entries = vec![
        RequirementsMatrix {
            original: first.clone(),
            effective: first.clone(),
        },
        RequirementsMatrix {
            original: second.clone(),
            effective: second,
        },
    ];

    let result = dedup(entries);
    assert_eq!(effectives(result), vec![first]);
}

// ============================================================================
// Properties
// ============================================================================

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn arb_axis_value() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            Just(ANY.to_string()),
            "[a-c]{1,3}".prop_map(|s| format!("v:{s}:b")),
        ]
    }

    fn arb_sketch() -> impl Strategy<Value = SketchRequirement> {
        (
            arb_axis_value(),
            arb_axis_value(),
            proptest::collection::vec("[a-c]{1,3}", 0..3),
        )
            .prop_map(|(fqbn, architecture, features)| SketchRequirement {
                fqbn,
                architecture,
                features,
            })
    }

    fn arb_template() -> impl Strategy<Value = TestRequirements> {
        (
            proptest::collection::vec("[a-c]{1,3}", 0..2),
            proptest::collection::vec(arb_sketch(), 0..3),
        )
            .prop_map(|(wiring, sketches)| TestRequirements { wiring, sketches })
    }

    proptest! {
        #[test]
        fn expansion_preserves_shape_and_pinned_slots(
            templates in proptest::collection::vec(arb_template(), 0..3),
            values in proptest::collection::vec("[a-z]{1,4}", 0..3),
        ) {
            for entry in repeat(&templates, &values, Axis::Fqbn) {
                prop_assert_eq!(
                    entry.effective.sketches.len(),
                    entry.original.sketches.len()
                );
                for (orig, eff) in entry
                    .original
                    .sketches
                    .iter()
                    .zip(&entry.effective.sketches)
                {
                    if is_pinned(&orig.fqbn) || orig.fqbn == ANY {
                        prop_assert_eq!(&orig.fqbn, &eff.fqbn);
                    }
                    prop_assert_eq!(&orig.architecture, &eff.architecture);
                    prop_assert_eq!(&orig.features, &eff.features);
                }
            }
        }

        #[test]
        fn dedup_leaves_no_equal_pair(
            templates in proptest::collection::vec(arb_template(), 0..3),
            values in proptest::collection::vec("[a-z]{1,4}", 0..3),
        ) {
            let kept = dedup(repeat(&templates, &values, Axis::Fqbn));
            for (i, a) in kept.iter().enumerate() {
                for b in kept.iter().skip(i + 1) {
                    prop_assert!(!a.effective.eq_unordered(&b.effective));
                }
            }
        }
    }
}
