// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn device(fqbn: &str, features: &[&str]) -> Device {
    Device {
        fqbn: fqbn.to_string(),
        port: format!("/dev/tty-{fqbn}"),
        features: features.iter().map(|s| s.to_string()).collect(),
    }
}

fn features_test(feature_sets: &[&[&str]]) -> TestRequirements {
    TestRequirements {
        wiring: Vec::new(),
        sketches: feature_sets
            .iter()
            .map(|features| SketchRequirement {
                fqbn: String::new(),
                architecture: String::new(),
                features: features.iter().map(|s| s.to_string()).collect(),
            })
            .collect(),
    }
}

fn architecture_test(architecture: &str) -> TestRequirements {
    TestRequirements {
        wiring: Vec::new(),
        sketches: vec![SketchRequirement {
            fqbn: String::new(),
            architecture: architecture.to_string(),
            features: Vec::new(),
        }],
    }
}

fn assigned_fqbns(assignment: Option<Vec<Device>>) -> Vec<String> {
    assignment
        .expect("expected an assignment")
        .into_iter()
        .map(|d| d.fqbn)
        .collect()
}

// ============================================================================
// match_device
// ============================================================================

#[yare::parameterized(
    unconstrained    = { "", "", &[], true },
    wildcard_fqbn    = { "*", "", &[], true },
    exact_fqbn       = { "arduino:avr:uno", "", &[], true },
    wrong_fqbn       = { "arduino:avr:nano", "", &[], false },
    exact_arch       = { "", "avr", &[], true },
    wildcard_arch    = { "", "*", &[], true },
    wrong_arch       = { "", "samd", &[], false },
    feature_subset   = { "", "", &["wifi"], true },
    feature_missing  = { "", "", &["wifi", "eth"], false },
)]
fn match_device_cases(fqbn: &str, architecture: &str, features: &[&str], expected: bool) {
    let requirement = SketchRequirement {
        fqbn: fqbn.to_string(),
        architecture: architecture.to_string(),
        features: features.iter().map(|s| s.to_string()).collect(),
    };
    let dev = device("arduino:avr:uno", &["wifi", "ble"]);
    assert_eq!(match_device(&requirement, &dev), expected);
}

#[test]
fn malformed_fqbn_never_matches_an_architecture() {
    let requirement = SketchRequirement {
        fqbn: String::new(),
        architecture: "avr".to_string(),
        features: Vec::new(),
    };
    assert!(!match_device(&requirement, &device("bare-name", &[])));
}

// ============================================================================
// assign_devices
// ============================================================================

#[test]
fn assignment_pairs_features_to_devices() {
    let devices = vec![device("one", &["bar"]), device("two", &["foo"])];
    let test = features_test(&[&["foo"], &["bar"]]);
    assert_eq!(
        assigned_fqbns(assign_devices(&test, &[], &devices)),
        vec!["two", "one"]
    );
}

#[test]
fn scarce_features_are_assigned_first() {
    let devices = vec![device("one", &["bar"]), device("two", &["foo", "bar"])];
    let test = features_test(&[&["foo"], &["bar"]]);
    assert_eq!(
        assigned_fqbns(assign_devices(&test, &[], &devices)),
        vec!["two", "one"]
    );
}

#[test]
fn scarcity_beats_configured_order() {
    let devices = vec![device("one", &["foo", "bar"]), device("two", &["bar"])];
    let test = features_test(&[&["foo"], &["bar"]]);
    assert_eq!(
        assigned_fqbns(assign_devices(&test, &[], &devices)),
        vec!["one", "two"]
    );
}

#[test]
fn larger_fleet_assigns_most_constrained_first() {
    let devices = vec![
        device("zero", &["foo", "bar", "baz"]),
        device("one", &["foo"]),
        device("two", &["foo"]),
        device("three", &["foo", "bar", "baz"]),
        device("four", &["foo", "bar"]),
    ];
    let test = features_test(&[&["foo"], &["bar"], &["baz"]]);
    assert_eq!(
        assigned_fqbns(assign_devices(&test, &[], &devices)),
        vec!["one", "three", "zero"]
    );
}

#[yare::parameterized(
    samd    = { "samd", "arduino:samd:nano_33_iot" },
    megaavr = { "megaavr", "arduino:megaavr:nona4809" },
)]
fn architecture_picks_the_matching_board(architecture: &str, expected: &str) {
    let devices = vec![
        device("arduino:megaavr:nona4809", &[]),
        device("arduino:samd:nano_33_iot", &[]),
    ];
    let test = architecture_test(architecture);
    assert_eq!(
        assigned_fqbns(assign_devices(&test, &[], &devices)),
        vec![expected]
    );
}

#[test]
fn unsatisfiable_features_yield_no_assignment() {
    let devices = vec![device("one", &["foo"])];
    let test = features_test(&[&["bar"]]);
    assert!(assign_devices(&test, &[], &devices).is_none());
}

#[test]
fn more_sketches_than_devices_yields_no_assignment() {
    let devices = vec![device("one", &[])];
    let test = features_test(&[&[], &[]]);
    assert!(assign_devices(&test, &[], &devices).is_none());
}

#[test]
fn missing_wiring_yields_no_assignment() {
    let devices = vec![device("one", &[])];
    let mut test = features_test(&[&[]]);
    test.wiring = vec!["i2c".to_string()];
    assert!(assign_devices(&test, &[], &devices).is_none());
    assert!(assign_devices(&test, &["i2c".to_string()], &devices).is_some());
}

#[test]
fn assignment_is_injective() {
    let devices = vec![device("one", &["foo"]), device("two", &["foo"])];
    let test = features_test(&[&["foo"], &["foo"]]);
    let fqbns = assigned_fqbns(assign_devices(&test, &[], &devices));
    assert_eq!(fqbns.len(), 2);
    assert_ne!(fqbns[0], fqbns[1]);
}
