// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn requirements(wiring: &[&str], features: &[&str]) -> TestRequirements {
    TestRequirements {
        wiring: wiring.iter().map(|s| s.to_string()).collect(),
        sketches: vec![SketchRequirement {
            fqbn: String::new(),
            architecture: String::new(),
            features: features.iter().map(|s| s.to_string()).collect(),
        }],
    }
}

#[yare::parameterized(
    empty     = { "", false },
    wildcard  = { "*", false },
    explicit  = { "arduino:avr:uno", true },
)]
fn pinned_values(value: &str, expected: bool) {
    assert_eq!(is_pinned(value), expected);
}

#[test]
fn equality_ignores_feature_and_wiring_order() {
    let a = requirements(&["i2c", "spi"], &["foo", "bar"]);
    let b = requirements(&["spi", "i2c"], &["bar", "foo"]);
    assert!(a.eq_unordered(&b));
}

#[test]
fn equality_distinguishes_different_features() {
    let a = requirements(&[], &["foo"]);
    let b = requirements(&[], &["bar"]);
    assert!(!a.eq_unordered(&b));
}

#[test]
fn equality_distinguishes_sketch_count() {
    let mut a = requirements(&[], &["foo"]);
    let b = requirements(&[], &["foo"]);
    a.sketches.push(SketchRequirement::default());
    assert!(!a.eq_unordered(&b));
}

#[test]
fn equality_does_not_reorder_the_operands() {
    let a = requirements(&["spi", "i2c"], &["foo", "bar"]);
    let before = a.clone();
    let _ = a.eq_unordered(&requirements(&["i2c", "spi"], &["bar", "foo"]));
    assert_eq!(a, before);
}

#[test]
fn sketch_order_is_significant() {
    let a = TestRequirements {
        wiring: Vec::new(),
        sketches: vec![
            SketchRequirement {
                fqbn: "uno".to_string(),
                ..SketchRequirement::default()
            },
            SketchRequirement {
                fqbn: "nano".to_string(),
                ..SketchRequirement::default()
            },
        ],
    };
    let mut b = a.clone();
    b.sketches.reverse();
    assert!(!a.eq_unordered(&b));
}

#[test]
fn matrix_round_trips_through_json() {
    let matrix = RequirementsMatrix {
        original: requirements(&["i2c"], &["foo", "bar"]),
        effective: requirements(&["i2c"], &["bar", "foo"]),
    };

    let encoded = serde_json::to_string(&matrix).unwrap();
    let decoded: RequirementsMatrix = serde_json::from_str(&encoded).unwrap();

    assert!(decoded.original.eq_unordered(&matrix.original));
    assert!(decoded.effective.eq_unordered(&matrix.effective));
    // Exact order survives too; normalization only happens at compare time.
    assert_eq!(decoded, matrix);
}

#[test]
fn serde_uses_manifest_field_names() {
    let yaml = r#"
require-wiring: [i2c]
sketches:
  - require-fqbn: "arduino:avr:uno"
    require-architecture: ""
    require-features: [wifi]
"#;
    let parsed: TestRequirements = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(parsed.wiring, vec!["i2c"]);
    assert_eq!(parsed.sketches.len(), 1);
    assert_eq!(parsed.sketches[0].fqbn, "arduino:avr:uno");
    assert_eq!(parsed.sketches[0].features, vec!["wifi"]);
}
