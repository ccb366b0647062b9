// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::fs;
use tempfile::TempDir;

fn write_manifest(dir: &std::path::Path, content: &str) {
    fs::write(dir.join(MANIFEST_FILE), content).unwrap();
}

#[test]
fn missing_sketches_defaults_to_test_dir() {
    let tmp = TempDir::new().unwrap();
    write_manifest(tmp.path(), "require-wiring: [i2c]\n");

    let manifest = TestManifest::load(tmp.path()).unwrap();

    assert_eq!(manifest.sketches.len(), 1);
    assert_eq!(manifest.sketches[0].dir, ".");
    assert_eq!(manifest.require_wiring, vec!["i2c"]);
}

#[test]
fn empty_manifest_is_a_single_implicit_sketch() {
    let tmp = TempDir::new().unwrap();
    write_manifest(tmp.path(), "");

    let manifest = TestManifest::load(tmp.path()).unwrap();

    assert_eq!(manifest.sketches.len(), 1);
    assert_eq!(manifest.sketches[0].dir, ".");
    assert!(manifest.require_wiring.is_empty());
}

#[test]
fn single_sketch_dir_is_forced_to_test_dir() {
    let tmp = TempDir::new().unwrap();
    write_manifest(
        tmp.path(),
        r#"
sketches:
  - dir: somewhere
    require-features: [wifi]
"#,
    );

    let manifest = TestManifest::load(tmp.path()).unwrap();

    assert_eq!(manifest.sketches.len(), 1);
    assert_eq!(manifest.sketches[0].dir, ".");
    assert_eq!(manifest.sketches[0].requirement.features, vec!["wifi"]);
}

#[test]
fn multi_sketch_dirs_must_exist() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("controller")).unwrap();
    write_manifest(
        tmp.path(),
        r#"
sketches:
  - dir: controller
  - dir: peripheral
"#,
    );

    let err = TestManifest::load(tmp.path()).unwrap_err();
    assert!(matches!(err, ManifestError::SketchDirNotFound(ref d) if d == "peripheral"));
}

#[test]
fn multi_sketch_without_dir_is_rejected() {
    let tmp = TempDir::new().unwrap();
    write_manifest(
        tmp.path(),
        r#"
sketches:
  - dir: controller
  - require-features: [wifi]
"#,
    );

    let err = TestManifest::load(tmp.path()).unwrap_err();
    assert!(matches!(err, ManifestError::MissingSketchDir));
}

#[test]
fn multi_sketch_with_existing_dirs_parses() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("controller")).unwrap();
    fs::create_dir(tmp.path().join("peripheral")).unwrap();
    write_manifest(
        tmp.path(),
        r#"
require-wiring: [i2c]
sketches:
  - dir: controller
    libraries: [Servo]
    require-architecture: samd
  - dir: peripheral
    require-fqbn: "*"
"#,
    );

    let manifest = TestManifest::load(tmp.path()).unwrap();

    assert_eq!(manifest.sketches.len(), 2);
    assert_eq!(manifest.sketches[0].libraries, vec!["Servo"]);
    let requirements = manifest.requirements();
    assert_eq!(requirements.wiring, vec!["i2c"]);
    assert_eq!(requirements.sketches[0].architecture, "samd");
    assert_eq!(requirements.sketches[1].fqbn, "*");
}

#[test]
fn unreadable_manifest_is_a_read_error() {
    let tmp = TempDir::new().unwrap();
    let err = TestManifest::load(tmp.path()).unwrap_err();
    assert!(matches!(err, ManifestError::Read(_)));
}

#[test]
fn invalid_yaml_is_a_parse_error() {
    let tmp = TempDir::new().unwrap();
    write_manifest(tmp.path(), "sketches: {not: [valid");
    let err = TestManifest::load(tmp.path()).unwrap_err();
    assert!(matches!(err, ManifestError::Parse(_)));
}
