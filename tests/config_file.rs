// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Configuration file handling

use anyhow::Result;
use dpsim::{construct, DetectorConfig};
use tempfile::TempDir;

#[test]
fn test_save_and_reload_config() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("dpsim.toml");

    let config = DetectorConfig::default()
        .with_target_material("Lead")
        .with_tag_field(0.5)
        .with_max_step(Some(0.25))
        .with_ecal_modules(7);
    config.save(&path)?;

    let loaded = DetectorConfig::from_file(&path)?;
    assert_eq!(loaded, config);

    let detector = construct(&loaded)?;
    assert_eq!(detector.target().material.name, "G4_Pb");
    assert_eq!(detector.ecal_modules().len(), 7);
    Ok(())
}

#[test]
fn test_malformed_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "recoil_field = \"strong\"").unwrap();

    let err = DetectorConfig::from_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("broken.toml"));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(DetectorConfig::from_file(dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_export_json_to_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("geometry.json");
    let detector = construct(&DetectorConfig::default())?;
    dpsim::io::export_json(&detector, &path)?;

    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(value["world"], "World");
    assert_eq!(
        value["placements"].as_array().unwrap().len(),
        detector.hierarchy().placements().len()
    );
    Ok(())
}
