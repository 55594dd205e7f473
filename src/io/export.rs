// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! JSON geometry description
//!
//! The description lists volumes in creation order and placements in
//! placement order, so two structurally identical models serialize to the
//! same bytes.

use crate::detector::Detector;
use crate::geometry::{Shape, VisAttributes};
use crate::registry::{FieldRegion, SensitiveTag};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryDescription {
    pub world: String,
    pub volumes: Vec<VolumeRecord>,
    pub placements: Vec<PlacementRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeRecord {
    pub name: String,
    pub shape: Arc<Shape>,
    pub material: String,
    /// g/cm³
    pub density: f64,
    pub vis: VisAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_step: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitive: Option<SensitiveTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<FieldRegion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementRecord {
    pub volume: String,
    /// Absent for the world
    pub mother: Option<String>,
    pub translation: [f64; 3],
    pub copy_no: u32,
}

/// Flatten a detector into its serializable description
pub fn describe(detector: &Detector) -> GeometryDescription {
    let hierarchy = detector.hierarchy();
    let volumes = hierarchy
        .volumes()
        .iter()
        .map(|v| VolumeRecord {
            name: v.name.clone(),
            shape: Arc::clone(&v.shape),
            material: v.material.name.clone(),
            density: v.material.density,
            vis: v.vis,
            max_step: v.max_step,
            sensitive: detector.sensitive().lookup(v.id).copied(),
            field: detector.fields().lookup(v.id).copied(),
        })
        .collect();
    let placements = hierarchy
        .placements()
        .iter()
        .map(|p| PlacementRecord {
            volume: hierarchy.volume(p.volume).name.clone(),
            mother: p.mother.map(|m| hierarchy.volume(m).name.clone()),
            translation: [p.translation.x, p.translation.y, p.translation.z],
            copy_no: p.copy_no,
        })
        .collect();

    GeometryDescription {
        world: detector.world_volume().name.clone(),
        volumes,
        placements,
    }
}

pub fn to_json_string(detector: &Detector) -> Result<String> {
    serde_json::to_string_pretty(&describe(detector)).context("Failed to serialize geometry description")
}

/// Write the geometry description of `detector` to `path` as JSON
pub fn export_json(detector: &Detector, path: impl AsRef<Path>) -> Result<()> {
    let json = to_json_string(detector)?;
    std::fs::write(path.as_ref(), json)
        .with_context(|| format!("Failed to write geometry description: {:?}", path.as_ref()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectorConfig;
    use crate::detector::build;
    use crate::material::MaterialCatalog;

    #[test]
    fn test_description_covers_every_volume_and_placement() {
        let catalog = MaterialCatalog::new();
        let detector = build(&catalog, &DetectorConfig::default()).unwrap();
        let description = describe(&detector);

        assert_eq!(description.world, "World");
        assert_eq!(description.volumes.len(), detector.hierarchy().volumes().len());
        assert_eq!(description.placements.len(), detector.hierarchy().placements().len());
        assert_eq!(description.placements[0].mother, None);

        let sensitive = description.volumes.iter().filter(|v| v.sensitive.is_some()).count();
        assert_eq!(sensitive, detector.sensitive().len());
        let with_field = description.volumes.iter().filter(|v| v.field.is_some()).count();
        assert_eq!(with_field, 2);
    }

    #[test]
    fn test_json_mentions_materials() {
        let catalog = MaterialCatalog::new();
        let detector = build(&catalog, &DetectorConfig::default()).unwrap();
        let json = to_json_string(&detector).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let target = value["volumes"]
            .as_array()
            .unwrap()
            .iter()
            .find(|v| v["name"] == "Target")
            .unwrap();
        assert_eq!(target["material"], "G4_W");
        assert!(json.contains("HCalRPCShell"));
    }
}
