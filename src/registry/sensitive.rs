// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Sensitive-region registry

use crate::error::{GeometryError, Result};
use crate::geometry::{Volume, VolumeId};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackerId {
    /// Upstream of the target
    Tag,
    /// Downstream of the target
    Recoil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalorimeterId {
    ECal,
    /// HCal barrel
    HCal,
    HCalCap,
    HCalSide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectorRole {
    TrackerHit,
    CalorimeterHit,
}

/// Marks a volume whose particle crossings must be reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensitiveTag {
    TrackerHit { tracker: TrackerId, plane: u32 },
    CalorimeterHit { calorimeter: CalorimeterId, module: u32 },
}

impl SensitiveTag {
    pub fn role(&self) -> DetectorRole {
        match self {
            Self::TrackerHit { .. } => DetectorRole::TrackerHit,
            Self::CalorimeterHit { .. } => DetectorRole::CalorimeterHit,
        }
    }

    /// Identity index within the owning sub-detector
    pub fn index(&self) -> u32 {
        match self {
            Self::TrackerHit { plane, .. } => *plane,
            Self::CalorimeterHit { module, .. } => *module,
        }
    }

    /// Name of the hit collection the transport stage fills for this tag
    pub fn collection(&self) -> &'static str {
        match self {
            Self::TrackerHit { tracker: TrackerId::Tag, .. } => "TagTrkHits",
            Self::TrackerHit { tracker: TrackerId::Recoil, .. } => "RecTrkHits",
            Self::CalorimeterHit { calorimeter: CalorimeterId::ECal, .. } => "ECalHits",
            Self::CalorimeterHit { calorimeter: CalorimeterId::HCal, .. } => "HCalHits",
            Self::CalorimeterHit { calorimeter: CalorimeterId::HCalCap, .. } => "HCalCapHits",
            Self::CalorimeterHit { calorimeter: CalorimeterId::HCalSide, .. } => "HCalSideHits",
        }
    }
}

/// Volume identity to sensitive tag. At most one tag per volume.
#[derive(Debug, Clone, Default)]
pub struct SensitiveRegistry {
    tags: AHashMap<VolumeId, SensitiveTag>,
}

impl SensitiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, volume: &Volume, tag: SensitiveTag) -> Result<()> {
        if self.tags.contains_key(&volume.id) {
            return Err(GeometryError::DuplicateSensitiveTag(volume.name.clone()));
        }
        self.tags.insert(volume.id, tag);
        Ok(())
    }

    pub fn lookup(&self, volume: VolumeId) -> Option<&SensitiveTag> {
        self.tags.get(&volume)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// All entries ordered by volume id
    pub fn entries(&self) -> Vec<(VolumeId, SensitiveTag)> {
        let mut entries: Vec<_> = self.tags.iter().map(|(v, t)| (*v, *t)).collect();
        entries.sort_by_key(|(v, _)| *v);
        entries
    }

    /// Entries for one hit collection, ordered by identity index
    pub fn collection(&self, name: &str) -> Vec<(VolumeId, SensitiveTag)> {
        let mut entries: Vec<_> = self
            .entries()
            .into_iter()
            .filter(|(_, t)| t.collection() == name)
            .collect();
        entries.sort_by_key(|(_, t)| t.index());
        entries
    }

    pub fn count(&self, role: DetectorRole) -> usize {
        self.tags.values().filter(|t| t.role() == role).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Shape, VisAttributes};
    use crate::material::MaterialCatalog;

    fn volume(id: usize, name: &str) -> Volume {
        let catalog = MaterialCatalog::new();
        Volume {
            id: VolumeId(id),
            name: name.into(),
            shape: Shape::cuboid(name, 1.0, 1.0, 1.0).unwrap(),
            material: catalog.resolve("Silicon").unwrap(),
            vis: VisAttributes::default(),
            max_step: None,
        }
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let mut registry = SensitiveRegistry::new();
        let plane = volume(3, "TagPlane0");
        let tag = SensitiveTag::TrackerHit {
            tracker: TrackerId::Tag,
            plane: 0,
        };
        registry.register(&plane, tag).unwrap();
        assert_eq!(
            registry.register(&plane, tag),
            Err(GeometryError::DuplicateSensitiveTag("TagPlane0".into()))
        );
        assert_eq!(registry.lookup(VolumeId(3)), Some(&tag));
        assert_eq!(registry.lookup(VolumeId(4)), None);
    }

    #[test]
    fn test_collection_sorted_by_index() {
        let mut registry = SensitiveRegistry::new();
        for (id, module) in [(7usize, 2u32), (5, 0), (6, 1)] {
            let tag = SensitiveTag::CalorimeterHit {
                calorimeter: CalorimeterId::ECal,
                module,
            };
            registry.register(&volume(id, "ECalModule"), tag).unwrap();
        }
        let indices: Vec<_> = registry.collection("ECalHits").iter().map(|(_, t)| t.index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(registry.count(DetectorRole::CalorimeterHit), 3);
        assert_eq!(registry.count(DetectorRole::TrackerHit), 0);
    }

    #[test]
    fn test_hcal_stacks_have_own_collections() {
        let names: Vec<_> = [CalorimeterId::HCal, CalorimeterId::HCalCap, CalorimeterId::HCalSide]
            .into_iter()
            .map(|calorimeter| SensitiveTag::CalorimeterHit { calorimeter, module: 0 }.collection())
            .collect();
        assert_eq!(names, vec!["HCalHits", "HCalCapHits", "HCalSideHits"]);
    }
}
