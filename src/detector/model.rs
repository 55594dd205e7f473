// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! The completed, read-only detector model

use super::subdetectors::{Hcal, Segmented, SubDetector};
use crate::config::DetectorConfig;
use crate::geometry::{Hierarchy, PlacementId, Volume, VolumeId};
use crate::io::describe;
use crate::registry::{CalorimeterId, FieldRegistry, SensitiveRegistry, TrackerId};
use sha2::{Digest, Sha256};

/// Output of one construction: the placement tree plus both registries.
///
/// There are no mutating methods; a new configuration means a new
/// `Detector`.
#[derive(Debug, Clone)]
pub struct Detector {
    pub(crate) config: DetectorConfig,
    pub(crate) hierarchy: Hierarchy,
    pub(crate) sensitive: SensitiveRegistry,
    pub(crate) fields: FieldRegistry,
    pub(crate) target: VolumeId,
    pub(crate) tag_tracker: SubDetector,
    pub(crate) recoil_tracker: SubDetector,
    pub(crate) ecal: SubDetector,
    pub(crate) hcal: Hcal,
}

impl Detector {
    /// Configuration this model was built from
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn sensitive(&self) -> &SensitiveRegistry {
        &self.sensitive
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    /// Root placement
    pub fn world(&self) -> PlacementId {
        // construction always places the world before returning
        self.hierarchy.world().unwrap_or(PlacementId(0))
    }

    pub fn world_volume(&self) -> &Volume {
        self.hierarchy.volume(self.hierarchy.placement(self.world()).volume)
    }

    pub fn target(&self) -> &Volume {
        self.hierarchy.volume(self.target)
    }

    pub fn tracker(&self, tracker: TrackerId) -> &SubDetector {
        match tracker {
            TrackerId::Tag => &self.tag_tracker,
            TrackerId::Recoil => &self.recoil_tracker,
        }
    }

    pub fn tracker_volume(&self, tracker: TrackerId) -> &Volume {
        self.hierarchy.volume(self.tracker(tracker).mother)
    }

    pub fn ecal(&self) -> &SubDetector {
        &self.ecal
    }

    pub fn hcal(&self) -> &Hcal {
        &self.hcal
    }

    pub fn ecal_modules(&self) -> &Segmented {
        &self.ecal.segments
    }

    /// Gas gaps of the HCal barrel
    pub fn hcal_gas_gaps(&self) -> &Segmented {
        &self.hcal.barrel.segments
    }

    /// Sensitive segments of one calorimeter, in index order
    pub fn calorimeter(&self, calorimeter: CalorimeterId) -> &Segmented {
        match self.hcal.stack(calorimeter) {
            Some(stack) => &stack.segments,
            None => &self.ecal.segments,
        }
    }

    /// Mass of every placed instance except the world, in grams. Daughters
    /// are not carved out of their mothers; envelopes are air or vacuum.
    pub fn total_mass(&self) -> f64 {
        let world = self.world_volume().id;
        self.hierarchy
            .touchables()
            .iter()
            .filter(|t| t.volume != world)
            .map(|t| self.hierarchy.volume(t.volume).mass())
            .sum()
    }

    /// SHA-256 over the canonical JSON description. Equal for structurally
    /// identical models.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        // Serializing plain data into a Vec cannot fail
        if let Ok(bytes) = serde_json::to_vec(&describe(self)) {
            hasher.update(&bytes);
        }
        format!("{:x}", hasher.finalize())
    }
}
