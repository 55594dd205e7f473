// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! DPSim detector geometry
//!
//! Builds the static geometry of a fixed-target test stand: target, tag and
//! recoil trackers, an electromagnetic and a hadronic calorimeter. The result
//! is a placement tree plus the side tables a transport engine needs, i.e.
//! which volumes record hits and where the magnetic field applies.

pub mod cli;
pub mod config;
pub mod detector;
pub mod error;
pub mod geometry;
pub mod io;
pub mod material;
pub mod registry;
pub mod units;

pub use config::DetectorConfig;
pub use detector::{Detector, DetectorConstruction};
pub use error::{GeometryError, Result};
pub use geometry::{Hierarchy, Shape, Volume, VolumeId};
pub use material::{Material, MaterialCatalog};
pub use registry::{FieldRegistry, SensitiveRegistry, SensitiveTag};

/// Build a detector with a fresh material catalog
pub fn construct(config: &DetectorConfig) -> Result<Detector> {
    detector::build(&MaterialCatalog::new(), config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_detector() {
        let detector = construct(&DetectorConfig::default()).unwrap();
        assert_eq!(detector.world_volume().name, "World");
        assert_eq!(detector.sensitive().len(), 7 + 7 + 11 + 10 + 3 + 3);
    }
}
