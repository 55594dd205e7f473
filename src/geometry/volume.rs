// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Volumes: a shape bound to a material

use super::Shape;
use crate::material::Material;
use crate::units::MM3_TO_CM3;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Index of a volume inside its hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VolumeId(pub(crate) usize);

impl VolumeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VolumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.0)
    }
}

/// Display hints for event viewers
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisAttributes {
    pub colour: [f32; 4],
    pub visible: bool,
}

impl VisAttributes {
    pub const INVISIBLE: Self = Self {
        colour: [1.0, 1.0, 1.0, 0.0],
        visible: false,
    };

    pub fn colour(r: f32, g: f32, b: f32, alpha: f32) -> Self {
        Self {
            colour: [r, g, b, alpha],
            visible: true,
        }
    }
}

impl Default for VisAttributes {
    fn default() -> Self {
        Self::colour(0.7, 0.7, 0.7, 1.0)
    }
}

/// A named (shape, material) pair eligible for placement
#[derive(Debug, Clone, Serialize)]
pub struct Volume {
    pub id: VolumeId,
    pub name: String,
    pub shape: Arc<Shape>,
    pub material: Arc<Material>,
    pub vis: VisAttributes,
    /// Maximum step length hint for the transport engine (mm)
    pub max_step: Option<f64>,
}

impl Volume {
    /// Mass in grams, ignoring daughters
    pub fn mass(&self) -> f64 {
        self.shape.cubic_volume() * MM3_TO_CM3 * self.material.density
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialCatalog;
    use approx::assert_relative_eq;

    #[test]
    fn test_mass_of_iron_block() {
        let catalog = MaterialCatalog::new();
        let volume = Volume {
            id: VolumeId(0),
            name: "block".into(),
            // 10 cm cube
            shape: Shape::cuboid("block", 50.0, 50.0, 50.0).unwrap(),
            material: catalog.resolve("Iron").unwrap(),
            vis: VisAttributes::default(),
            max_step: None,
        };
        assert_relative_eq!(volume.mass(), 7874.0, epsilon = 1e-6);
    }
}
