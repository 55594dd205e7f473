// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Field-region registry

use crate::error::{GeometryError, Result};
use crate::geometry::{BoundingBox, Volume, VolumeId};
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit_vector(self) -> Vector3<f64> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }
}

/// Uniform field over the placed extent of one volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldRegion {
    pub axis: Axis,
    /// Tesla
    pub magnitude: f64,
    /// World-frame extent in which the field applies
    pub extent: BoundingBox,
}

impl FieldRegion {
    pub fn field(&self) -> Vector3<f64> {
        self.axis.unit_vector() * self.magnitude
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    regions: AHashMap<VolumeId, FieldRegion>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, volume: &Volume, region: FieldRegion) -> Result<()> {
        if self.regions.contains_key(&volume.id) {
            return Err(GeometryError::DuplicateFieldRegion(volume.name.clone()));
        }
        self.regions.insert(volume.id, region);
        Ok(())
    }

    pub fn lookup(&self, volume: VolumeId) -> Option<&FieldRegion> {
        self.regions.get(&volume)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// All entries ordered by volume id
    pub fn entries(&self) -> Vec<(VolumeId, FieldRegion)> {
        let mut entries: Vec<_> = self.regions.iter().map(|(v, r)| (*v, *r)).collect();
        entries.sort_by_key(|(v, _)| *v);
        entries
    }

    /// Field vector at a world-frame point; zero outside every region
    pub fn field_at(&self, point: &Point3<f64>) -> Vector3<f64> {
        self.entries()
            .into_iter()
            .find(|(_, r)| r.extent.contains_point(point))
            .map(|(_, r)| r.field())
            .unwrap_or_else(Vector3::zeros)
    }
}
