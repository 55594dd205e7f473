// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding box utilities

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Distance below which touching faces are not treated as an overlap (mm)
pub const OVERLAP_TOLERANCE: f64 = 1.0e-9;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    /// Box centred on the origin with the given half extents
    pub fn from_half_extents(half: Vector3<f64>) -> Self {
        Self {
            min: Point3::from(-half),
            max: Point3::from(half),
        }
    }

    pub fn translated(&self, offset: &Vector3<f64>) -> BoundingBox {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    pub fn volume(&self) -> f64 {
        let size = self.size();
        size.x * size.y * size.z
    }

    /// True when the interiors intersect by more than `tolerance` on every
    /// axis. Boxes that only share a face do not intersect.
    pub fn intersects(&self, other: &BoundingBox, tolerance: f64) -> bool {
        self.min.x < other.max.x - tolerance
            && other.min.x < self.max.x - tolerance
            && self.min.y < other.max.y - tolerance
            && other.min.y < self.max.y - tolerance
            && self.min.z < other.max.z - tolerance
            && other.min.z < self.max.z - tolerance
    }

    /// True when `inner` lies inside `self`, allowing `tolerance` slack
    pub fn contains_box(&self, inner: &BoundingBox, tolerance: f64) -> bool {
        inner.min.x >= self.min.x - tolerance
            && inner.min.y >= self.min.y - tolerance
            && inner.min.z >= self.min.z - tolerance
            && inner.max.x <= self.max.x + tolerance
            && inner.max.y <= self.max.y + tolerance
            && inner.max.z <= self.max.z + tolerance
    }

    pub fn contains_point(&self, point: &Point3<f64>) -> bool {
        (self.min.x..=self.max.x).contains(&point.x)
            && (self.min.y..=self.max.y).contains(&point.y)
            && (self.min.z..=self.max.z).contains(&point.z)
    }

}
