// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Solid shapes: boxes, tubes and boolean subtractions
//!
//! Every shape is centred on its own origin with the tube axis along z.
//! Dimensions are validated when the shape is created, never at first use.

use super::BoundingBox;
use crate::error::{GeometryError, Result};
use nalgebra::{Point3, Vector3};
use serde::Serialize;
use std::sync::Arc;

/// Samples per axis when integrating the volume of a non-convex subtraction
const VOLUME_GRID: usize = 48;

/// Immutable solid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape {
    name: String,
    kind: ShapeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ShapeKind {
    Box {
        half: Vector3<f64>,
    },
    Tube {
        r_inner: f64,
        r_outer: f64,
        half_length: f64,
    },
    /// `base` with `tool` removed; `tool` is shifted by `offset` in the
    /// frame of `base` before the subtraction.
    Subtraction {
        base: Arc<Shape>,
        tool: Arc<Shape>,
        offset: Vector3<f64>,
    },
}

impl Shape {
    /// Box with half extents `hx`, `hy`, `hz`
    pub fn cuboid(name: impl Into<String>, hx: f64, hy: f64, hz: f64) -> Result<Arc<Self>> {
        let name = name.into();
        positive(&name, "hx", hx)?;
        positive(&name, "hy", hy)?;
        positive(&name, "hz", hz)?;
        Ok(Arc::new(Self {
            name,
            kind: ShapeKind::Box {
                half: Vector3::new(hx, hy, hz),
            },
        }))
    }

    /// Tube (or solid cylinder when `r_inner` is zero) along the z axis
    pub fn tube(
        name: impl Into<String>,
        r_inner: f64,
        r_outer: f64,
        half_length: f64,
    ) -> Result<Arc<Self>> {
        let name = name.into();
        if !r_inner.is_finite() || r_inner < 0.0 {
            return Err(GeometryError::invalid_geometry(
                &name,
                format!("inner radius must be finite and non-negative, got {r_inner}"),
            ));
        }
        positive(&name, "outer radius", r_outer)?;
        positive(&name, "half length", half_length)?;
        if r_inner >= r_outer {
            return Err(GeometryError::invalid_geometry(
                &name,
                format!("inner radius {r_inner} must be smaller than outer radius {r_outer}"),
            ));
        }
        Ok(Arc::new(Self {
            name,
            kind: ShapeKind::Tube {
                r_inner,
                r_outer,
                half_length,
            },
        }))
    }

    pub(super) fn from_kind(name: String, kind: ShapeKind) -> Arc<Self> {
        Arc::new(Self { name, kind })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    /// Local-frame bounding box
    pub fn extent(&self) -> BoundingBox {
        match &self.kind {
            ShapeKind::Box { half } => BoundingBox::from_half_extents(*half),
            ShapeKind::Tube {
                r_outer,
                half_length,
                ..
            } => BoundingBox::from_half_extents(Vector3::new(*r_outer, *r_outer, *half_length)),
            ShapeKind::Subtraction { base, .. } => base.extent(),
        }
    }

    /// Point-in-solid test in the shape's local frame (surface counts as inside)
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        match &self.kind {
            ShapeKind::Box { half } => {
                point.x.abs() <= half.x && point.y.abs() <= half.y && point.z.abs() <= half.z
            }
            ShapeKind::Tube {
                r_inner,
                r_outer,
                half_length,
            } => {
                let r = point.x.hypot(point.y);
                point.z.abs() <= *half_length && r >= *r_inner && r <= *r_outer
            }
            ShapeKind::Subtraction { base, tool, offset } => {
                base.contains(point) && !tool.contains(&(point - offset))
            }
        }
    }

    /// Cubic volume in mm³
    pub fn cubic_volume(&self) -> f64 {
        match &self.kind {
            ShapeKind::Box { half } => 8.0 * half.x * half.y * half.z,
            ShapeKind::Tube {
                r_inner,
                r_outer,
                half_length,
            } => std::f64::consts::PI * (r_outer * r_outer - r_inner * r_inner) * 2.0 * half_length,
            ShapeKind::Subtraction { base, tool, offset } => {
                if base.is_convex() && tool.is_convex() && base.encloses(tool, offset) {
                    base.cubic_volume() - tool.cubic_volume()
                } else {
                    self.sampled_volume()
                }
            }
        }
    }

    fn is_convex(&self) -> bool {
        match &self.kind {
            ShapeKind::Box { .. } => true,
            ShapeKind::Tube { r_inner, .. } => *r_inner == 0.0,
            ShapeKind::Subtraction { .. } => false,
        }
    }

    /// Whether every corner of `other`'s extent, shifted by `offset`, is
    /// inside this shape. Exact containment for convex shapes.
    fn encloses(&self, other: &Shape, offset: &Vector3<f64>) -> bool {
        let bbox = other.extent().translated(offset);
        let (lo, hi) = (bbox.min, bbox.max);
        [lo.x, hi.x].iter().all(|&x| {
            [lo.y, hi.y]
                .iter()
                .all(|&y| [lo.z, hi.z].iter().all(|&z| self.contains(&Point3::new(x, y, z))))
        })
    }

    /// Midpoint-rule estimate over the extent
    fn sampled_volume(&self) -> f64 {
        let bbox = self.extent();
        let step = bbox.size() / VOLUME_GRID as f64;
        let mut inside = 0usize;
        for i in 0..VOLUME_GRID {
            for j in 0..VOLUME_GRID {
                for k in 0..VOLUME_GRID {
                    let p = Point3::new(
                        bbox.min.x + (i as f64 + 0.5) * step.x,
                        bbox.min.y + (j as f64 + 0.5) * step.y,
                        bbox.min.z + (k as f64 + 0.5) * step.z,
                    );
                    if self.contains(&p) {
                        inside += 1;
                    }
                }
            }
        }
        bbox.volume() * inside as f64 / (VOLUME_GRID * VOLUME_GRID * VOLUME_GRID) as f64
    }
}

fn positive(shape: &str, what: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::invalid_geometry(
            shape,
            format!("{what} must be positive and finite, got {value}"),
        ))
    }
}
