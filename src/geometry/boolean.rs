// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boolean operations on solids

use super::shape::{Shape, ShapeKind};
use super::bbox::OVERLAP_TOLERANCE;
use crate::error::{GeometryError, Result};
use nalgebra::Vector3;
use std::sync::Arc;

/// Subtract `tool`, shifted by `offset` relative to `base`, from `base`.
///
/// Operands are shared, not copied. A tool that misses the base entirely
/// is rejected since the result would silently equal the base.
pub fn subtract(
    name: impl Into<String>,
    base: &Arc<Shape>,
    tool: &Arc<Shape>,
    offset: Vector3<f64>,
) -> Result<Arc<Shape>> {
    let name = name.into();
    if offset.iter().any(|c| !c.is_finite()) {
        return Err(GeometryError::invalid_geometry(
            &name,
            format!("tool offset must be finite, got {offset:?}"),
        ));
    }

    let tool_extent = tool.extent().translated(&offset);
    if !base.extent().intersects(&tool_extent, OVERLAP_TOLERANCE) {
        return Err(GeometryError::invalid_geometry(
            &name,
            format!("tool '{}' does not intersect base '{}'", tool.name(), base.name()),
        ));
    }

    Ok(Shape::from_kind(
        name,
        ShapeKind::Subtraction {
            base: Arc::clone(base),
            tool: Arc::clone(tool),
            offset,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_box_slot_in_tube() {
        let tube = Shape::tube("shell", 0.0, 10.0, 4.0).unwrap();
        let slot = Shape::cuboid("slot", 5.0, 5.0, 1.0).unwrap();
        let offset = Vector3::new(0.0, 0.0, 2.0);
        let shell = subtract("shell-minus-slot", &tube, &slot, offset).unwrap();

        assert_eq!(shell.extent(), tube.extent());
        assert!(!shell.contains(&Point3::new(0.0, 0.0, 2.0)));
        assert!(shell.contains(&Point3::new(0.0, 0.0, -2.0)));
        assert!(shell.contains(&Point3::new(7.0, 0.0, 2.0)));

        let expected = tube.cubic_volume() - slot.cubic_volume();
        assert_relative_eq!(shell.cubic_volume(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_operands_are_shared() {
        let base = Shape::cuboid("base", 2.0, 2.0, 2.0).unwrap();
        let tool = Shape::cuboid("tool", 1.0, 1.0, 1.0).unwrap();
        let diff = subtract("diff", &base, &tool, Vector3::zeros()).unwrap();
        match diff.kind() {
            ShapeKind::Subtraction { base: b, tool: t, .. } => {
                assert!(Arc::ptr_eq(b, &base));
                assert!(Arc::ptr_eq(t, &tool));
            }
            other => panic!("expected subtraction, got {other:?}"),
        }
    }

    #[test]
    fn test_disjoint_tool_rejected() {
        let base = Shape::cuboid("base", 1.0, 1.0, 1.0).unwrap();
        let tool = Shape::cuboid("tool", 1.0, 1.0, 1.0).unwrap();
        let err = subtract("miss", &base, &tool, Vector3::new(5.0, 0.0, 0.0)).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidGeometry { .. }));
    }

    #[test]
    fn test_sampled_volume_for_hollow_base() {
        // Hollow tube is not convex, so the volume is integrated numerically
        let tube = Shape::tube("hollow", 2.0, 10.0, 4.0).unwrap();
        let slot = Shape::cuboid("slot", 5.0, 5.0, 1.0).unwrap();
        let shell = subtract("hollow-minus-slot", &tube, &slot, Vector3::zeros()).unwrap();
        let hole = std::f64::consts::PI * 4.0 * 2.0;
        let expected = tube.cubic_volume() - (slot.cubic_volume() - hole);
        assert_relative_eq!(shell.cubic_volume(), expected, max_relative = 0.02);
    }
}
