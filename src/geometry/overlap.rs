// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Overlap checking on bounding boxes
//!
//! For every mother volume each daughter must sit inside the mother's
//! extent, and no two daughters may intersect. Shared faces are allowed.

use super::bbox::OVERLAP_TOLERANCE;
use super::Hierarchy;
use crate::error::{GeometryError, Result};
use tracing::debug;

/// Check every nesting level, mothers in creation order
pub fn check_overlaps(hierarchy: &Hierarchy) -> Result<()> {
    let mut checked = 0usize;
    for volume in hierarchy.volumes() {
        let daughters = hierarchy.daughters(volume.id);
        if daughters.is_empty() {
            continue;
        }
        let mother_extent = volume.shape.extent();
        let extents: Vec<_> = daughters.iter().map(|&d| hierarchy.placed_extent(d)).collect();

        for (&daughter, extent) in daughters.iter().zip(&extents) {
            if !mother_extent.contains_box(extent, OVERLAP_TOLERANCE) {
                return Err(GeometryError::Protrusion {
                    child: hierarchy.placement_label(daughter),
                    mother: volume.name.clone(),
                });
            }
        }

        for i in 0..daughters.len() {
            for j in (i + 1)..daughters.len() {
                checked += 1;
                if extents[i].intersects(&extents[j], OVERLAP_TOLERANCE) {
                    return Err(GeometryError::OverlapDetected(
                        hierarchy.placement_label(daughters[i]),
                        hierarchy.placement_label(daughters[j]),
                    ));
                }
            }
        }
    }
    debug!(pairs = checked, "overlap check passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Shape;
    use crate::material::MaterialCatalog;
    use nalgebra::Vector3;

    #[test]
    fn test_overlapping_siblings_are_named() {
        let catalog = MaterialCatalog::new();
        let air = catalog.resolve("Air").unwrap();
        let mut h = Hierarchy::new();
        let world = h.add_volume("World", Shape::cuboid("World", 10.0, 10.0, 10.0).unwrap(), air.clone());
        let a = h.add_volume("A", Shape::cuboid("A", 2.0, 2.0, 2.0).unwrap(), air.clone());
        let b = h.add_volume("B", Shape::cuboid("B", 2.0, 2.0, 2.0).unwrap(), air);
        h.place_world(world).unwrap();
        h.place(a, world, Vector3::zeros(), 0).unwrap();
        h.place(b, world, Vector3::new(3.0, 0.0, 0.0), 0).unwrap();

        assert_eq!(
            check_overlaps(&h),
            Err(GeometryError::OverlapDetected("A".into(), "B".into()))
        );
    }

    #[test]
    fn test_touching_siblings_pass() {
        let catalog = MaterialCatalog::new();
        let air = catalog.resolve("Air").unwrap();
        let mut h = Hierarchy::new();
        let world = h.add_volume("World", Shape::cuboid("World", 10.0, 10.0, 10.0).unwrap(), air.clone());
        let slab = h.add_volume("Slab", Shape::cuboid("Slab", 10.0, 10.0, 1.0).unwrap(), air);
        h.place_world(world).unwrap();
        for i in 0..10u32 {
            let z = -9.0 + 2.0 * f64::from(i);
            h.place(slab, world, Vector3::new(0.0, 0.0, z), i).unwrap();
        }
        assert!(check_overlaps(&h).is_ok());
    }

    #[test]
    fn test_protrusion_detected() {
        let catalog = MaterialCatalog::new();
        let air = catalog.resolve("Air").unwrap();
        let mut h = Hierarchy::new();
        let world = h.add_volume("World", Shape::cuboid("World", 1.0, 1.0, 1.0).unwrap(), air.clone());
        let big = h.add_volume("Big", Shape::cuboid("Big", 2.0, 0.5, 0.5).unwrap(), air);
        h.place_world(world).unwrap();
        h.place(big, world, Vector3::zeros(), 0).unwrap();
        assert_eq!(
            check_overlaps(&h),
            Err(GeometryError::Protrusion {
                child: "Big".into(),
                mother: "World".into()
            })
        );
    }
}
