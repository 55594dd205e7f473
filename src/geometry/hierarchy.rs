// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Placement hierarchy
//!
//! Volumes and placements live in two arenas addressed by index. A volume
//! is placed under at most one mother volume (possibly several times, with
//! distinct copy numbers), which keeps the logical hierarchy a tree.

use super::{BoundingBox, Shape, VisAttributes, Volume, VolumeId};
use crate::error::{GeometryError, Result};
use crate::material::Material;
use nalgebra::{Point3, Vector3};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Index of a placement inside its hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PlacementId(pub(crate) usize);

impl PlacementId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PlacementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Positions a volume inside its mother; the world placement has no mother
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub id: PlacementId,
    pub volume: VolumeId,
    pub mother: Option<VolumeId>,
    pub translation: Vector3<f64>,
    pub copy_no: u32,
}

/// One physical instance of a volume, reached from the world along `path`
#[derive(Debug, Clone, PartialEq)]
pub struct Touchable {
    pub path: Vec<PlacementId>,
    pub volume: VolumeId,
    /// Translation of the volume origin in the world frame
    pub translation: Vector3<f64>,
}

impl Touchable {
    pub fn placement(&self) -> PlacementId {
        // path always holds at least the world placement
        self.path[self.path.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }
}

#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    volumes: Vec<Volume>,
    placements: Vec<Placement>,
    /// Daughter placements per volume, indexed by volume id
    daughters: Vec<Vec<PlacementId>>,
    /// Mother volume per volume, indexed by volume id
    mothers: Vec<Option<VolumeId>>,
    world: Option<PlacementId>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a volume; it stays unplaced until `place` or `place_world`
    pub fn add_volume(
        &mut self,
        name: impl Into<String>,
        shape: Arc<Shape>,
        material: Arc<Material>,
    ) -> VolumeId {
        let id = VolumeId(self.volumes.len());
        self.volumes.push(Volume {
            id,
            name: name.into(),
            shape,
            material,
            vis: VisAttributes::default(),
            max_step: None,
        });
        self.daughters.push(Vec::new());
        self.mothers.push(None);
        id
    }

    pub fn set_vis(&mut self, volume: VolumeId, vis: VisAttributes) {
        self.volumes[volume.0].vis = vis;
    }

    pub fn set_max_step(&mut self, volume: VolumeId, max_step: Option<f64>) {
        self.volumes[volume.0].max_step = max_step;
    }

    /// Make `volume` the root of the hierarchy
    pub fn place_world(&mut self, volume: VolumeId) -> Result<PlacementId> {
        let name = &self.volumes[volume.0].name;
        if self.world.is_some() {
            return Err(GeometryError::invalid_placement(name, "a world volume is already placed"));
        }
        if self.mothers[volume.0].is_some() {
            return Err(GeometryError::invalid_placement(name, "world volume cannot have a mother"));
        }
        let id = PlacementId(self.placements.len());
        self.placements.push(Placement {
            id,
            volume,
            mother: None,
            translation: Vector3::zeros(),
            copy_no: 0,
        });
        self.world = Some(id);
        Ok(id)
    }

    /// Place `child` inside `mother` at `translation` in the mother's frame
    pub fn place(
        &mut self,
        child: VolumeId,
        mother: VolumeId,
        translation: Vector3<f64>,
        copy_no: u32,
    ) -> Result<PlacementId> {
        let name = self.volumes[child.0].name.clone();
        if translation.iter().any(|c| !c.is_finite()) {
            return Err(GeometryError::invalid_placement(&name, "translation must be finite"));
        }
        if self.world_volume() == Some(child) {
            return Err(GeometryError::invalid_placement(&name, "world volume cannot be placed"));
        }
        if let Some(existing) = self.mothers[child.0] {
            if existing != mother {
                return Err(GeometryError::invalid_placement(
                    &name,
                    format!("already placed inside '{}'", self.volumes[existing.0].name),
                ));
            }
            if self.daughters[mother.0]
                .iter()
                .any(|p| self.placements[p.0].volume == child && self.placements[p.0].copy_no == copy_no)
            {
                return Err(GeometryError::invalid_placement(
                    &name,
                    format!("copy number {copy_no} is already used"),
                ));
            }
        }
        if self.is_ancestor_or_self(child, mother) {
            return Err(GeometryError::invalid_placement(
                &name,
                format!("placing inside '{}' would create a cycle", self.volumes[mother.0].name),
            ));
        }

        let id = PlacementId(self.placements.len());
        self.placements.push(Placement {
            id,
            volume: child,
            mother: Some(mother),
            translation,
            copy_no,
        });
        self.daughters[mother.0].push(id);
        self.mothers[child.0] = Some(mother);
        Ok(id)
    }

    /// True if `candidate` is `volume` or one of its logical ancestors
    fn is_ancestor_or_self(&self, candidate: VolumeId, volume: VolumeId) -> bool {
        let mut current = Some(volume);
        while let Some(v) = current {
            if v == candidate {
                return true;
            }
            current = self.mothers[v.0];
        }
        false
    }

    pub fn world(&self) -> Option<PlacementId> {
        self.world
    }

    pub fn world_volume(&self) -> Option<VolumeId> {
        self.world.map(|p| self.placements[p.0].volume)
    }

    pub fn volume(&self, id: VolumeId) -> &Volume {
        &self.volumes[id.0]
    }

    pub fn volumes(&self) -> &[Volume] {
        &self.volumes
    }

    pub fn placement(&self, id: PlacementId) -> &Placement {
        &self.placements[id.0]
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn daughters(&self, volume: VolumeId) -> &[PlacementId] {
        &self.daughters[volume.0]
    }

    /// All placements of a volume, in creation order
    pub fn placements_of(&self, volume: VolumeId) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(move |p| p.volume == volume)
    }

    pub fn find_volume(&self, name: &str) -> Option<&Volume> {
        self.volumes.iter().find(|v| v.name == name)
    }

    /// Human-readable placement name, with the copy number when a volume is
    /// placed more than once
    pub fn placement_label(&self, id: PlacementId) -> String {
        let placement = &self.placements[id.0];
        let name = &self.volumes[placement.volume.0].name;
        if self.placements_of(placement.volume).nth(1).is_some() {
            format!("{name}#{}", placement.copy_no)
        } else {
            name.clone()
        }
    }

    /// Bounding box of a placement in its mother's frame
    pub fn placed_extent(&self, id: PlacementId) -> BoundingBox {
        let placement = &self.placements[id.0];
        self.volumes[placement.volume.0]
            .shape
            .extent()
            .translated(&placement.translation)
    }

    /// Every physical instance reachable from the world, depth first
    pub fn touchables(&self) -> Vec<Touchable> {
        let mut out = Vec::new();
        if let Some(world) = self.world {
            let mut path = Vec::new();
            self.visit(world, Vector3::zeros(), &mut path, &mut out);
        }
        out
    }

    fn visit(
        &self,
        id: PlacementId,
        origin: Vector3<f64>,
        path: &mut Vec<PlacementId>,
        out: &mut Vec<Touchable>,
    ) {
        let placement = &self.placements[id.0];
        let translation = origin + placement.translation;
        path.push(id);
        out.push(Touchable {
            path: path.clone(),
            volume: placement.volume,
            translation,
        });
        for &daughter in &self.daughters[placement.volume.0] {
            self.visit(daughter, translation, path, out);
        }
        path.pop();
    }

    /// Placements from the world down to `id`. `None` when `id` is not
    /// reachable or an ancestor volume is placed more than once, since the
    /// path is then not unique.
    pub fn path(&self, id: PlacementId) -> Option<Vec<PlacementId>> {
        let mut path = vec![id];
        let mut current = &self.placements[id.0];
        while let Some(mother) = current.mother {
            let mut placements = self.placements_of(mother);
            let parent = placements.next()?;
            if placements.next().is_some() {
                return None;
            }
            path.push(parent.id);
            current = parent;
        }
        (Some(path[path.len() - 1]) == self.world).then(|| {
            path.reverse();
            path
        })
    }

    /// Origin of placement `id` in the world frame, when its path is unique
    pub fn global_translation(&self, id: PlacementId) -> Option<Vector3<f64>> {
        self.path(id)
            .map(|path| path.iter().map(|p| self.placements[p.0].translation).sum())
    }

    /// Deepest touchable whose solid contains the world-frame `point`
    pub fn locate(&self, point: &Point3<f64>) -> Option<Touchable> {
        let world = self.world?;
        let world_volume = &self.volumes[self.placements[world.0].volume.0];
        if !world_volume.shape.contains(point) {
            return None;
        }
        let mut current = Touchable {
            path: vec![world],
            volume: world_volume.id,
            translation: Vector3::zeros(),
        };
        'descend: loop {
            for &daughter in &self.daughters[current.volume.0] {
                let placement = &self.placements[daughter.0];
                let translation = current.translation + placement.translation;
                let local = point - translation;
                if self.occupies(placement.volume, &local) {
                    let mut path = current.path.clone();
                    path.push(daughter);
                    current = Touchable {
                        path,
                        volume: placement.volume,
                        translation,
                    };
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }

    /// True if `point` (in the volume's frame) lies in its solid or in one of
    /// its daughters. Daughters may fill holes cut into their mother.
    fn occupies(&self, volume: VolumeId, point: &Point3<f64>) -> bool {
        self.volumes[volume.0].shape.contains(point)
            || self.daughters[volume.0].iter().any(|&d| {
                let placement = &self.placements[d.0];
                self.occupies(placement.volume, &(point - placement.translation))
            })
    }

    /// Volumes that cannot be reached from the world
    pub fn unreachable_volumes(&self) -> Vec<VolumeId> {
        let reachable: HashSet<VolumeId> = self.touchables().into_iter().map(|t| t.volume).collect();
        self.volumes
            .iter()
            .map(|v| v.id)
            .filter(|id| !reachable.contains(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialCatalog;

    fn small_tree() -> (Hierarchy, VolumeId, VolumeId, VolumeId) {
        let catalog = MaterialCatalog::new();
        let vacuum = catalog.resolve("Vacuum").unwrap();
        let iron = catalog.resolve("Iron").unwrap();
        let mut h = Hierarchy::new();
        let world = h.add_volume("World", Shape::cuboid("World", 10.0, 10.0, 10.0).unwrap(), vacuum.clone());
        let mother = h.add_volume("Mother", Shape::cuboid("Mother", 5.0, 5.0, 5.0).unwrap(), vacuum);
        let plate = h.add_volume("Plate", Shape::cuboid("Plate", 5.0, 5.0, 1.0).unwrap(), iron);
        h.place_world(world).unwrap();
        h.place(mother, world, Vector3::new(0.0, 0.0, 2.0), 0).unwrap();
        h.place(plate, mother, Vector3::new(0.0, 0.0, -3.0), 0).unwrap();
        h.place(plate, mother, Vector3::new(0.0, 0.0, 3.0), 1).unwrap();
        (h, world, mother, plate)
    }

    #[test]
    fn test_touchables_accumulate_translation() {
        let (h, _, _, plate) = small_tree();
        let plates: Vec<_> = h.touchables().into_iter().filter(|t| t.volume == plate).collect();
        assert_eq!(plates.len(), 2);
        assert_eq!(plates[0].translation, Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(plates[1].translation, Vector3::new(0.0, 0.0, 5.0));
        assert_eq!(plates[1].depth(), 2);
    }

    #[test]
    fn test_path_and_global_translation() {
        let (h, _, mother, plate) = small_tree();
        let second = h.placements_of(plate).nth(1).unwrap().id;
        let mother_placement = h.placements_of(mother).next().unwrap().id;

        let path = h.path(second).unwrap();
        assert_eq!(path, vec![h.world().unwrap(), mother_placement, second]);
        assert_eq!(h.global_translation(second), Some(Vector3::new(0.0, 0.0, 5.0)));
    }

    #[test]
    fn test_second_mother_rejected() {
        let (mut h, world, _, plate) = small_tree();
        let err = h.place(plate, world, Vector3::zeros(), 5).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidPlacement { .. }));
    }

    #[test]
    fn test_cycle_rejected() {
        let (mut h, _, mother, plate) = small_tree();
        // Mother is already placed in World, so this is rejected as a re-parent
        assert!(h.place(mother, plate, Vector3::zeros(), 0).is_err());

        let catalog = MaterialCatalog::new();
        let vacuum = catalog.resolve("Vacuum").unwrap();
        let a = h.add_volume("A", Shape::cuboid("A", 1.0, 1.0, 1.0).unwrap(), vacuum.clone());
        let b = h.add_volume("B", Shape::cuboid("B", 1.0, 1.0, 1.0).unwrap(), vacuum);
        h.place(b, a, Vector3::zeros(), 0).unwrap();
        assert!(h.place(a, b, Vector3::zeros(), 0).is_err());
        assert!(h.place(a, a, Vector3::zeros(), 0).is_err());
    }

    #[test]
    fn test_duplicate_copy_number_rejected() {
        let (mut h, _, mother, plate) = small_tree();
        assert!(h.place(plate, mother, Vector3::zeros(), 1).is_err());
    }

    #[test]
    fn test_locate_finds_deepest_volume() {
        let (h, world, mother, plate) = small_tree();
        assert_eq!(h.locate(&Point3::new(0.0, 0.0, -1.0)).unwrap().volume, plate);
        assert_eq!(h.locate(&Point3::new(0.0, 0.0, 2.0)).unwrap().volume, mother);
        assert_eq!(h.locate(&Point3::new(8.0, 0.0, 0.0)).unwrap().volume, world);
        assert!(h.locate(&Point3::new(20.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_labels_and_reachability() {
        let (mut h, _, _, plate) = small_tree();
        let first = h.placements_of(plate).next().unwrap().id;
        assert_eq!(h.placement_label(first), "Plate#0");
        assert!(h.unreachable_volumes().is_empty());

        let catalog = MaterialCatalog::new();
        let orphan = h.add_volume(
            "Orphan",
            Shape::cuboid("Orphan", 1.0, 1.0, 1.0).unwrap(),
            catalog.resolve("Air").unwrap(),
        );
        assert_eq!(h.unreachable_volumes(), vec![orphan]);
    }
}
