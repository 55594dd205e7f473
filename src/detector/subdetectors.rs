// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Sub-detector builders
//!
//! Each builder creates one mother volume with its daughters already placed
//! and returns it unplaced. Segmented parts are produced by calling the
//! same per-segment routine once per index.

use super::layout::{Layout, RpcStackLayout};
use crate::config::DetectorConfig;
use crate::error::Result;
use crate::geometry::{Hierarchy, VisAttributes, VolumeId};
use crate::material::{Material, MaterialCatalog};
use crate::registry::{CalorimeterId, SensitiveTag, TrackerId};
use nalgebra::Vector3;
use std::sync::Arc;
use tracing::debug;

/// Materials used by the test stand, resolved before any volume exists
#[derive(Debug, Clone)]
pub struct Materials {
    pub vacuum: Arc<Material>,
    pub air: Arc<Material>,
    pub target: Arc<Material>,
    pub silicon: Arc<Material>,
    pub crystal: Arc<Material>,
    pub absorber: Arc<Material>,
    pub glass: Arc<Material>,
    pub gas: Arc<Material>,
}

impl Materials {
    pub fn resolve(catalog: &MaterialCatalog, config: &DetectorConfig) -> Result<Self> {
        Ok(Self {
            vacuum: catalog.resolve("Vacuum")?,
            air: catalog.resolve("Air")?,
            target: catalog.resolve(&config.target_material)?,
            silicon: catalog.resolve("Silicon")?,
            crystal: catalog.resolve("PbWO4")?,
            absorber: catalog.resolve("Iron")?,
            glass: catalog.resolve("Glass")?,
            gas: catalog.resolve("RPCGas")?,
        })
    }
}

/// Index-addressable volumes of one segmented sub-detector, with the tag
/// each one must carry and its offset in the mother frame
#[derive(Debug, Clone, Default)]
pub struct Segmented {
    pub volumes: Vec<VolumeId>,
    pub tags: Vec<SensitiveTag>,
    /// Offset of each segment along the stacking axis, in the frame of the
    /// sub-detector mother
    pub offsets: Vec<f64>,
}

impl Segmented {
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    fn push(&mut self, volume: VolumeId, tag: SensitiveTag, offset: f64) {
        self.volumes.push(volume);
        self.tags.push(tag);
        self.offsets.push(offset);
    }
}

/// A finished sub-detector ready to be placed
#[derive(Debug, Clone)]
pub struct SubDetector {
    pub mother: VolumeId,
    pub segments: Segmented,
}

pub fn build_target(hierarchy: &mut Hierarchy, layout: &Layout, materials: &Materials) -> VolumeId {
    let target = hierarchy.add_volume("Target", Arc::clone(&layout.shapes.target), Arc::clone(&materials.target));
    hierarchy.set_vis(target, VisAttributes::colour(1.0, 1.0, 1.0, 1.0));
    target
}

/// Tag and recoil trackers share every shape; only names and tags differ
pub fn build_tracker(
    hierarchy: &mut Hierarchy,
    layout: &Layout,
    materials: &Materials,
    tracker: TrackerId,
    max_step: Option<f64>,
) -> Result<SubDetector> {
    let prefix = match tracker {
        TrackerId::Tag => "Tag",
        TrackerId::Recoil => "Recoil",
    };
    let mother = hierarchy.add_volume(
        format!("{prefix}Tracker"),
        Arc::clone(&layout.shapes.tracker),
        Arc::clone(&materials.vacuum),
    );
    hierarchy.set_vis(mother, VisAttributes::INVISIBLE);

    let mut segments = Segmented::default();
    for (plane, &z) in (0u32..).zip(&layout.plane_offsets) {
        let volume = hierarchy.add_volume(
            format!("{prefix}Plane{plane}"),
            Arc::clone(&layout.shapes.tracker_plane),
            Arc::clone(&materials.silicon),
        );
        hierarchy.set_vis(volume, VisAttributes::colour(1.0, 1.0, 0.0, 1.0));
        hierarchy.set_max_step(volume, max_step);
        hierarchy.place(volume, mother, Vector3::new(0.0, 0.0, z), plane)?;
        segments.push(volume, SensitiveTag::TrackerHit { tracker, plane }, z);
    }
    debug!(tracker = prefix, planes = segments.len(), "built tracker");
    Ok(SubDetector { mother, segments })
}

pub fn build_ecal(hierarchy: &mut Hierarchy, layout: &Layout, materials: &Materials) -> Result<SubDetector> {
    let mother = hierarchy.add_volume("ECal", Arc::clone(&layout.shapes.ecal), Arc::clone(&materials.air));
    hierarchy.set_vis(mother, VisAttributes::INVISIBLE);

    let mut segments = Segmented::default();
    for (module, &z) in (0u32..).zip(&layout.ecal_module_offsets) {
        let volume = ecal_module(hierarchy, layout, materials, module);
        hierarchy.place(volume, mother, Vector3::new(0.0, 0.0, z), module)?;
        segments.push(
            volume,
            SensitiveTag::CalorimeterHit {
                calorimeter: CalorimeterId::ECal,
                module,
            },
            z,
        );
    }
    debug!(modules = segments.len(), "built ECal");
    Ok(SubDetector { mother, segments })
}

fn ecal_module(hierarchy: &mut Hierarchy, layout: &Layout, materials: &Materials, module: u32) -> VolumeId {
    let volume = hierarchy.add_volume(
        format!("ECalModule{module}"),
        Arc::clone(&layout.shapes.ecal_module),
        Arc::clone(&materials.crystal),
    );
    hierarchy.set_vis(volume, VisAttributes::colour(0.0, 0.6, 1.0, 0.8));
    volume
}

/// One stack of absorber plates and RPCs. `shells[i]` holds the gas gap
/// `segments.volumes[i]`.
#[derive(Debug, Clone)]
pub struct RpcStack {
    pub mother: VolumeId,
    pub absorber: VolumeId,
    pub shells: Vec<VolumeId>,
    pub segments: Segmented,
}

/// Hadronic calorimeter: barrel along the beam, end-cap downstream of it and
/// one side stack placed on either flank
#[derive(Debug, Clone)]
pub struct Hcal {
    pub envelope: VolumeId,
    pub barrel: RpcStack,
    pub cap: RpcStack,
    pub side: RpcStack,
}

impl Hcal {
    pub fn stacks(&self) -> [&RpcStack; 3] {
        [&self.barrel, &self.cap, &self.side]
    }

    pub fn stack(&self, calorimeter: CalorimeterId) -> Option<&RpcStack> {
        match calorimeter {
            CalorimeterId::HCal => Some(&self.barrel),
            CalorimeterId::HCalCap => Some(&self.cap),
            CalorimeterId::HCalSide => Some(&self.side),
            CalorimeterId::ECal => None,
        }
    }
}

pub fn build_hcal(hierarchy: &mut Hierarchy, layout: &Layout, materials: &Materials) -> Result<Hcal> {
    let envelope = hierarchy.add_volume("HCal", Arc::clone(&layout.shapes.hcal), Arc::clone(&materials.air));
    hierarchy.set_vis(envelope, VisAttributes::INVISIBLE);

    let barrel = build_rpc_stack(hierarchy, &layout.hcal_barrel, materials)?;
    let cap = build_rpc_stack(hierarchy, &layout.hcal_cap, materials)?;
    let side = build_rpc_stack(hierarchy, &layout.hcal_side, materials)?;

    hierarchy.place(barrel.mother, envelope, layout.barrel_offset, 0)?;
    hierarchy.place(cap.mother, envelope, layout.cap_offset, 0)?;
    // Not mirrored: layer 0 sits at the -x face of both copies
    for (copy, &offset) in (0u32..).zip(&layout.side_offsets) {
        hierarchy.place(side.mother, envelope, offset, copy)?;
    }
    Ok(Hcal {
        envelope,
        barrel,
        cap,
        side,
    })
}

/// The absorber plate is a single volume placed once per layer; each RPC
/// shell and its gas gap are per-layer volumes.
fn build_rpc_stack(hierarchy: &mut Hierarchy, stack: &RpcStackLayout, materials: &Materials) -> Result<RpcStack> {
    let mother = hierarchy.add_volume(stack.name, Arc::clone(&stack.envelope), Arc::clone(&materials.air));
    hierarchy.set_vis(mother, VisAttributes::INVISIBLE);

    let absorber = hierarchy.add_volume(
        format!("{}Absorber", stack.prefix),
        Arc::clone(&stack.absorber),
        Arc::clone(&materials.absorber),
    );
    hierarchy.set_vis(absorber, VisAttributes::colour(0.5, 0.5, 0.5, 0.6));

    let mut shells = Vec::with_capacity(stack.rpc_offsets.len());
    let mut segments = Segmented::default();
    let layers = stack.absorber_offsets.iter().zip(&stack.rpc_offsets);
    for (layer, (&absorber_at, &rpc_at)) in (0u32..).zip(layers) {
        hierarchy.place(absorber, mother, stack.axis * absorber_at, layer)?;
        let (shell, gas) = rpc_layer(hierarchy, stack, materials, layer)?;
        hierarchy.place(shell, mother, stack.axis * rpc_at, layer)?;
        shells.push(shell);
        segments.push(
            gas,
            SensitiveTag::CalorimeterHit {
                calorimeter: stack.calorimeter,
                module: layer,
            },
            rpc_at + stack.slot_offset.dot(&stack.axis),
        );
    }
    debug!(stack = stack.name, layers = segments.len(), "built RPC stack");
    Ok(RpcStack {
        mother,
        absorber,
        shells,
        segments,
    })
}

/// One RPC: glass shell with the gas gap placed in its slot
fn rpc_layer(
    hierarchy: &mut Hierarchy,
    stack: &RpcStackLayout,
    materials: &Materials,
    layer: u32,
) -> Result<(VolumeId, VolumeId)> {
    let shell = hierarchy.add_volume(
        format!("{}RPC{layer}", stack.prefix),
        Arc::clone(&stack.shell),
        Arc::clone(&materials.glass),
    );
    hierarchy.set_vis(shell, VisAttributes::colour(0.0, 1.0, 0.0, 0.3));

    let gas = hierarchy.add_volume(
        format!("{}Gas{layer}", stack.prefix),
        Arc::clone(&stack.gas),
        Arc::clone(&materials.gas),
    );
    hierarchy.set_vis(gas, VisAttributes::colour(1.0, 0.0, 0.0, 0.5));
    hierarchy.place(gas, shell, stack.slot_offset, 0)?;
    Ok((shell, gas))
}
