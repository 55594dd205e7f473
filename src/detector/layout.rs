// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! First construction pass: derive every dimension and create every shape
//!
//! Nothing here allocates a volume. The world extent depends on all
//! sub-detector extents, so it is computed last from the finished record.

use crate::config::{DetectorConfig, HcalDesign};
use crate::error::{GeometryError, Result};
use crate::geometry::{subtract, Shape};
use crate::registry::CalorimeterId;
use nalgebra::Vector3;
use std::sync::Arc;

/// Every shape the detector needs outside the HCal stacks
#[derive(Debug, Clone)]
pub struct ShapeSet {
    pub world: Arc<Shape>,
    pub target: Arc<Shape>,
    /// Shared by the tag and recoil tracker regions
    pub tracker: Arc<Shape>,
    pub tracker_plane: Arc<Shape>,
    pub ecal: Arc<Shape>,
    pub ecal_module: Arc<Shape>,
    /// Envelope around barrel, end-cap and side stacks
    pub hcal: Arc<Shape>,
}

/// Absorber plates interleaved with RPC layers, stacked along `axis`
#[derive(Debug, Clone)]
pub struct RpcStackLayout {
    /// Name of the stack's mother volume
    pub name: &'static str,
    /// Prefix of the per-layer volume names
    pub prefix: &'static str,
    pub calorimeter: CalorimeterId,
    /// Unit stacking direction in the stack frame
    pub axis: Vector3<f64>,
    pub envelope: Arc<Shape>,
    pub absorber: Arc<Shape>,
    /// RPC shell with the gas slot cut out
    pub shell: Arc<Shape>,
    pub gas: Arc<Shape>,
    pub absorber_offsets: Vec<f64>,
    pub rpc_offsets: Vec<f64>,
    /// Gas slot position in the shell frame
    pub slot_offset: Vector3<f64>,
}

/// Extent record: dimensions and offsets along the beam axis (z)
#[derive(Debug, Clone)]
pub struct Layout {
    pub world_half: Vector3<f64>,
    pub tag_center_z: f64,
    pub recoil_center_z: f64,
    /// Plane centres in the tracker frame
    pub plane_offsets: Vec<f64>,
    pub ecal_center_z: f64,
    pub ecal_module_offsets: Vec<f64>,
    pub hcal_center_z: f64,
    pub hcal_barrel: RpcStackLayout,
    pub hcal_cap: RpcStackLayout,
    pub hcal_side: RpcStackLayout,
    /// Stack positions in the HCal envelope frame
    pub barrel_offset: Vector3<f64>,
    pub cap_offset: Vector3<f64>,
    /// +x side first, then -x
    pub side_offsets: [Vector3<f64>; 2],
    pub shapes: ShapeSet,
}

/// Centres of `count` cells of width `pitch`, packed symmetrically around zero
pub fn segment_offsets(count: u32, pitch: f64) -> Vec<f64> {
    let half = f64::from(count) * pitch / 2.0;
    (0..count).map(|i| -half + (f64::from(i) + 0.5) * pitch).collect()
}

fn layer_pitch(hcal: &HcalDesign) -> f64 {
    hcal.absorber_thickness + 2.0 * hcal.rpc_half_thickness + hcal.layer_gap
}

/// Absorber and RPC centres of `layers` layers, absorber first
fn layer_offsets(layers: u32, hcal: &HcalDesign) -> (Vec<f64>, Vec<f64>) {
    let pitch = layer_pitch(hcal);
    let half = f64::from(layers) * pitch / 2.0;
    (0..layers)
        .map(|i| {
            let start = -half + f64::from(i) * pitch;
            (
                start + hcal.absorber_thickness / 2.0,
                start + hcal.absorber_thickness + hcal.rpc_half_thickness,
            )
        })
        .unzip()
}

/// `transverse` with its component along `axis` replaced by `depth`
fn along(axis: usize, depth: f64, transverse: Vector3<f64>) -> Vector3<f64> {
    let mut half = transverse;
    half[axis] = depth;
    half
}

/// Flat stack with box-shaped RPC shells. `transverse` holds the half size
/// across the stack; its component along `axis` is ignored.
fn box_stack(
    name: &'static str,
    calorimeter: CalorimeterId,
    axis: usize,
    transverse: Vector3<f64>,
    layers: u32,
    hcal: &HcalDesign,
) -> Result<RpcStackLayout> {
    let cuboid = |shape: String, half: Vector3<f64>| Shape::cuboid(shape, half.x, half.y, half.z);
    let mut unit = Vector3::zeros();
    unit[axis] = 1.0;
    let slot_offset = unit * slot_depth(hcal);

    let envelope = cuboid(name.to_string(), along(axis, f64::from(layers) * layer_pitch(hcal) / 2.0, transverse))?;
    let absorber = cuboid(format!("{name}Absorber"), along(axis, hcal.absorber_thickness / 2.0, transverse))?;
    let shell_box = cuboid(format!("{name}RPCBox"), along(axis, hcal.rpc_half_thickness, transverse))?;
    let gas = cuboid(
        format!("{name}RPCGas"),
        along(axis, hcal.gas_half_thickness, transverse * hcal.slot_fraction),
    )?;
    let shell = subtract(format!("{name}RPCShell"), &shell_box, &gas, slot_offset)?;
    let (absorber_offsets, rpc_offsets) = layer_offsets(layers, hcal);

    Ok(RpcStackLayout {
        name,
        prefix: name,
        calorimeter,
        axis: unit,
        envelope,
        absorber,
        shell,
        gas,
        absorber_offsets,
        rpc_offsets,
        slot_offset,
    })
}

/// Distance from the shell centre to the gas centre along the stack axis
fn slot_depth(hcal: &HcalDesign) -> f64 {
    hcal.rpc_half_thickness - hcal.back_glass - hcal.gas_half_thickness
}

fn check_hcal(hcal: &HcalDesign) -> Result<()> {
    if hcal.layer_gap < 0.0 {
        return Err(GeometryError::invalid_geometry(
            "HCal",
            format!("layer gap must be non-negative, got {}", hcal.layer_gap),
        ));
    }
    if !(hcal.slot_fraction > 0.0 && hcal.slot_fraction <= 1.0) {
        return Err(GeometryError::invalid_geometry(
            "HCalRPCSlot",
            format!("slot fraction must be in (0, 1], got {}", hcal.slot_fraction),
        ));
    }
    let front_glass = slot_depth(hcal) - hcal.gas_half_thickness + hcal.rpc_half_thickness;
    if hcal.back_glass < 0.0 || front_glass < 0.0 {
        return Err(GeometryError::invalid_geometry(
            "HCalRPCSlot",
            format!(
                "gas gap of half thickness {} does not fit in a shell of half thickness {}",
                hcal.gas_half_thickness, hcal.rpc_half_thickness
            ),
        ));
    }
    Ok(())
}

impl Layout {
    pub fn derive(config: &DetectorConfig) -> Result<Self> {
        let design = &config.design;
        let clearance = design.clearance;

        let target = Shape::cuboid(
            "Target",
            design.target.half_xy,
            design.target.half_xy,
            design.target.thickness / 2.0,
        )?;
        let target_half_z = design.target.thickness / 2.0;

        // Trackers
        let trk = &design.tracker;
        if trk.plane_thickness > trk.plane_pitch {
            return Err(GeometryError::invalid_geometry(
                "TrackerPlane",
                format!(
                    "plane thickness {} exceeds plane pitch {}",
                    trk.plane_thickness, trk.plane_pitch
                ),
            ));
        }
        let tracker_half_z = f64::from(trk.planes) * trk.plane_pitch / 2.0;
        let tracker = Shape::cuboid("Tracker", trk.half_xy, trk.half_xy, tracker_half_z)?;
        let tracker_plane = Shape::cuboid("TrackerPlane", trk.half_xy, trk.half_xy, trk.plane_thickness / 2.0)?;
        let plane_offsets = segment_offsets(trk.planes, trk.plane_pitch);
        let recoil_center_z = target_half_z + clearance + tracker_half_z;
        let tag_center_z = -recoil_center_z;

        // ECal: modules stacked along z
        let ecal = &design.ecal;
        let module_pitch = ecal.module_thickness + ecal.module_gap;
        let ecal_half_z = f64::from(ecal.modules) * module_pitch / 2.0;
        let ecal_shape = Shape::cuboid("ECal", ecal.half_xy, ecal.half_xy, ecal_half_z)?;
        let ecal_module = Shape::cuboid("ECalModule", ecal.half_xy, ecal.half_xy, ecal.module_thickness / 2.0)?;
        if ecal.module_gap < 0.0 {
            return Err(GeometryError::invalid_geometry(
                "ECalModule",
                format!("module gap must be non-negative, got {}", ecal.module_gap),
            ));
        }
        let ecal_module_offsets = segment_offsets(ecal.modules, module_pitch);
        let ecal_center_z = recoil_center_z + tracker_half_z + clearance + ecal_half_z;

        // HCal barrel: absorber plate followed by a round RPC shell in every layer
        let hcal = &design.hcal;
        check_hcal(hcal)?;
        let pitch = layer_pitch(hcal);
        let half_xy = hcal.rpc_outer_radius;
        let barrel_half_z = f64::from(hcal.layers) * pitch / 2.0;
        let rpc_tube = Shape::tube(
            "HCalRPCTube",
            hcal.rpc_inner_radius,
            hcal.rpc_outer_radius,
            hcal.rpc_half_thickness,
        )?;
        let slot_half_xy = hcal.slot_fraction * hcal.rpc_outer_radius / std::f64::consts::SQRT_2;
        let rpc_gas = Shape::cuboid("HCalRPCGas", slot_half_xy, slot_half_xy, hcal.gas_half_thickness)?;
        let slot_offset = Vector3::new(0.0, 0.0, slot_depth(hcal));
        let (absorber_offsets, rpc_offsets) = layer_offsets(hcal.layers, hcal);
        let hcal_barrel = RpcStackLayout {
            name: "HCalBarrel",
            prefix: "HCal",
            calorimeter: CalorimeterId::HCal,
            axis: Vector3::z(),
            envelope: Shape::cuboid("HCalBarrel", half_xy, half_xy, barrel_half_z)?,
            absorber: Shape::cuboid("HCalAbsorber", half_xy, half_xy, hcal.absorber_thickness / 2.0)?,
            shell: subtract("HCalRPCShell", &rpc_tube, &rpc_gas, slot_offset)?,
            gas: rpc_gas,
            absorber_offsets,
            rpc_offsets,
            slot_offset,
        };

        // Side stacks flank the barrel in x over its full length; the
        // end-cap closes barrel and sides downstream
        let side_half_x = f64::from(hcal.side_layers) * pitch / 2.0;
        let hcal_half = Vector3::new(
            half_xy + clearance + 2.0 * side_half_x,
            half_xy,
            barrel_half_z + clearance / 2.0 + f64::from(hcal.cap_layers) * pitch / 2.0,
        );
        let cap_half_z = hcal_half.z - barrel_half_z - clearance / 2.0;
        let hcal_side = box_stack(
            "HCalSide",
            CalorimeterId::HCalSide,
            0,
            Vector3::new(0.0, half_xy, barrel_half_z),
            hcal.side_layers,
            hcal,
        )?;
        let hcal_cap = box_stack(
            "HCalCap",
            CalorimeterId::HCalCap,
            2,
            Vector3::new(hcal_half.x, half_xy, 0.0),
            hcal.cap_layers,
            hcal,
        )?;
        let barrel_offset = Vector3::new(0.0, 0.0, barrel_half_z - hcal_half.z);
        let cap_offset = Vector3::new(0.0, 0.0, hcal_half.z - cap_half_z);
        let side_x = half_xy + clearance + side_half_x;
        let side_offsets = [
            Vector3::new(side_x, 0.0, barrel_offset.z),
            Vector3::new(-side_x, 0.0, barrel_offset.z),
        ];
        let hcal_shape = Shape::cuboid("HCal", hcal_half.x, hcal_half.y, hcal_half.z)?;
        let hcal_center_z = ecal_center_z + ecal_half_z + clearance + hcal_half.z;

        // World sized from everything above
        let max_xy = [
            design.target.half_xy,
            trk.half_xy,
            ecal.half_xy,
            hcal_half.x,
            hcal_half.y,
        ]
        .into_iter()
        .fold(0.0, f64::max);
        let max_z = (tag_center_z - tracker_half_z)
            .abs()
            .max(hcal_center_z + hcal_half.z);
        let world_half = Vector3::new(max_xy, max_xy, max_z) * config.world_margin;
        let world = Shape::cuboid("World", world_half.x, world_half.y, world_half.z)?;

        Ok(Self {
            world_half,
            tag_center_z,
            recoil_center_z,
            plane_offsets,
            ecal_center_z,
            ecal_module_offsets,
            hcal_center_z,
            hcal_barrel,
            hcal_cap,
            hcal_side,
            barrel_offset,
            cap_offset,
            side_offsets,
            shapes: ShapeSet {
                world,
                target,
                tracker,
                tracker_plane,
                ecal: ecal_shape,
                ecal_module,
                hcal: hcal_shape,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_segment_offsets_evenly_spaced() {
        let offsets = segment_offsets(4, 2.0);
        assert_eq!(offsets, vec![-3.0, -1.0, 1.0, 3.0]);
    }

    #[test]
    fn test_default_layout_dimensions() {
        let layout = Layout::derive(&DetectorConfig::default()).unwrap();
        // 7 planes at 100 mm pitch
        assert_relative_eq!(layout.recoil_center_z, 0.175 + 1.0 + 350.0, epsilon = 1e-9);
        assert_relative_eq!(layout.tag_center_z, -layout.recoil_center_z);
        // 11 modules at 20.5 mm pitch
        assert_relative_eq!(layout.ecal_center_z, 701.175 + 1.0 + 112.75, epsilon = 1e-9);
        // Barrel 10 x 59 mm, end-cap 3 x 59 mm, 1 mm between them
        let hcal_half_z = 295.0 + 0.5 + 88.5;
        assert_relative_eq!(layout.hcal_center_z, 927.675 + 1.0 + hcal_half_z, epsilon = 1e-9);
        assert_relative_eq!(layout.world_half.z, 1.2 * (1312.675 + hcal_half_z), epsilon = 1e-9);
        // Barrel half width, clearance, then two side stacks of 3 x 59 mm
        assert_relative_eq!(layout.world_half.x, 1.2 * (500.0 + 1.0 + 177.0), epsilon = 1e-9);
        assert_eq!(layout.hcal_barrel.slot_offset, Vector3::new(0.0, 0.0, 2.0));
        assert_eq!(layout.hcal_side.slot_offset, Vector3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_hcal_stacks_fill_envelope() {
        let layout = Layout::derive(&DetectorConfig::default()).unwrap();
        let envelope = layout.shapes.hcal.extent();
        let barrel = layout.hcal_barrel.envelope.extent().translated(&layout.barrel_offset);
        let cap = layout.hcal_cap.envelope.extent().translated(&layout.cap_offset);
        assert!(envelope.contains_box(&barrel, 1e-9));
        assert!(envelope.contains_box(&cap, 1e-9));
        assert!(!barrel.intersects(&cap, 1e-9));
        for offset in &layout.side_offsets {
            let side = layout.hcal_side.envelope.extent().translated(offset);
            assert!(envelope.contains_box(&side, 1e-9));
            assert!(!side.intersects(&barrel, 1e-9));
            assert!(!side.intersects(&cap, 1e-9));
        }
        // Side layers stack along x
        assert_relative_eq!(layout.hcal_side.envelope.extent().size().x, 3.0 * 59.0, epsilon = 1e-9);
    }

    #[test]
    fn test_inverted_rpc_radii_rejected() {
        let mut config = DetectorConfig::default();
        config.design.hcal.rpc_inner_radius = 600.0;
        assert!(matches!(
            Layout::derive(&config),
            Err(GeometryError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn test_gas_gap_must_fit_shell() {
        let mut config = DetectorConfig::default();
        config.design.hcal.gas_half_thickness = 5.0;
        assert!(Layout::derive(&config).is_err());
    }
}
