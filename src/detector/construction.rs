// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Detector construction
//!
//! `build` runs the whole pipeline for one configuration and either returns
//! a finished `Detector` or an error; a failed run leaves nothing behind.

use super::layout::Layout;
use super::model::Detector;
use super::subdetectors::{build_ecal, build_hcal, build_target, build_tracker, Materials, Segmented};
use crate::config::DetectorConfig;
use crate::error::Result;
use crate::geometry::{check_overlaps, Hierarchy, VisAttributes};
use crate::material::MaterialCatalog;
use crate::registry::{FieldRegion, FieldRegistry, SensitiveRegistry, TrackerId};
use nalgebra::Vector3;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Owns the material catalog and the current detector model
#[derive(Debug, Default)]
pub struct DetectorConstruction {
    catalog: Arc<MaterialCatalog>,
    current: Option<Arc<Detector>>,
}

impl DetectorConstruction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share an existing catalog, e.g. across several builders
    pub fn with_catalog(catalog: Arc<MaterialCatalog>) -> Self {
        Self { catalog, current: None }
    }

    pub fn catalog(&self) -> &Arc<MaterialCatalog> {
        &self.catalog
    }

    /// Discard the current model and build a new one from `config`
    pub fn construct(&mut self, config: &DetectorConfig) -> Result<Arc<Detector>> {
        self.current = None;
        let detector = Arc::new(build(&self.catalog, config)?);
        self.current = Some(Arc::clone(&detector));
        Ok(detector)
    }

    /// Model from the last successful construction, if any
    pub fn detector(&self) -> Option<Arc<Detector>> {
        self.current.clone()
    }
}

/// Build a complete detector model for `config`
pub fn build(catalog: &MaterialCatalog, config: &DetectorConfig) -> Result<Detector> {
    let start = Instant::now();

    config.validate(catalog)?;
    let materials = Materials::resolve(catalog, config)?;
    let layout = Layout::derive(config)?;

    let mut hierarchy = Hierarchy::new();
    let world = hierarchy.add_volume(
        "World",
        Arc::clone(&layout.shapes.world),
        Arc::clone(&materials.vacuum),
    );
    hierarchy.set_vis(world, VisAttributes::INVISIBLE);
    hierarchy.place_world(world)?;

    let target = build_target(&mut hierarchy, &layout, &materials);
    let tag_tracker = build_tracker(&mut hierarchy, &layout, &materials, TrackerId::Tag, config.max_step)?;
    let recoil_tracker = build_tracker(&mut hierarchy, &layout, &materials, TrackerId::Recoil, config.max_step)?;
    let ecal = build_ecal(&mut hierarchy, &layout, &materials)?;
    let hcal = build_hcal(&mut hierarchy, &layout, &materials)?;

    let on_axis = |z: f64| Vector3::new(0.0, 0.0, z);
    hierarchy.place(target, world, on_axis(0.0), 0)?;
    hierarchy.place(tag_tracker.mother, world, on_axis(layout.tag_center_z), 0)?;
    hierarchy.place(recoil_tracker.mother, world, on_axis(layout.recoil_center_z), 0)?;
    hierarchy.place(ecal.mother, world, on_axis(layout.ecal_center_z), 0)?;
    hierarchy.place(hcal.envelope, world, on_axis(layout.hcal_center_z), 0)?;

    if config.check_overlaps {
        check_overlaps(&hierarchy)?;
    } else {
        warn!("overlap checking disabled; geometry is not validated");
    }

    let mut sensitive = SensitiveRegistry::new();
    for segments in [&tag_tracker.segments, &recoil_tracker.segments, &ecal.segments]
        .into_iter()
        .chain(hcal.stacks().map(|stack| &stack.segments))
    {
        register_segments(&mut sensitive, &hierarchy, segments)?;
    }

    let mut fields = FieldRegistry::new();
    for (tracker, magnitude, center_z) in [
        (&tag_tracker, config.tag_field, layout.tag_center_z),
        (&recoil_tracker, config.recoil_field, layout.recoil_center_z),
    ] {
        if magnitude == 0.0 {
            continue;
        }
        let volume = hierarchy.volume(tracker.mother);
        let region = FieldRegion {
            axis: config.design.field_axis,
            magnitude,
            extent: volume.shape.extent().translated(&on_axis(center_z)),
        };
        fields.register(volume, region)?;
    }

    info!(
        target_material = %config.target_material,
        volumes = hierarchy.volumes().len(),
        placements = hierarchy.placements().len(),
        sensitive = sensitive.len(),
        field_regions = fields.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "detector constructed"
    );

    Ok(Detector {
        config: config.clone(),
        hierarchy,
        sensitive,
        fields,
        target,
        tag_tracker,
        recoil_tracker,
        ecal,
        hcal,
    })
}

fn register_segments(registry: &mut SensitiveRegistry, hierarchy: &Hierarchy, segments: &Segmented) -> Result<()> {
    for (&volume, &tag) in segments.volumes.iter().zip(&segments.tags) {
        registry.register(hierarchy.volume(volume), tag)?;
    }
    Ok(())
}
