// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - shapes, volumes and the placement hierarchy

mod bbox;
mod boolean;
mod hierarchy;
mod overlap;
mod shape;
mod volume;

pub use bbox::{BoundingBox, OVERLAP_TOLERANCE};
pub use boolean::subtract;
pub use hierarchy::{Hierarchy, Placement, PlacementId, Touchable};
pub use overlap::check_overlaps;
pub use shape::{Shape, ShapeKind};
pub use volume::{VisAttributes, Volume, VolumeId};
