// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Detector assembly: layout, sub-detector builders and the finished model

mod construction;
mod layout;
mod model;
mod subdetectors;

pub use construction::{build, DetectorConstruction};
pub use layout::{segment_offsets, Layout, RpcStackLayout, ShapeSet};
pub use model::Detector;
pub use subdetectors::{Hcal, Materials, RpcStack, Segmented, SubDetector};
